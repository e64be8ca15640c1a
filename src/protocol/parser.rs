//! # Frame Parser
//!
//! Incremental state machine that turns a raw byte stream into framed
//! [`Packet`]s. Bytes may arrive in chunks of any size; the parser keeps
//! every partial frame between calls.
//!
//! ## State Machine
//!
//! ```text
//! AwaitSync0 ─0x88→ AwaitSync1 ─0x33→ AwaitCommand → AwaitCompression
//!     ▲  │other          │other                            │
//!     └──┴───────────────┘                                 ▼
//!     │                                  AwaitLengthLo → AwaitLengthHi
//!     │                                                    │ len > 0 │ len == 0
//!     │                                          AwaitData ◄┘         │
//!     │                                              │ len bytes      ▼
//!     │                             AwaitChecksumLo ◄────────────────┘
//!     │                                   ▼
//!     │                             AwaitChecksumHi → AwaitKeepalive → AwaitStatus
//!     └──────────────────────────────────── emit packet ◄──────────────────┘
//! ```
//!
//! Once the sync word is seen the parser never resynchronizes inside a
//! frame: a corrupt frame shows up as `checksum_ok == false`, never as an
//! error.

use tracing::trace;

use super::commands::{Command, SYNC_0, SYNC_1};
use super::packet::{Packet, Payload};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum State {
    #[default]
    AwaitSync0,
    AwaitSync1,
    AwaitCommand,
    AwaitCompression,
    AwaitLengthLo,
    AwaitLengthHi,
    AwaitData,
    AwaitChecksumLo,
    AwaitChecksumHi,
    AwaitKeepalive,
    AwaitStatus,
}

/// Frame under construction.
#[derive(Debug, Clone, Default)]
struct PartialPacket {
    command: u8,
    compression: u8,
    length_lo: u8,
    data_length: u16,
    payload: Vec<u8>,
    /// Running sum of payload bytes, header bytes added at checksum time.
    sum: u16,
    checksum_lo: u8,
    checksum: u16,
    checksum_ok: bool,
    keepalive: u8,
}

impl PartialPacket {
    fn finish(self, status: u8) -> Packet {
        Packet {
            command: Command::from_byte(self.command),
            has_compression: self.compression != 0,
            data_length: self.data_length,
            payload: Payload::Raw(self.payload),
            checksum: self.checksum,
            checksum_ok: self.checksum_ok,
            keepalive: self.keepalive,
            status,
        }
    }
}

/// # Frame Parser
///
/// Owns the state of one capture session: the bytes not yet consumed, the
/// current state and the frame being built. Each session gets its own
/// parser; abandoning a session is just dropping it.
///
/// ## Example
///
/// ```
/// use gbprinter::protocol::{commands::Command, parser::FrameParser};
///
/// let frame = [0x88, 0x33, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x81, 0x00];
/// let mut parser = FrameParser::new();
///
/// // Split anywhere: nothing until the frame completes
/// assert!(parser.feed(&frame[..4]).is_none());
/// let packet = parser.feed(&frame[4..]).unwrap();
///
/// assert_eq!(packet.command, Command::Init);
/// assert!(packet.checksum_ok);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FrameParser {
    buffer: Vec<u8>,
    /// Index of the next unconsumed byte in `buffer`.
    pos: usize,
    state: State,
    partial: PartialPacket,
}

impl FrameParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append bytes and advance until one packet completes.
    ///
    /// Returns `None` when the buffered bytes do not finish a frame; the
    /// partial frame is kept for the next call. Bytes after a completed
    /// frame stay buffered, so call again (with an empty slice if needed)
    /// to collect further packets.
    pub fn feed(&mut self, bytes: &[u8]) -> Option<Packet> {
        if !bytes.is_empty() {
            if self.pos > 0 {
                self.buffer.drain(..self.pos);
                self.pos = 0;
            }
            self.buffer.extend_from_slice(bytes);
        }

        while self.pos < self.buffer.len() {
            let byte = self.buffer[self.pos];
            self.pos += 1;
            if let Some(packet) = self.step(byte) {
                return Some(packet);
            }
        }

        self.buffer.clear();
        self.pos = 0;
        None
    }

    /// Append bytes and collect every packet they complete.
    pub fn feed_all(&mut self, bytes: &[u8]) -> Vec<Packet> {
        let mut packets = Vec::new();
        let mut next = self.feed(bytes);
        while let Some(packet) = next {
            packets.push(packet);
            next = self.feed(&[]);
        }
        packets
    }

    /// True when no frame is in progress and nothing is buffered.
    pub fn is_idle(&self) -> bool {
        self.state == State::AwaitSync0 && self.pos >= self.buffer.len()
    }

    /// Discard any partial frame and buffered bytes.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn step(&mut self, byte: u8) -> Option<Packet> {
        let p = &mut self.partial;

        match self.state {
            State::AwaitSync0 => {
                *p = PartialPacket::default();
                if byte == SYNC_0 {
                    self.state = State::AwaitSync1;
                }
            }
            State::AwaitSync1 => {
                if byte == SYNC_1 {
                    self.state = State::AwaitCommand;
                } else {
                    trace!(byte, "sync lost");
                    *p = PartialPacket::default();
                    self.state = State::AwaitSync0;
                }
            }
            State::AwaitCommand => {
                p.command = byte;
                self.state = State::AwaitCompression;
            }
            State::AwaitCompression => {
                p.compression = byte;
                self.state = State::AwaitLengthLo;
            }
            State::AwaitLengthLo => {
                p.length_lo = byte;
                self.state = State::AwaitLengthHi;
            }
            State::AwaitLengthHi => {
                p.data_length = u16::from_le_bytes([p.length_lo, byte]);
                p.payload = Vec::with_capacity(p.data_length as usize);
                self.state = if p.data_length == 0 {
                    State::AwaitChecksumLo
                } else {
                    State::AwaitData
                };
            }
            State::AwaitData => {
                p.payload.push(byte);
                p.sum = p.sum.wrapping_add(byte as u16);
                if p.payload.len() == p.data_length as usize {
                    self.state = State::AwaitChecksumLo;
                }
            }
            State::AwaitChecksumLo => {
                p.checksum_lo = byte;
                self.state = State::AwaitChecksumHi;
            }
            State::AwaitChecksumHi => {
                p.checksum = u16::from_le_bytes([p.checksum_lo, byte]);
                let [len_lo, len_hi] = p.data_length.to_le_bytes();
                p.sum = [p.command, p.compression, len_lo, len_hi]
                    .iter()
                    .fold(p.sum, |acc, &b| acc.wrapping_add(b as u16));
                p.checksum_ok = p.sum == p.checksum;
                self.state = State::AwaitKeepalive;
            }
            State::AwaitKeepalive => {
                p.keepalive = byte;
                self.state = State::AwaitStatus;
            }
            State::AwaitStatus => {
                self.state = State::AwaitSync0;
                let packet = std::mem::take(p).finish(byte);
                trace!(
                    command = %packet.command,
                    length = packet.data_length,
                    checksum_ok = packet.checksum_ok,
                    "packet framed"
                );
                return Some(packet);
            }
        }

        None
    }
}

/// Frame every complete packet in a finished capture.
///
/// A trailing partial frame is dropped.
pub fn parse_all(bytes: &[u8]) -> Vec<Packet> {
    FrameParser::new().feed_all(bytes)
}

// ============================================================================
// TESTS
// ============================================================================
