//! # Packets
//!
//! A packet is one complete, checksum-evaluated frame of the printer
//! protocol:
//!
//! ```text
//! [0x88][0x33][CMD][COMPR][LEN_LO][LEN_HI][payload x LEN][CKSUM_LO][CKSUM_HI][KEEPALIVE][STATUS]
//! ```
//!
//! The checksum is the 16-bit wrapping sum of the command, compression and
//! both length bytes plus every payload byte.

use serde::Serialize;

use super::commands::{
    COMPRESSION_DISABLED, COMPRESSION_ENABLED, Command, HEADER_LEN, SYNC_0, SYNC_1, TRAILER_LEN,
    u16_le,
};
use super::print::PrintMetadata;

/// Packet payload, keyed by how far the packet has been decoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Payload {
    /// Bytes as framed (or, for data packets, after decompression).
    Raw(Vec<u8>),
    /// A print instruction decoded into its fields.
    Print(PrintMetadata),
}

impl Payload {
    /// Raw bytes, if the payload has not been decoded into metadata.
    pub fn bytes(&self) -> Option<&[u8]> {
        match self {
            Payload::Raw(bytes) => Some(bytes),
            Payload::Print(_) => None,
        }
    }

    /// Decoded print instruction, if any.
    pub fn print(&self) -> Option<&PrintMetadata> {
        match self {
            Payload::Print(meta) => Some(meta),
            Payload::Raw(_) => None,
        }
    }

    /// Wire form of the payload.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Payload::Raw(bytes) => bytes.clone(),
            Payload::Print(meta) => meta.to_bytes().to_vec(),
        }
    }
}

impl Default for Payload {
    fn default() -> Self {
        Payload::Raw(Vec::new())
    }
}

/// # Framed Packet
///
/// Produced by [`FrameParser`](super::parser::FrameParser). `data_length`
/// is the length field as transmitted; it equals the framed payload length.
/// Once a data packet is decompressed its payload grows but `data_length`
/// keeps the transmitted value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Packet {
    pub command: Command,
    pub has_compression: bool,
    pub data_length: u16,
    pub payload: Payload,
    /// Checksum as transmitted.
    pub checksum: u16,
    pub checksum_ok: bool,
    /// Trailer bytes, kept raw.
    pub keepalive: u8,
    pub status: u8,
}

impl Packet {
    /// Build a packet with a valid checksum and zeroed trailer bytes.
    ///
    /// ```
    /// use gbprinter::protocol::{commands::Command, packet::Packet};
    ///
    /// let packet = Packet::new(Command::Data, false, vec![0; 16]);
    /// assert!(packet.checksum_ok);
    /// assert_eq!(packet.checksum, 0x14);
    /// ```
    pub fn new(command: Command, has_compression: bool, payload: Vec<u8>) -> Self {
        let compression = compression_byte(has_compression);
        let checksum = checksum(command.to_byte(), compression, &payload);
        Self {
            command,
            has_compression,
            data_length: payload.len() as u16,
            payload: Payload::Raw(payload),
            checksum,
            checksum_ok: true,
            keepalive: 0,
            status: 0,
        }
    }

    /// Raw payload bytes, `None` once decoded into print metadata.
    pub fn data(&self) -> Option<&[u8]> {
        self.payload.bytes()
    }

    /// Decoded print instruction, if this is a decoded print packet.
    pub fn print(&self) -> Option<&PrintMetadata> {
        self.payload.print()
    }

    /// Serialize back into a wire frame.
    ///
    /// The checksum is recomputed from the current payload; the trailer
    /// bytes are written as recorded.
    pub fn encode(&self) -> Vec<u8> {
        let mut frame = encode_frame(self.command, self.has_compression, &self.payload.to_bytes());
        let n = frame.len();
        frame[n - 2] = self.keepalive;
        frame[n - 1] = self.status;
        frame
    }
}

/// Compute the frame checksum over header fields and payload.
///
/// ```
/// use gbprinter::protocol::packet::checksum;
///
/// // DATA, uncompressed, 16 zero bytes: 0x04 + 0x10
/// assert_eq!(checksum(0x04, 0x00, &[0; 16]), 0x0014);
/// ```
pub fn checksum(command: u8, compression: u8, payload: &[u8]) -> u16 {
    let [len_lo, len_hi] = u16_le(payload.len() as u16);
    let header = [command, compression, len_lo, len_hi];
    header
        .iter()
        .chain(payload)
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
}

/// Build a complete wire frame with a valid checksum.
///
/// The keepalive and status trailer bytes are written as zero.
pub fn encode_frame(command: Command, compressed: bool, payload: &[u8]) -> Vec<u8> {
    let compression = compression_byte(compressed);
    let mut frame = Vec::with_capacity(HEADER_LEN + payload.len() + TRAILER_LEN);
    frame.push(SYNC_0);
    frame.push(SYNC_1);
    frame.push(command.to_byte());
    frame.push(compression);
    frame.extend_from_slice(&u16_le(payload.len() as u16));
    frame.extend_from_slice(payload);
    frame.extend_from_slice(&u16_le(checksum(command.to_byte(), compression, payload)));
    frame.push(0x00);
    frame.push(0x00);
    frame
}

fn compression_byte(compressed: bool) -> u8 {
    if compressed {
        COMPRESSION_ENABLED
    } else {
        COMPRESSION_DISABLED
    }
}

// ============================================================================
// TESTS
// ============================================================================
