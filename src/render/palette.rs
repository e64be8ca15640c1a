//! # Palette Harmonization
//!
//! DATA packets store pixels in the console's native order, but the palette
//! that says what those values mean only arrives later, in the PRINT packet
//! that ends the batch. Harmonization rewrites every DATA packet received
//! since the previous PRINT so that its pixel values already reflect that
//! palette.
//!
//! ```text
//! DATA DATA DATA PRINT(palette) DATA DATA PRINT(palette')
//! └────── remapped with palette ┘ └─ remapped with palette' ┘
//! ```
//!
//! Each pixel value `v` becomes `palette[3 - v]`, so the identity palette
//! `[3, 2, 1, 0]` (byte 0xE4) leaves the data unchanged.
//!
//! Harmonizing a packet twice corrupts it. [`PaletteHarmonizer`] releases
//! every DATA packet exactly once, in arrival order.

use std::collections::VecDeque;

use tracing::debug;

use super::tiles::{decode_2bpp, encode_2bpp};
use crate::protocol::commands::Command;
use crate::protocol::packet::{Packet, Payload};
use crate::protocol::print::PrintMetadata;

/// Remap one `[low, high]` bit-plane pair through a print palette.
///
/// ```
/// use gbprinter::render::palette::harmonize_pair;
///
/// // Identity palette
/// assert_eq!(harmonize_pair(0x3C, 0x7E, &[3, 2, 1, 0]), [0x3C, 0x7E]);
/// // Inverting palette swaps 0↔3 and 1↔2
/// assert_eq!(harmonize_pair(0x00, 0x00, &[0, 1, 2, 3]), [0xFF, 0xFF]);
/// ```
///
/// # Panics
///
/// If a palette entry is above 3. Palettes from [`PrintMetadata`] never are.
pub fn harmonize_pair(low: u8, high: u8, palette: &[u8; 4]) -> [u8; 2] {
    assert!(
        palette.iter().all(|&v| v < 4),
        "print palette entries must be 2-bit values, got {:?}",
        palette
    );

    let mut row = decode_2bpp(high, low);
    for value in row.iter_mut() {
        *value = palette[3 - *value as usize];
    }
    encode_2bpp(&row)
}

/// Remap a whole data payload, two bytes at a time.
///
/// A trailing odd byte has no partner plane and is copied unchanged.
pub fn harmonize_data(data: &[u8], palette: &[u8; 4]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len());
    let mut pairs = data.chunks_exact(2);
    for pair in &mut pairs {
        out.extend_from_slice(&harmonize_pair(pair[0], pair[1], palette));
    }
    out.extend_from_slice(pairs.remainder());
    out
}

/// # Palette Harmonizer
///
/// Streaming FIFO of DATA packets waiting for their PRINT packet.
///
/// Packets go in through [`push`](Self::push) and come out, in the same
/// order, once the PRINT packet that closes their batch arrives. Packets
/// that are neither DATA nor PRINT pass straight through when nothing is
/// pending, and otherwise wait in line to keep the original order.
///
/// ## Example
///
/// ```
/// use gbprinter::protocol::{commands::Command, packet::Packet};
/// use gbprinter::render::palette::PaletteHarmonizer;
///
/// let mut harmonizer = PaletteHarmonizer::new();
/// assert!(harmonizer.push(Packet::new(Command::Data, false, vec![0x00, 0x00])).is_empty());
///
/// // Palette byte 0x1B = [0, 1, 2, 3] inverts every pixel
/// let released = harmonizer.push(Packet::new(Command::Print, false, vec![1, 0, 0x1B, 0x40]));
/// assert_eq!(released.len(), 2);
/// assert_eq!(released[0].data(), Some(&[0xFF, 0xFF][..]));
/// ```
#[derive(Debug, Default)]
pub struct PaletteHarmonizer {
    pending: VecDeque<Packet>,
}

impl PaletteHarmonizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of packets held back waiting for a PRINT packet.
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Accept the next packet; returns the packets now ready, in order.
    pub fn push(&mut self, packet: Packet) -> Vec<Packet> {
        let command = packet.command;
        match command {
            Command::Data => {
                self.pending.push_back(packet);
                Vec::new()
            }
            Command::Print => {
                let palette = print_palette(&packet);
                let mut ready: Vec<Packet> = self
                    .pending
                    .drain(..)
                    .map(|mut queued| {
                        if queued.command == Command::Data {
                            harmonize_packet(&mut queued, &palette);
                        }
                        queued
                    })
                    .collect();
                debug!(packets = ready.len(), ?palette, "harmonized batch");
                ready.push(packet);
                ready
            }
            _ if self.pending.is_empty() => vec![packet],
            _ => {
                self.pending.push_back(packet);
                Vec::new()
            }
        }
    }

    /// Release whatever is still pending, unharmonized.
    ///
    /// DATA packets with no PRINT packet after them keep their native
    /// pixel values.
    pub fn finish(self) -> Vec<Packet> {
        Vec::from(self.pending)
    }
}

/// Harmonize a complete packet sequence.
pub fn harmonize_palettes(packets: Vec<Packet>) -> Vec<Packet> {
    let mut harmonizer = PaletteHarmonizer::new();
    let mut out = Vec::with_capacity(packets.len());
    for packet in packets {
        out.extend(harmonizer.push(packet));
    }
    out.extend(harmonizer.finish());
    out
}

fn print_palette(packet: &Packet) -> [u8; 4] {
    match &packet.payload {
        Payload::Print(meta) => meta.palette_data,
        Payload::Raw(bytes) => PrintMetadata::decode(bytes).palette_data,
    }
}

fn harmonize_packet(packet: &mut Packet, palette: &[u8; 4]) {
    if let Payload::Raw(bytes) = &packet.payload {
        packet.payload = Payload::Raw(harmonize_data(bytes, palette));
    }
}

// ============================================================================
// TESTS
// ============================================================================
