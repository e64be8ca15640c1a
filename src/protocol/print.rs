//! # Print Instruction
//!
//! The PRINT packet carries a 4-byte instruction:
//!
//! | Index | Field | Meaning |
//! |-------|-------|---------|
//! | 0 | sheets | Number of copies (0 = line feed only) |
//! | 1 | margins | High nibble: feeds before printing, low nibble: feeds after |
//! | 2 | palette | Four 2-bit entries, MSB first |
//! | 3 | density | Print darkness, 0x00-0x7F |
//!
//! ## Palette Byte
//!
//! ```text
//! 0xE4 = 11 10 01 00 → [3, 2, 1, 0]   (identity, the common default)
//!        ── ── ── ──
//!        [0][1][2][3]
//! ```

use serde::Serialize;

use super::commands::Command;
use super::packet::{Packet, Payload};

/// Identity palette: harmonizing with it leaves pixel data unchanged.
pub const IDENTITY_PALETTE: [u8; 4] = [3, 2, 1, 0];

/// Decoded print instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PrintMetadata {
    pub sheets: u8,
    /// Raw margin byte (both nibbles).
    pub margins: u8,
    pub margin_upper: u8,
    pub margin_lower: u8,
    pub palette_raw: u8,
    /// Palette byte split into its four 2-bit entries.
    pub palette_data: [u8; 4],
    pub density: u8,
}

impl PrintMetadata {
    /// Decode a print payload.
    ///
    /// Bytes missing from a short payload read as zero.
    ///
    /// ```
    /// use gbprinter::protocol::print::PrintMetadata;
    ///
    /// let meta = PrintMetadata::decode(&[0x01, 0x13, 0xE4, 0x40]);
    /// assert_eq!(meta.margin_upper, 1);
    /// assert_eq!(meta.margin_lower, 3);
    /// assert_eq!(meta.palette_data, [3, 2, 1, 0]);
    /// ```
    pub fn decode(payload: &[u8]) -> Self {
        let byte = |i: usize| payload.get(i).copied().unwrap_or(0);
        let margins = byte(1);
        let palette_raw = byte(2);

        Self {
            sheets: byte(0),
            margins,
            margin_upper: margins >> 4,
            margin_lower: margins & 0x0F,
            palette_raw,
            palette_data: parse_palette_byte(palette_raw),
            density: byte(3),
        }
    }

    /// Wire form of the instruction.
    pub fn to_bytes(&self) -> [u8; 4] {
        [self.sheets, self.margins, self.palette_raw, self.density]
    }
}

/// Split a palette byte into 2-bit entries from bit pairs 7:6, 5:4, 3:2, 1:0.
pub const fn parse_palette_byte(raw: u8) -> [u8; 4] {
    [(raw >> 6) & 0x3, (raw >> 4) & 0x3, (raw >> 2) & 0x3, raw & 0x3]
}

/// Replace a print packet's raw payload with its decoded instruction.
///
/// Packets that are not PRINT, or are already decoded, are left alone.
pub fn decode_print_command(packet: &mut Packet) {
    if packet.command != Command::Print {
        return;
    }
    if let Payload::Raw(bytes) = &packet.payload {
        packet.payload = Payload::Print(PrintMetadata::decode(bytes));
    }
}

// ============================================================================
// TESTS
// ============================================================================
