//! # Payload Compression
//!
//! DATA packets with the compression flag set carry a run-length encoded
//! payload. The stream is a sequence of blocks, each introduced by a
//! marker byte:
//!
//! | Marker | Meaning |
//! |--------|---------|
//! | `1nnnnnnn` | Repeat the next byte `n + 2` times (2..=129) |
//! | `0nnnnnnn` | Copy the next `n + 1` bytes verbatim (1..=128) |
//!
//! ```text
//! 84 FF 02 11 22 33  →  FF FF FF FF FF FF 11 22 33
//! ── ──  ── ────────
//! run    literal (3)
//! ```

use super::commands::Command;
use super::packet::{Packet, Payload};

/// Longest run a single block can express.
const MAX_RUN: usize = 0x7F + 2;

/// Longest literal a single block can express.
const MAX_LITERAL: usize = 0x7F + 1;

/// Expand a run-length encoded payload.
///
/// A block cut short at the end of the input expands as far as its bytes
/// reach; a trailing run marker with no byte to repeat is dropped.
///
/// ```
/// use gbprinter::protocol::compression::decompress;
///
/// assert_eq!(decompress(&[0x84, 0xFF, 0x02, 0x11, 0x22, 0x33]),
///            vec![0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x11, 0x22, 0x33]);
/// ```
pub fn decompress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() * 2);
    let mut i = 0;

    while i < data.len() {
        let marker = data[i];
        i += 1;

        if marker & 0x80 != 0 {
            let count = (marker & 0x7F) as usize + 2;
            if let Some(&byte) = data.get(i) {
                out.resize(out.len() + count, byte);
                i += 1;
            }
        } else {
            let count = (marker & 0x7F) as usize + 1;
            let end = (i + count).min(data.len());
            out.extend_from_slice(&data[i..end]);
            i = end;
        }
    }

    out
}

/// Run-length encode a payload in the format [`decompress`] reads.
///
/// Repeats of two or more bytes become runs, everything else literals.
pub fn compress(data: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(data.len() + data.len() / MAX_LITERAL + 1);
    let mut i = 0;

    while i < data.len() {
        let run = run_length(&data[i..]);
        if run >= 2 {
            out.push(0x80 | (run - 2) as u8);
            out.push(data[i]);
            i += run;
        } else {
            let start = i;
            while i < data.len() && i - start < MAX_LITERAL && run_length(&data[i..]) < 2 {
                i += 1;
            }
            out.push((i - start - 1) as u8);
            out.extend_from_slice(&data[start..i]);
        }
    }

    out
}

fn run_length(data: &[u8]) -> usize {
    match data.first() {
        Some(&first) => data.iter().take(MAX_RUN).take_while(|&&b| b == first).count(),
        None => 0,
    }
}

/// Expand a compressed DATA packet in place and clear its compression flag.
///
/// Other packets, and data packets already in expanded form, are untouched.
pub fn decompress_packet(packet: &mut Packet) {
    if packet.command != Command::Data || !packet.has_compression {
        return;
    }
    if let Payload::Raw(bytes) = &packet.payload {
        packet.payload = Payload::Raw(decompress(bytes));
    }
    packet.has_compression = false;
}

// ============================================================================
// TESTS
// ============================================================================
