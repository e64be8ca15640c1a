//! # Decoding Pipeline
//!
//! Chains the protocol and render stages:
//!
//! ```text
//! bytes → FrameParser → packets → keep DATA + PRINT
//!       → decompress DATA → decode PRINT → harmonize palettes
//!       → tiles → Image(s)
//! ```
//!
//! A capture can hold several printed pages. A PRINT packet with a
//! non-zero trailing margin feeds paper after printing, which ends a page;
//! [`split_images`] cuts the stream there.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::GbpError;
use crate::printer::PrinterConfig;
use crate::protocol::commands::Command;
use crate::protocol::compression::decompress_packet;
use crate::protocol::packet::Packet;
use crate::protocol::parser::parse_all;
use crate::protocol::print::{PrintMetadata, decode_print_command};
use crate::render::palette::harmonize_palettes;
use crate::render::raster::{Image, IntensityPalette, assemble};
use crate::render::tiles::{Tile, decode_tiles};

/// Run the packet stages: filter, decompress, decode print, harmonize.
///
/// Only DATA and PRINT packets are kept. Checksum failures are logged but
/// the packets stay in the stream.
pub fn decode_packets(packets: Vec<Packet>) -> Vec<Packet> {
    let mut stream: Vec<Packet> = packets
        .into_iter()
        .filter(|p| matches!(p.command, Command::Data | Command::Print))
        .collect();

    for packet in stream.iter_mut() {
        if !packet.checksum_ok {
            warn!(
                command = %packet.command,
                checksum = packet.checksum,
                "checksum does not match data"
            );
        }
        decompress_packet(packet);
        decode_print_command(packet);
    }
    debug!(packets = stream.len(), "image packets decoded");

    harmonize_palettes(stream)
}

/// Tiles of every DATA packet in order, and the last PRINT palette seen.
pub fn collect_tiles(packets: &[Packet]) -> (Vec<Tile>, Option<[u8; 4]>) {
    let mut tiles = Vec::new();
    let mut palette = None;

    for packet in packets {
        match packet.command {
            Command::Data => {
                if let Some(data) = packet.data() {
                    tiles.extend(decode_tiles(data));
                }
            }
            Command::Print => {
                if let Some(meta) = packet.print() {
                    palette = Some(meta.palette_data);
                }
            }
            _ => {}
        }
    }

    (tiles, palette)
}

/// Tiles of one printed page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageSegment {
    pub tiles: Vec<Tile>,
    /// Last print instruction of the page, if one arrived.
    pub print: Option<PrintMetadata>,
}

/// Split a decoded packet stream into pages.
///
/// A page ends at a PRINT packet whose lower margin is non-zero. Tiles
/// after the last such packet form a final page. Pages without tiles are
/// dropped.
pub fn split_images(packets: &[Packet]) -> Vec<ImageSegment> {
    let mut segments = Vec::new();
    let mut current = ImageSegment::default();

    for packet in packets {
        match packet.command {
            Command::Data => {
                if let Some(data) = packet.data() {
                    current.tiles.extend(decode_tiles(data));
                }
            }
            Command::Print => {
                let Some(meta) = packet.print() else { continue };
                current.print = Some(*meta);
                if meta.margin_lower != 0 {
                    let page = std::mem::take(&mut current);
                    if !page.tiles.is_empty() {
                        segments.push(page);
                    }
                }
            }
            _ => {}
        }
    }

    if !current.tiles.is_empty() {
        segments.push(current);
    }
    segments
}

/// Per-capture counts for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DecodeSummary {
    pub packets: usize,
    pub init: usize,
    pub print: usize,
    pub data: usize,
    pub brk: usize,
    pub status: usize,
    pub unknown: usize,
    pub checksum_failures: usize,
    pub tiles: usize,
}

impl DecodeSummary {
    /// Count framed packets by command.
    pub fn from_packets(packets: &[Packet]) -> Self {
        let mut summary = DecodeSummary {
            packets: packets.len(),
            ..Default::default()
        };
        for packet in packets {
            match packet.command {
                Command::Init => summary.init += 1,
                Command::Print => summary.print += 1,
                Command::Data => summary.data += 1,
                Command::Break => summary.brk += 1,
                Command::Status => summary.status += 1,
                Command::Unknown(_) => summary.unknown += 1,
            }
            if !packet.checksum_ok {
                summary.checksum_failures += 1;
            }
        }
        summary
    }
}

/// Result of decoding one capture.
#[derive(Debug, Clone)]
pub struct Decoded {
    pub images: Vec<Image>,
    pub summary: DecodeSummary,
}

/// # Capture Decoder
///
/// Runs the whole pipeline with a fixed layout and intensity palette.
///
/// ## Example
///
/// ```
/// use gbprinter::decoder::Decoder;
/// use gbprinter::protocol::{commands::Command, packet::encode_frame};
///
/// let mut capture = encode_frame(Command::Init, false, &[]);
/// capture.extend(encode_frame(Command::Data, false, &[0u8; 16 * 20]));
/// capture.extend(encode_frame(Command::Print, false, &[0x01, 0x13, 0xE4, 0x40]));
///
/// let decoded = Decoder::default().decode_bytes(&capture)?;
/// assert_eq!(decoded.summary.packets, 3);
/// assert_eq!(decoded.images.len(), 1);
/// assert_eq!((decoded.images[0].width, decoded.images[0].height), (160, 8));
/// # Ok::<(), gbprinter::GbpError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Decoder {
    tiles_per_line: usize,
    palette: IntensityPalette,
    split_pages: bool,
}

impl Decoder {
    /// Decoder using a printer's layout and palette.
    pub fn new(config: &PrinterConfig) -> Self {
        Self {
            tiles_per_line: config.tiles_per_line as usize,
            palette: config.palette,
            split_pages: false,
        }
    }

    pub fn with_tiles_per_line(mut self, tiles_per_line: usize) -> Self {
        self.tiles_per_line = tiles_per_line;
        self
    }

    pub fn with_palette(mut self, palette: IntensityPalette) -> Self {
        self.palette = palette;
        self
    }

    /// Produce one image per printed page instead of one for the capture.
    pub fn split_pages(mut self, split: bool) -> Self {
        self.split_pages = split;
        self
    }

    /// Decode raw capture bytes.
    pub fn decode_bytes(&self, bytes: &[u8]) -> Result<Decoded, GbpError> {
        self.decode(parse_all(bytes))
    }

    /// Decode framed packets.
    pub fn decode(&self, packets: Vec<Packet>) -> Result<Decoded, GbpError> {
        let mut summary = DecodeSummary::from_packets(&packets);
        debug!(?summary, "packets framed");

        let decoded = decode_packets(packets);

        let pages: Vec<Vec<Tile>> = if self.split_pages {
            split_images(&decoded).into_iter().map(|s| s.tiles).collect()
        } else {
            let (tiles, palette) = collect_tiles(&decoded);
            debug!(tiles = tiles.len(), ?palette, "tiles decoded");
            if tiles.is_empty() {
                Vec::new()
            } else {
                vec![tiles]
            }
        };

        summary.tiles = pages.iter().map(Vec::len).sum();

        let images = pages
            .iter()
            .map(|tiles| assemble(tiles, self.tiles_per_line, &self.palette))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Decoded { images, summary })
    }
}

impl Default for Decoder {
    fn default() -> Self {
        Self::new(&PrinterConfig::GAMEBOY_PRINTER)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::compression::compress;
    use crate::protocol::packet::encode_frame;

    fn print_frame(margins: u8, palette: u8) -> Vec<u8> {
        encode_frame(Command::Print, false, &[0x01, margins, palette, 0x40])
    }

    #[test]
    fn test_decode_packets_filters_and_expands() {
        let mut capture = encode_frame(Command::Init, false, &[]);
        capture.extend(encode_frame(Command::Data, true, &compress(&[0u8; 32])));
        capture.extend(encode_frame(Command::Status, false, &[]));
        capture.extend(print_frame(0x00, 0xE4));

        let packets = decode_packets(parse_all(&capture));

        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0].command, Command::Data);
        assert!(!packets[0].has_compression);
        assert_eq!(packets[0].data(), Some(&[0u8; 32][..]));
        assert_eq!(packets[1].print().map(|m| m.margin_lower), Some(0));
    }

    #[test]
    fn test_collect_tiles_reports_palette() {
        let mut capture = encode_frame(Command::Data, false, &[0u8; 48]);
        capture.extend(print_frame(0x00, 0x1B));

        let (tiles, palette) = collect_tiles(&decode_packets(parse_all(&capture)));

        assert_eq!(tiles.len(), 3);
        assert_eq!(palette, Some([0, 1, 2, 3]));
        // Inverting palette turned every pixel to 3
        assert!(tiles.iter().all(|t| t.pixels().iter().all(|&p| p == 3)));
    }

    #[test]
    fn test_split_images_on_lower_margin() {
        let mut capture = encode_frame(Command::Data, false, &[0u8; 32]);
        capture.extend(print_frame(0x10, 0xE4)); // no feed after: same page
        capture.extend(encode_frame(Command::Data, false, &[0u8; 16]));
        capture.extend(print_frame(0x03, 0xE4)); // feed after: page ends
        capture.extend(encode_frame(Command::Data, false, &[0u8; 64]));
        capture.extend(print_frame(0x00, 0xE4));

        let segments = split_images(&decode_packets(parse_all(&capture)));

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].tiles.len(), 3);
        assert_eq!(segments[0].print.map(|m| m.margin_lower), Some(3));
        assert_eq!(segments[1].tiles.len(), 4);
    }

    #[test]
    fn test_split_images_skips_empty_pages() {
        let mut capture = print_frame(0x03, 0xE4);
        capture.extend(encode_frame(Command::Data, false, &[0u8; 16]));

        let segments = split_images(&decode_packets(parse_all(&capture)));
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].print, None);
    }

    #[test]
    fn test_summary_counts() {
        let mut capture = encode_frame(Command::Init, false, &[]);
        capture.extend(encode_frame(Command::Status, false, &[]));
        capture.extend(encode_frame(Command::Break, false, &[]));
        capture.extend(encode_frame(Command::Unknown(0x20), false, &[]));
        let mut bad = encode_frame(Command::Data, false, &[0u8; 16]);
        bad[6] = 0xFF;
        capture.extend(bad);

        let summary = DecodeSummary::from_packets(&parse_all(&capture));

        assert_eq!(summary.packets, 5);
        assert_eq!(summary.init, 1);
        assert_eq!(summary.status, 1);
        assert_eq!(summary.brk, 1);
        assert_eq!(summary.unknown, 1);
        assert_eq!(summary.data, 1);
        assert_eq!(summary.checksum_failures, 1);
    }

    #[test]
    fn test_decoder_split_pages() {
        let mut capture = encode_frame(Command::Data, false, &[0u8; 16 * 20]);
        capture.extend(print_frame(0x03, 0xE4));
        capture.extend(encode_frame(Command::Data, false, &[0u8; 16 * 40]));
        capture.extend(print_frame(0x03, 0xE4));

        let whole = Decoder::default().decode_bytes(&capture).unwrap();
        assert_eq!(whole.images.len(), 1);
        assert_eq!(whole.images[0].height, 24);
        assert_eq!(whole.summary.tiles, 60);

        let pages = Decoder::default().split_pages(true).decode_bytes(&capture).unwrap();
        assert_eq!(pages.images.len(), 2);
        assert_eq!(pages.images[0].height, 8);
        assert_eq!(pages.images[1].height, 16);
    }

    #[test]
    fn test_decoder_empty_capture() {
        let decoded = Decoder::default().decode_bytes(&[]).unwrap();
        assert!(decoded.images.is_empty());
        assert_eq!(decoded.summary, DecodeSummary::default());
    }

    #[test]
    fn test_decoder_rejects_zero_width() {
        let capture = encode_frame(Command::Data, false, &[0u8; 16]);
        let result = Decoder::default().with_tiles_per_line(0).decode_bytes(&capture);
        assert!(matches!(result, Err(GbpError::InvalidLayout(_))));
    }
}
