//! # Decoding Tests
//!
//! End-to-end checks of the capture pipeline, plus property tests for the
//! framing and codec layers.
//!
//! - **Fixed captures**: hand-built frames with known image output
//! - **Properties**: checksum validity, chunk-boundary independence,
//!   compression inverse, identity harmonization

use gbprinter::decoder::{self, Decoder};
use gbprinter::hexdump;
use gbprinter::protocol::commands::Command;
use gbprinter::protocol::compression::{compress, decompress};
use gbprinter::protocol::packet::{checksum, encode_frame};
use gbprinter::protocol::parser::{FrameParser, parse_all};
use gbprinter::protocol::print::IDENTITY_PALETTE;
use gbprinter::render::palette::harmonize_data;
use gbprinter::render::raster::{IntensityPalette, assemble};
use gbprinter::render::tiles::{Tile, decode_2bpp, decode_tiles};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ============================================================================
// HELPER FUNCTIONS
// ============================================================================

/// DATA frame with 16 zero bytes, checksum 0x0014 and two trailer bytes.
fn zero_tile_frame(keepalive: u8, status: u8) -> Vec<u8> {
    let mut frame = vec![0x88, 0x33, 0x04, 0x00, 0x10, 0x00];
    frame.extend([0u8; 16]);
    frame.extend([0x14, 0x00, keepalive, status]);
    frame
}

/// A small print job: INIT, two DATA packets (one compressed), PRINT, INQUIRY.
fn print_job(palette: u8) -> Vec<u8> {
    // Row 0: blank tiles. Row 1: tiles with every pixel at index 1.
    let blank = vec![0u8; 16 * 20];
    let mut light = Vec::with_capacity(16 * 20);
    for _ in 0..20 * 8 {
        light.extend([0xFF, 0x00]);
    }

    let mut capture = encode_frame(Command::Init, false, &[]);
    capture.extend(encode_frame(Command::Data, false, &blank));
    capture.extend(encode_frame(Command::Data, true, &compress(&light)));
    capture.extend(encode_frame(Command::Data, false, &[]));
    capture.extend(encode_frame(Command::Print, false, &[0x01, 0x13, palette, 0x40]));
    capture.extend(encode_frame(Command::Status, false, &[]));
    capture
}

// ============================================================================
// FIXED CAPTURES
// ============================================================================

#[test]
fn test_zero_tile_frame_parses() {
    let packets = parse_all(&zero_tile_frame(0x81, 0x00));

    assert_eq!(packets.len(), 1);
    assert_eq!(packets[0].command, Command::Data);
    assert!(packets[0].checksum_ok);
    assert_eq!(packets[0].data(), Some(&[0u8; 16][..]));
}

#[test]
fn test_zero_tile_decodes_blank() {
    let packets = parse_all(&zero_tile_frame(0x00, 0x00));
    let tiles = decode_tiles(packets[0].data().unwrap());

    assert_eq!(tiles.len(), 1);
    assert_eq!(tiles[0].pixels(), &[0u8; 64]);

    let row = vec![tiles[0]; 20];
    let image = assemble(&row, 20, &IntensityPalette::default()).unwrap();
    assert_eq!((image.width, image.height), (160, 8));
    assert!(image.pixels.iter().all(|&p| p == 255));
}

#[test]
fn test_uniform_2bpp_rows() {
    assert_eq!(decode_2bpp(0x00, 0x00), [0; 8]);
    assert_eq!(decode_2bpp(0xFF, 0xFF), [3; 8]);
    assert_eq!(decode_2bpp(0xFF, 0x00), [2; 8]);
    assert_eq!(decode_2bpp(0x00, 0xFF), [1; 8]);
}

#[test]
fn test_print_job_identity_palette() {
    let decoded = Decoder::default().decode_bytes(&print_job(0xE4)).unwrap();

    assert_eq!(decoded.summary.packets, 6);
    assert_eq!(decoded.summary.data, 3);
    assert_eq!(decoded.summary.checksum_failures, 0);
    assert_eq!(decoded.images.len(), 1);

    let image = &decoded.images[0];
    assert_eq!((image.width, image.height), (160, 16));
    assert!(image.pixels[..160 * 8].iter().all(|&p| p == 255));
    // Index 1 → 85 with the default intensities
    assert!(image.pixels[160 * 8..].iter().all(|&p| p == 85));
}

#[test]
fn test_print_job_inverting_palette() {
    // 0x1B = [0, 1, 2, 3]: 0 → 3, 1 → 2
    let decoded = Decoder::default().decode_bytes(&print_job(0x1B)).unwrap();
    let image = &decoded.images[0];

    assert!(image.pixels[..160 * 8].iter().all(|&p| p == 0));
    assert!(image.pixels[160 * 8..].iter().all(|&p| p == 170));
}

#[test]
fn test_custom_intensities_and_width() {
    let decoder = Decoder::default()
        .with_tiles_per_line(10)
        .with_palette("0,1,2,3".parse().unwrap());
    let decoded = decoder.decode_bytes(&print_job(0xE4)).unwrap();
    let image = &decoded.images[0];

    assert_eq!((image.width, image.height), (80, 32));
    assert_eq!(image.row(0)[0], 0);
    assert_eq!(image.row(31)[79], 1);
}

#[test]
fn test_hex_dump_capture() {
    let text = format!(
        "// Game Boy Printer capture\n/* INIT */\n{}\n# tile data\n{}\n",
        hexdump::format(&encode_frame(Command::Init, false, &[]), 16),
        hexdump::format(&zero_tile_frame(0x81, 0x00), 16),
    );
    let bytes = hexdump::parse(&text).unwrap();
    let packets = parse_all(&bytes);

    assert_eq!(packets.len(), 2);
    assert_eq!(packets[0].command, Command::Init);
    assert_eq!(packets[1].command, Command::Data);
}

#[test]
fn test_corrupt_packet_still_flows_downstream() {
    let mut capture = zero_tile_frame(0x00, 0x00);
    capture[8] = 0xFF; // payload byte

    let decoded = Decoder::default().decode_bytes(&capture).unwrap();

    assert_eq!(decoded.summary.checksum_failures, 1);
    assert_eq!(decoded.images.len(), 1);
}

#[test]
fn test_streaming_session_matches_batch() {
    let capture = print_job(0x1B);
    let batch = decoder::decode_packets(parse_all(&capture));

    let mut parser = FrameParser::new();
    let mut packets = Vec::new();
    for chunk in capture.chunks(7) {
        packets.extend(parser.feed_all(chunk));
    }

    assert_eq!(decoder::decode_packets(packets), batch);
}

#[test]
fn test_session_parser_drops_frame_cut_by_idle() {
    let frame = zero_tile_frame(0x81, 0x00);
    let mut parser = FrameParser::new();

    // First session: one full frame, then the link goes quiet mid-frame
    let mut session = frame.clone();
    session.extend(&frame[..10]);
    assert_eq!(parser.feed_all(&session).len(), 1);
    assert!(!parser.is_idle());
    parser.reset();

    // Next session starts clean; the stale tail is not glued onto it
    assert!(parser.feed_all(&frame[10..]).is_empty());
    assert!(parser.is_idle());
    let packets = parser.feed_all(&frame);
    assert_eq!(packets.len(), 1);
    assert!(packets[0].checksum_ok);
}

#[test]
fn test_collect_tiles_matches_raw_data() {
    let capture = print_job(0xE4);
    let (tiles, palette) = decoder::collect_tiles(&decoder::decode_packets(parse_all(&capture)));

    assert_eq!(tiles.len(), 40);
    assert_eq!(palette, Some(IDENTITY_PALETTE));
    assert_eq!(tiles[0], Tile::from_bytes(&[0; 16]));
}

// ============================================================================
// PROPERTIES
// ============================================================================

proptest! {
    #[test]
    fn prop_valid_checksum_accepted(
        command in prop_oneof![Just(0x01u8), Just(0x02), Just(0x04), Just(0x0F)],
        compressed in any::<bool>(),
        payload in prop::collection::vec(any::<u8>(), 0..700),
    ) {
        let frame = encode_frame(Command::from_byte(command), compressed, &payload);
        let packets = parse_all(&frame);

        prop_assert_eq!(packets.len(), 1);
        prop_assert!(packets[0].checksum_ok);
        prop_assert_eq!(packets[0].checksum, checksum(command, compressed as u8, &payload));
        prop_assert_eq!(packets[0].data(), Some(&payload[..]));
    }

    #[test]
    fn prop_single_bit_flip_detected(
        payload in prop::collection::vec(any::<u8>(), 1..64),
        index in any::<prop::sample::Index>(),
        bit in 0u8..8,
    ) {
        let mut frame = encode_frame(Command::Data, false, &payload);
        // Flip a bit in the command, compression or payload bytes
        let targets: Vec<usize> = [2usize, 3].into_iter().chain(6..6 + payload.len()).collect();
        let pos = targets[index.index(targets.len())];
        frame[pos] ^= 1 << bit;

        let packets = parse_all(&frame);
        prop_assert_eq!(packets.len(), 1);
        prop_assert!(!packets[0].checksum_ok);
    }

    #[test]
    fn prop_split_feed_matches_whole(
        payload in prop::collection::vec(any::<u8>(), 0..100),
        split in any::<prop::sample::Index>(),
    ) {
        let frame = encode_frame(Command::Data, false, &payload);
        let at = split.index(frame.len() + 1);

        let mut parser = FrameParser::new();
        let first = parser.feed(&frame[..at]);
        let second = parser.feed(&frame[at..]);
        let split_packets: Vec<_> = first.into_iter().chain(second).collect();

        prop_assert_eq!(split_packets, parse_all(&frame));
    }

    #[test]
    fn prop_decompress_inverts_compress(data in prop::collection::vec(
        prop_oneof![Just(0x00u8), Just(0xFF), any::<u8>()], 0..1000)
    ) {
        prop_assert_eq!(decompress(&compress(&data)), data);
    }

    #[test]
    fn prop_identity_harmonization_noop(data in prop::collection::vec(any::<u8>(), 0..640)) {
        prop_assert_eq!(harmonize_data(&data, &IDENTITY_PALETTE), data);
    }
}
