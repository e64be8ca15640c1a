//! # gbprinter - Game Boy Printer Capture Decoder
//!
//! gbprinter turns the byte stream a Game Boy sends to its printer into a
//! grayscale image. It provides:
//!
//! - **Protocol implementation**: incremental, checksum-validated framing
//! - **Compression**: the printer's run-length payload codec
//! - **Palette harmonization**: retroactive remapping of tile data once
//!   the print instruction arrives
//! - **Rendering**: 2bpp tile decoding and raster assembly
//! - **Capture sources**: hex dump text and a serial emulator link
//!
//! ## Quick Start
//!
//! ```
//! use gbprinter::{hexdump, decoder::Decoder};
//!
//! // A DATA packet with one blank tile, as an emulator logs it
//! let capture = "88 33 04 00 10 00
//!                00 00 00 00 00 00 00 00 00 00 00 00 00 00 00 00
//!                14 00 81 00";
//!
//! let bytes = hexdump::parse(capture)?;
//! let decoded = Decoder::default().decode_bytes(&bytes)?;
//!
//! let image = &decoded.images[0];
//! assert_eq!((image.width, image.height), (160, 8));
//! assert!(image.pixels.iter().all(|&p| p == 255));
//! # Ok::<(), gbprinter::GbpError>(())
//! ```
//!
//! ## Module Overview
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`protocol`] | Framing, checksums, compression, print instruction |
//! | [`render`] | Palette harmonization, tiles, raster assembly |
//! | [`decoder`] | End-to-end pipeline and per-capture summary |
//! | [`hexdump`] | Hex dump text input |
//! | [`transport`] | Live capture sources |
//! | [`printer`] | Printer configuration |
//! | [`error`] | Error types |

pub mod decoder;
pub mod error;
pub mod hexdump;
pub mod printer;
pub mod protocol;
pub mod render;
pub mod transport;

// Re-exports for convenience
pub use decoder::Decoder;
pub use error::GbpError;
pub use printer::PrinterConfig;
pub use protocol::{FrameParser, Packet};
pub use render::Image;
