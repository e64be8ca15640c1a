//! # Game Boy Printer Protocol
//!
//! This module implements the wire side of the Game Boy Printer link:
//! framing, packet checksums, payload compression and the print
//! instruction.
//!
//! ## Module Structure
//!
//! - [`commands`]: Sync bytes and command codes
//! - [`packet`]: Packet type, checksum and frame encoding
//! - [`parser`]: Incremental frame parser
//! - [`compression`]: Run-length payload codec
//! - [`print`]: Print instruction decoding
//!
//! ## Usage Example
//!
//! ```
//! use gbprinter::protocol::{commands::Command, packet, parser};
//!
//! // Two frames as the console would send them
//! let mut stream = packet::encode_frame(Command::Init, false, &[]);
//! stream.extend(packet::encode_frame(Command::Data, false, &[0u8; 16]));
//!
//! let packets = parser::parse_all(&stream);
//! assert_eq!(packets.len(), 2);
//! assert!(packets.iter().all(|p| p.checksum_ok));
//! ```
//!
//! ## Packet Format
//!
//! ```text
//! [0x88][0x33][CMD][COMPR][LEN_LO][LEN_HI][payload x LEN][CKSUM_LO][CKSUM_HI][KEEPALIVE][STATUS]
//! ```

pub mod commands;
pub mod compression;
pub mod packet;
pub mod parser;
pub mod print;

pub use commands::Command;
pub use packet::{Packet, Payload};
pub use parser::FrameParser;
pub use print::PrintMetadata;
