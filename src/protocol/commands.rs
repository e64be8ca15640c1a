//! # Game Boy Printer Commands
//!
//! This module defines the command bytes and framing constants of the
//! Game Boy Printer serial protocol.
//!
//! ## Protocol Overview
//!
//! The console drives the printer with a sequence of framed packets:
//!
//! ```text
//! INIT → DATA → INQUIRY → ... → DATA → INQUIRY → PRINT → INQUIRY ...
//! ```
//!
//! - **INIT**: clears the printer's image buffer
//! - **DATA**: carries up to 640 bytes of 2bpp tile data (two tile rows)
//! - **PRINT**: carries the print instruction (margins, palette, density)
//! - **BREAK**: forcibly stops printing
//! - **INQUIRY**: status request, no payload
//!
//! ## Byte Order
//!
//! Multi-byte integers use **little-endian** encoding:
//! - `u16` value 0x1234 is sent as bytes `[0x34, 0x12]`

use serde::Serialize;

// ============================================================================
// FRAMING CONSTANTS
// ============================================================================

/// First sync byte of every packet.
pub const SYNC_0: u8 = 0x88;

/// Second sync byte of every packet.
pub const SYNC_1: u8 = 0x33;

/// Compression flag: payload is transmitted as-is.
pub const COMPRESSION_DISABLED: u8 = 0x00;

/// Compression flag: payload is run-length encoded.
pub const COMPRESSION_ENABLED: u8 = 0x01;

/// Bytes before the payload: sync (2), command, compression, length (2).
pub const HEADER_LEN: usize = 6;

/// Bytes after the payload: checksum (2), keepalive, status.
pub const TRAILER_LEN: usize = 4;

// ============================================================================
// COMMANDS
// ============================================================================

/// # Packet Command
///
/// | Byte | Command | Payload |
/// |------|---------|---------|
/// | 0x01 | Init | none |
/// | 0x02 | Print | 4-byte print instruction |
/// | 0x04 | Data | tile data, optionally compressed |
/// | 0x08 | Break | none |
/// | 0x0F | Status | none (inquiry) |
///
/// Any other byte is kept as [`Command::Unknown`] so that it survives
/// re-encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Command {
    Init,
    Print,
    Data,
    Break,
    Status,
    Unknown(u8),
}

impl Command {
    /// Classify a raw command byte.
    ///
    /// ```
    /// use gbprinter::protocol::commands::Command;
    ///
    /// assert_eq!(Command::from_byte(0x04), Command::Data);
    /// assert_eq!(Command::from_byte(0x42), Command::Unknown(0x42));
    /// ```
    pub const fn from_byte(byte: u8) -> Self {
        match byte {
            0x01 => Command::Init,
            0x02 => Command::Print,
            0x04 => Command::Data,
            0x08 => Command::Break,
            0x0F => Command::Status,
            other => Command::Unknown(other),
        }
    }

    /// The wire byte for this command.
    pub const fn to_byte(self) -> u8 {
        match self {
            Command::Init => 0x01,
            Command::Print => 0x02,
            Command::Data => 0x04,
            Command::Break => 0x08,
            Command::Status => 0x0F,
            Command::Unknown(byte) => byte,
        }
    }

    /// Short mnemonic used in packet listings.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Command::Init => "INIT",
            Command::Print => "PRNT",
            Command::Data => "DATA",
            Command::Break => "BREK",
            Command::Status => "INQY",
            Command::Unknown(_) => "?",
        }
    }
}

impl From<u8> for Command {
    fn from(byte: u8) -> Self {
        Command::from_byte(byte)
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Command::Unknown(byte) => write!(f, "UNKNOWN(0x{:02X})", byte),
            other => f.write_str(other.mnemonic()),
        }
    }
}

/// Encode a 16-bit value as little-endian bytes.
///
/// ```
/// use gbprinter::protocol::commands::u16_le;
///
/// assert_eq!(u16_le(0x1234), [0x34, 0x12]);
/// assert_eq!(u16_le(640), [0x80, 0x02]);
/// ```
#[inline]
pub const fn u16_le(value: u16) -> [u8; 2] {
    [value as u8, (value >> 8) as u8]
}

// ============================================================================
// TESTS
// ============================================================================
