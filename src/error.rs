//! # Error Types
//!
//! This module defines error types used throughout the gbprinter library.
//!
//! Framing and checksum problems are not errors: they are reported on the
//! packets themselves. Errors come only from caller-supplied configuration
//! and from the byte sources and image sinks around the decoder.

use thiserror::Error;

/// Main error type for gbprinter operations
#[derive(Debug, Error)]
pub enum GbpError {
    /// Intensity palette or pixel index out of range
    #[error("Invalid palette: {0}")]
    InvalidPalette(String),

    /// Unusable tile grid layout
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// Token in a hex dump that is not a byte
    #[error("Invalid hex byte '{token}' on line {line}")]
    HexDump { line: usize, token: String },

    /// Transport-level errors (serial device open, configure, read)
    #[error("Transport error: {0}")]
    Transport(String),

    /// Image encoding error
    #[error("Image error: {0}")]
    Image(String),

    /// I/O error wrapper
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
