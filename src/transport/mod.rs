//! # Capture Transport Layer
//!
//! This module provides byte sources for live captures.
//!
//! ## Available Transports
//!
//! - [`serial`]: USB serial link to a printer emulator (Unix)
//!
//! Stored captures are plain hex dumps; see [`crate::hexdump`].

pub mod serial;

pub use serial::SerialSource;
