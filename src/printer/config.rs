//! # Printer Configuration
//!
//! This module defines the hardware constants of the Game Boy Printer that
//! the decoder and the command-line tool default to.
//!
//! ## Supported Printers
//!
//! | Model | Width (px) | Tiles per line | Tones |
//! |-------|------------|----------------|-------|
//! | Game Boy Printer (MGB-007) | 160 | 20 | 4 |
//!
//! ## Usage
//!
//! ```
//! use gbprinter::printer::PrinterConfig;
//!
//! let config = PrinterConfig::GAMEBOY_PRINTER;
//! println!("Print width: {} px ({} tiles)",
//!          config.width_px(),
//!          config.tiles_per_line);
//! ```

use crate::render::raster::IntensityPalette;

/// # Printer Configuration
///
/// ## Physical Properties
///
/// - **tile_width / tile_height**: Size of one tile in pixels
/// - **tiles_per_line**: Tiles across the paper
/// - **tile_bytes**: Encoded size of one tile (2 bits per pixel)
///
/// ## Calculations
///
/// ```text
/// width_px = tiles_per_line * tile_width = 20 * 8 = 160
/// ```
#[derive(Debug, Clone, Copy)]
pub struct PrinterConfig {
    /// Printer model name
    pub name: &'static str,

    pub tile_width: u16,
    pub tile_height: u16,
    pub tiles_per_line: u16,
    pub tile_bytes: u16,

    /// Gray levels used when rendering pixel indices 0..=3
    pub palette: IntensityPalette,
}

impl PrinterConfig {
    /// # Game Boy Printer
    ///
    /// Thermal printer accessory using 38mm paper.
    ///
    /// ## Specifications
    ///
    /// | Property | Value |
    /// |----------|-------|
    /// | Print width | 160 px |
    /// | Tones | 4 (2bpp) |
    /// | Buffer | 8 KiB (18 tile rows) |
    /// | Link | Serial, 8 kHz clock |
    pub const GAMEBOY_PRINTER: Self = Self {
        name: "Game Boy Printer",
        tile_width: 8,
        tile_height: 8,
        tiles_per_line: 20,
        tile_bytes: 16,
        palette: IntensityPalette([255, 85, 170, 0]),
    };

    /// Print width in pixels
    #[inline]
    pub fn width_px(&self) -> usize {
        self.tiles_per_line as usize * self.tile_width as usize
    }
}

impl Default for PrinterConfig {
    fn default() -> Self {
        Self::GAMEBOY_PRINTER
    }
}

// ============================================================================
// TESTS
// ============================================================================
