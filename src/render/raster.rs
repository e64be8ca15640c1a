//! # Raster Assembly
//!
//! Lays decoded tiles out into a grayscale pixel buffer. Tiles fill the
//! grid left to right, top to bottom, `tiles_per_line` tiles per grid row
//! (20 on the Game Boy Printer, i.e. 160 pixels):
//!
//! ```text
//! ┌────┬────┬────┬─────┬────┐
//! │ 0  │ 1  │ 2  │ ... │ 19 │  grid row 0 (pixel rows 0-7)
//! ├────┼────┼────┼─────┼────┤
//! │ 20 │ 21 │ 22 │ ... │ 39 │  grid row 1 (pixel rows 8-15)
//! └────┴────┴────┴─────┴────┘
//! ```
//!
//! Cells of a partial last grid row are filled with the palette's first
//! intensity.

use std::path::Path;
use std::str::FromStr;

use ::image::{GrayImage, imageops};

use super::tiles::{TILE_DIM, Tile};
use crate::error::GbpError;

/// Default tile grid width of the printer.
pub const DEFAULT_TILES_PER_LINE: usize = 20;

/// # Intensity Palette
///
/// Maps the four pixel indices to 8-bit gray levels. The default maps
/// index 0 to white and 3 to black, with 1 and 2 as dark and light gray.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntensityPalette(pub [u8; 4]);

impl IntensityPalette {
    /// Gray level for a pixel index.
    ///
    /// # Panics
    ///
    /// If `index` is above 3. Indices taken from a [`Tile`] never are.
    #[inline]
    pub fn intensity(&self, index: u8) -> u8 {
        assert!(index < 4, "pixel index {} outside 0..=3", index);
        self.0[index as usize]
    }
}

impl Default for IntensityPalette {
    fn default() -> Self {
        IntensityPalette([255, 85, 170, 0])
    }
}

impl TryFrom<&[u8]> for IntensityPalette {
    type Error = GbpError;

    fn try_from(values: &[u8]) -> Result<Self, Self::Error> {
        let entries: [u8; 4] = values.try_into().map_err(|_| {
            GbpError::InvalidPalette(format!(
                "intensity palette needs exactly 4 entries, got {}",
                values.len()
            ))
        })?;
        Ok(IntensityPalette(entries))
    }
}

impl FromStr for IntensityPalette {
    type Err = GbpError;

    /// Parse a comma separated list, e.g. `"255,85,170,0"`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(',')
            .map(|part| {
                part.trim().parse::<u8>().map_err(|e| {
                    GbpError::InvalidPalette(format!("bad intensity '{}': {}", part.trim(), e))
                })
            })
            .collect::<Result<Vec<u8>, _>>()?;
        IntensityPalette::try_from(values.as_slice())
    }
}

/// 8-bit grayscale image, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub pixels: Vec<u8>,
    pub width: usize,
    pub height: usize,
}

impl Image {
    /// True when no tile rows were assembled.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// One row of pixels.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.pixels[y * self.width..(y + 1) * self.width]
    }

    /// Convert into an `image` buffer, upscaled by `scale` (nearest neighbour).
    pub fn to_gray_image(&self, scale: u32) -> Result<GrayImage, GbpError> {
        let img = GrayImage::from_raw(self.width as u32, self.height as u32, self.pixels.clone())
            .ok_or_else(|| {
                GbpError::Image(format!(
                    "buffer of {} bytes does not fit {}x{}",
                    self.pixels.len(),
                    self.width,
                    self.height
                ))
            })?;

        if scale <= 1 {
            return Ok(img);
        }
        Ok(imageops::resize(
            &img,
            img.width() * scale,
            img.height() * scale,
            imageops::FilterType::Nearest,
        ))
    }

    /// Save as PNG.
    pub fn save_png<P: AsRef<Path>>(&self, path: P, scale: u32) -> Result<(), GbpError> {
        let path = path.as_ref();
        self.to_gray_image(scale)?
            .save(path)
            .map_err(|e| GbpError::Image(format!("Failed to save {}: {}", path.display(), e)))
    }
}

/// Assemble tiles into an image.
///
/// `width = tiles_per_line * 8`, `height = ceil(tiles / tiles_per_line) * 8`.
///
/// ## Example
///
/// ```
/// use gbprinter::render::raster::{IntensityPalette, assemble};
/// use gbprinter::render::tiles::Tile;
///
/// let tiles = vec![Tile::from_bytes(&[0; 16]); 20];
/// let image = assemble(&tiles, 20, &IntensityPalette::default())?;
///
/// assert_eq!((image.width, image.height), (160, 8));
/// assert!(image.pixels.iter().all(|&p| p == 255));
/// # Ok::<(), gbprinter::GbpError>(())
/// ```
pub fn assemble(
    tiles: &[Tile],
    tiles_per_line: usize,
    palette: &IntensityPalette,
) -> Result<Image, GbpError> {
    if tiles_per_line == 0 {
        return Err(GbpError::InvalidLayout(
            "tiles_per_line must be at least 1".to_string(),
        ));
    }

    let width = tiles_per_line * TILE_DIM;
    let grid_rows = tiles.len().div_ceil(tiles_per_line);
    let height = grid_rows * TILE_DIM;
    let mut pixels = vec![palette.intensity(0); width * height];

    for (i, tile) in tiles.iter().enumerate() {
        let row = i / tiles_per_line;
        let col = i % tiles_per_line;
        let origin = row * TILE_DIM * width + col * TILE_DIM;

        for y in 0..TILE_DIM {
            let line = origin + y * width;
            for x in 0..TILE_DIM {
                pixels[line + x] = palette.intensity(tile.pixel(x, y));
            }
        }
    }

    Ok(Image {
        pixels,
        width,
        height,
    })
}

// ============================================================================
// TESTS
// ============================================================================
