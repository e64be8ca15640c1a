//! # 2bpp Tiles
//!
//! Image data is a sequence of 8×8 tiles, 16 bytes each. Every pixel row
//! of a tile is a pair of bit-planes: the first byte holds the low bit of
//! each pixel, the second byte the high bit. Bit 7 is the leftmost pixel.
//!
//! ```text
//! low  = 0b0011_1100
//! high = 0b0111_1110
//!
//!        x: 0 1 2 3 4 5 6 7
//!   pixel:  0 2 3 3 3 3 2 0
//! ```

use crate::error::GbpError;

/// Pixels per tile side.
pub const TILE_DIM: usize = 8;

/// Pixel indices per tile.
pub const TILE_PIXELS: usize = TILE_DIM * TILE_DIM;

/// Encoded size of one tile.
pub const TILE_BYTES: usize = 16;

/// Decode one bit-plane pair into 8 pixel indices, leftmost first.
///
/// ```
/// use gbprinter::render::tiles::decode_2bpp;
///
/// assert_eq!(decode_2bpp(0xFF, 0x00), [2; 8]);
/// assert_eq!(decode_2bpp(0x00, 0xFF), [1; 8]);
/// ```
#[inline]
pub const fn decode_2bpp(high: u8, low: u8) -> [u8; 8] {
    let mut row = [0u8; 8];
    let mut i = 0;
    while i < 8 {
        let shift = 7 - i;
        row[i] = (((high >> shift) & 1) << 1) | ((low >> shift) & 1);
        i += 1;
    }
    row
}

/// Pack 8 pixel indices into a `[low, high]` bit-plane pair.
///
/// Only the two low bits of each index are used.
#[inline]
pub const fn encode_2bpp(row: &[u8; 8]) -> [u8; 2] {
    let mut low = 0u8;
    let mut high = 0u8;
    let mut i = 0;
    while i < 8 {
        let shift = 7 - i;
        low |= (row[i] & 1) << shift;
        high |= ((row[i] >> 1) & 1) << shift;
        i += 1;
    }
    [low, high]
}

/// # Tile
///
/// 64 pixel indices (0..=3), row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tile([u8; TILE_PIXELS]);

impl Tile {
    /// Decode a tile from its 16 encoded bytes.
    pub fn from_bytes(bytes: &[u8; TILE_BYTES]) -> Self {
        let mut pixels = [0u8; TILE_PIXELS];
        for (row, pair) in bytes.chunks_exact(2).enumerate() {
            let decoded = decode_2bpp(pair[1], pair[0]);
            pixels[row * TILE_DIM..(row + 1) * TILE_DIM].copy_from_slice(&decoded);
        }
        Tile(pixels)
    }

    /// Build a tile from pixel indices, rejecting values above 3.
    pub fn from_indices(pixels: [u8; TILE_PIXELS]) -> Result<Self, GbpError> {
        if let Some(pos) = pixels.iter().position(|&p| p > 3) {
            return Err(GbpError::InvalidPalette(format!(
                "pixel index {} at position {} is outside 0..=3",
                pixels[pos], pos
            )));
        }
        Ok(Tile(pixels))
    }

    /// Pixel index at column `x`, row `y`.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> u8 {
        self.0[y * TILE_DIM + x]
    }

    /// Row-major pixel indices.
    pub fn pixels(&self) -> &[u8; TILE_PIXELS] {
        &self.0
    }

    /// Encode back into the 16-byte wire form.
    pub fn to_bytes(&self) -> [u8; TILE_BYTES] {
        let mut bytes = [0u8; TILE_BYTES];
        for (row, pixels) in self.0.chunks_exact(TILE_DIM).enumerate() {
            let mut line = [0u8; 8];
            line.copy_from_slice(pixels);
            bytes[row * 2..row * 2 + 2].copy_from_slice(&encode_2bpp(&line));
        }
        bytes
    }
}

/// Split a data payload into tiles.
///
/// Bytes past the last whole tile are ignored.
pub fn decode_tiles(data: &[u8]) -> Vec<Tile> {
    data.chunks_exact(TILE_BYTES)
        .map(|chunk| {
            let mut bytes = [0u8; TILE_BYTES];
            bytes.copy_from_slice(chunk);
            Tile::from_bytes(&bytes)
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_2bpp_uniform_rows() {
        assert_eq!(decode_2bpp(0x00, 0x00), [0; 8]);
        assert_eq!(decode_2bpp(0xFF, 0xFF), [3; 8]);
        assert_eq!(decode_2bpp(0xFF, 0x00), [2; 8]);
        assert_eq!(decode_2bpp(0x00, 0xFF), [1; 8]);
    }

    #[test]
    fn test_decode_2bpp_msb_first() {
        assert_eq!(decode_2bpp(0x7E, 0x3C), [0, 2, 3, 3, 3, 3, 2, 0]);
        assert_eq!(decode_2bpp(0x80, 0x01), [2, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_encode_2bpp_inverts_decode() {
        let row = [0, 1, 2, 3, 3, 2, 1, 0];
        let [low, high] = encode_2bpp(&row);
        assert_eq!(decode_2bpp(high, low), row);
    }

    #[test]
    fn test_tile_zero_bytes() {
        let tile = Tile::from_bytes(&[0; TILE_BYTES]);
        assert_eq!(tile.pixels(), &[0; TILE_PIXELS]);
    }

    #[test]
    fn test_tile_row_layout() {
        // Row 0 all 1s (low plane), row 7 all 2s (high plane)
        let mut bytes = [0u8; TILE_BYTES];
        bytes[0] = 0xFF;
        bytes[15] = 0xFF;
        let tile = Tile::from_bytes(&bytes);

        for x in 0..TILE_DIM {
            assert_eq!(tile.pixel(x, 0), 1);
            assert_eq!(tile.pixel(x, 7), 2);
            assert_eq!(tile.pixel(x, 3), 0);
        }
        assert_eq!(tile.to_bytes(), bytes);
    }

    #[test]
    fn test_from_indices_rejects_out_of_range() {
        let mut pixels = [0u8; TILE_PIXELS];
        assert!(Tile::from_indices(pixels).is_ok());

        pixels[10] = 4;
        assert!(matches!(Tile::from_indices(pixels), Err(GbpError::InvalidPalette(_))));
    }

    #[test]
    fn test_decode_tiles_drops_partial_tail() {
        let mut data = vec![0xFF; TILE_BYTES * 2];
        data.extend([0x00; 5]);

        let tiles = decode_tiles(&data);
        assert_eq!(tiles.len(), 2);
        assert!(tiles.iter().all(|t| t.pixels().iter().all(|&p| p == 3)));
    }
}
