//! # Rendering Module
//!
//! Turns decoded DATA payloads into a grayscale raster.
//!
//! ## Modules
//!
//! - [`tiles`]: 2bpp bit-plane decoding into 8×8 tiles
//! - [`palette`]: Retroactive palette harmonization of DATA packets
//! - [`raster`]: Tile grid assembly and PNG output
//!
//! ## Usage Example
//!
//! ```
//! use gbprinter::render::{raster, tiles};
//!
//! // One DATA payload: 20 blank tiles, one full grid row
//! let payload = vec![0u8; 16 * 20];
//! let tiles = tiles::decode_tiles(&payload);
//!
//! let image = raster::assemble(&tiles, 20, &raster::IntensityPalette::default())?;
//! assert_eq!((image.width, image.height), (160, 8));
//! # Ok::<(), gbprinter::GbpError>(())
//! ```

pub mod palette;
pub mod raster;
pub mod tiles;

pub use palette::PaletteHarmonizer;
pub use raster::{Image, IntensityPalette};
pub use tiles::Tile;
