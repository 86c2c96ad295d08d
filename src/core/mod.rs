//! Core raster processing modules

pub mod geotransform;
pub mod tiling;
pub mod upscale;
pub mod enhance;
pub mod normalize;
pub mod batch;

// Re-export main types
pub use tiling::{tile, extract_tile, parse_tile_name, RasterSource, TileGrid};
pub use upscale::{Bicubic, Identity, Interpolation, NearestNeighbour, Upscale};
pub use enhance::{enhance, enhance_tile};
pub use normalize::normalize;
pub use batch::{enhance_directory, normalize_file, tile_to_directory, BatchSummary, FileFailure};
