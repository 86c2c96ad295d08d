//! geotile: tiling, resolution enhancement and normalization for georeferenced rasters
//!
//! Large multi-band scenes are cut into fixed-size tiles, each tile is upscaled
//! band by band through a pluggable upscaler, and intensities can be stretched
//! to the unit interval. Every derived raster carries a geotransform that
//! matches its physical extent.

pub mod types;
pub mod io;
pub mod core;

#[cfg(feature = "python")]
mod python;

// Re-export main types and functions for easier access
pub use types::{
    Band, DataType, GeoError, GeoResult, GeoTransform, PipelineConfig, Profile, Raster,
    RasterBuffer, Tile, Window,
};

pub use io::{read_raster, write_raster, GeoTiffReader};
