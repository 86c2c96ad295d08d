//! Raster file I/O

pub mod geotiff;

pub use geotiff::{read_raster, write_raster, GeoTiffReader};
