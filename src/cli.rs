use clap::{Parser, Subcommand, ValueEnum};
use geotile::core::Interpolation;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "geotile")]
#[command(about = "Tile, enhance and normalize georeferenced rasters")]
#[command(version)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Number of threads for batch work (default: all available)
    #[arg(short, long, global = true, value_name = "N")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Split a raster into fixed-size tiles named tile_{col}_{row}.tif
    Tile {
        /// Input GeoTIFF path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output directory for tiles
        #[arg(short, long, value_name = "DIR")]
        output: PathBuf,

        /// Tile edge length in pixels (default: 128)
        #[arg(short, long)]
        size: Option<usize>,
    },

    /// Upscale every tile in a directory
    Enhance {
        /// Directory of input tiles (default: data/intermediate/tiles)
        #[arg(short, long, value_name = "DIR")]
        input: Option<PathBuf>,

        /// Directory for enhanced tiles (default: data/intermediate/super_resolved)
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Integer upscale factor (default: 4)
        #[arg(short, long)]
        factor: Option<usize>,

        /// Interpolation kernel
        #[arg(short, long, value_enum, default_value_t = Method::Cubic)]
        method: Method,

        /// Process files one at a time
        #[arg(long)]
        sequential: bool,
    },

    /// Rescale raster intensities to [0, 1]
    Normalize {
        /// Input GeoTIFF path
        #[arg(short, long, value_name = "FILE")]
        input: PathBuf,

        /// Output GeoTIFF path
        #[arg(short, long, value_name = "FILE")]
        output: PathBuf,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Cubic,
    Nearest,
}

impl From<Method> for Interpolation {
    fn from(method: Method) -> Self {
        match method {
            Method::Cubic => Interpolation::Cubic,
            Method::Nearest => Interpolation::Nearest,
        }
    }
}
