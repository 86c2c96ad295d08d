use ndarray::{s, Array2, Array3, ArrayView2, ArrayView3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Sample value held in memory, whatever the on-disk pixel type
pub type Sample = f64;

/// One 2D band (row x col)
pub type Band = Array2<Sample>;

/// Borrowed band view
pub type BandView<'a> = ArrayView2<'a, Sample>;

/// Multi-band pixel buffer (band x row x col)
pub type RasterBuffer = Array3<Sample>;

/// Affine transform from pixel (col, row) to world (x, y):
///
/// ```text
/// x = a * col + b * row + c
/// y = d * col + e * row + f
/// ```
///
/// Derived rasters always get a new value; a transform is never edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
    pub e: f64,
    pub f: f64,
}

impl GeoTransform {
    pub fn new(a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) -> Self {
        Self { a, b, c, d, e, f }
    }

    /// North-up transform with the given origin and pixel size
    pub fn north_up(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self::new(pixel_width, 0.0, origin_x, 0.0, -pixel_height.abs(), origin_y)
    }

    /// Build from GDAL coefficient order `[c, a, b, f, d, e]`
    pub fn from_gdal(gt: [f64; 6]) -> Self {
        Self::new(gt[1], gt[2], gt[0], gt[4], gt[5], gt[3])
    }

    /// GDAL coefficient order `[c, a, b, f, d, e]`
    pub fn to_gdal(&self) -> [f64; 6] {
        [self.c, self.a, self.b, self.f, self.d, self.e]
    }

    /// World coordinate of the pixel corner at (col, row)
    pub fn apply(&self, col: f64, row: f64) -> (f64, f64) {
        (
            self.a * col + self.b * row + self.c,
            self.d * col + self.e * row + self.f,
        )
    }

    /// Per-pixel step along x and y (ignores rotation terms)
    pub fn pixel_size(&self) -> (f64, f64) {
        (self.a, self.e)
    }

    /// Bounding box (min_x, min_y, max_x, max_y) of a width x height grid
    pub fn bounds(&self, width: usize, height: usize) -> (f64, f64, f64, f64) {
        let (w, h) = (width as f64, height as f64);
        let corners = [
            self.apply(0.0, 0.0),
            self.apply(w, 0.0),
            self.apply(0.0, h),
            self.apply(w, h),
        ];

        corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(min_x, min_y, max_x, max_y), &(x, y)| {
                (min_x.min(x), min_y.min(y), max_x.max(x), max_y.max(y))
            },
        )
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0, 1.0, 0.0)
    }
}

/// On-disk pixel data type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    UInt8,
    UInt16,
    Int16,
    UInt32,
    Int32,
    Float32,
    Float64,
}

impl DataType {
    /// Representable range for integer types, `None` for floats
    pub fn integer_range(&self) -> Option<(f64, f64)> {
        match self {
            DataType::UInt8 => Some((u8::MIN as f64, u8::MAX as f64)),
            DataType::UInt16 => Some((u16::MIN as f64, u16::MAX as f64)),
            DataType::Int16 => Some((i16::MIN as f64, i16::MAX as f64)),
            DataType::UInt32 => Some((u32::MIN as f64, u32::MAX as f64)),
            DataType::Int32 => Some((i32::MIN as f64, i32::MAX as f64)),
            DataType::Float32 | DataType::Float64 => None,
        }
    }
}

impl std::fmt::Display for DataType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::Int16 => "int16",
            DataType::UInt32 => "uint32",
            DataType::Int32 => "int32",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        };
        write!(f, "{}", name)
    }
}

/// Raster metadata carried from a parent to every derived raster
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub width: usize,
    pub height: usize,
    pub band_count: usize,
    pub data_type: DataType,
    pub transform: GeoTransform,
    /// Coordinate reference system as WKT (empty when unknown)
    pub crs: String,
    pub nodata: Option<f64>,
    pub compression: Option<String>,
}

impl Profile {
    /// Copy of this profile with only size and transform overridden
    pub fn derive(&self, width: usize, height: usize, transform: GeoTransform) -> Self {
        Self {
            width,
            height,
            transform,
            ..self.clone()
        }
    }
}

/// Pixel window in parent raster coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Window {
    pub col_off: usize,
    pub row_off: usize,
    pub width: usize,
    pub height: usize,
}

impl Window {
    pub fn new(col_off: usize, row_off: usize, width: usize, height: usize) -> Self {
        Self { col_off, row_off, width, height }
    }
}

/// Pixel buffer together with its profile
#[derive(Debug, Clone, PartialEq)]
pub struct Raster {
    data: RasterBuffer,
    profile: Profile,
}

impl Raster {
    /// Pair a buffer with a profile; the profile must describe the buffer's shape
    pub fn new(data: RasterBuffer, profile: Profile) -> GeoResult<Self> {
        let (bands, height, width) = data.dim();
        if bands != profile.band_count || height != profile.height || width != profile.width {
            return Err(GeoError::InvalidFormat(format!(
                "buffer shape {}x{}x{} does not match profile {}x{}x{}",
                bands, height, width, profile.band_count, profile.height, profile.width
            )));
        }
        Ok(Self { data, profile })
    }

    /// Float64 raster with an empty CRS, mostly useful for in-memory work
    pub fn from_buffer(data: RasterBuffer, transform: GeoTransform) -> Self {
        let (band_count, height, width) = data.dim();
        let profile = Profile {
            width,
            height,
            band_count,
            data_type: DataType::Float64,
            transform,
            crs: String::new(),
            nodata: None,
            compression: None,
        };
        Self { data, profile }
    }

    pub fn data(&self) -> ArrayView3<'_, Sample> {
        self.data.view()
    }

    pub fn band(&self, index: usize) -> BandView<'_> {
        self.data.slice(s![index, .., ..])
    }

    pub fn profile(&self) -> &Profile {
        &self.profile
    }

    pub fn transform(&self) -> GeoTransform {
        self.profile.transform
    }

    pub fn width(&self) -> usize {
        self.profile.width
    }

    pub fn height(&self) -> usize {
        self.profile.height
    }

    pub fn band_count(&self) -> usize {
        self.profile.band_count
    }
}

/// Fixed-size sub-window of a parent raster with its own derived profile
#[derive(Debug, Clone, PartialEq)]
pub struct Tile {
    pub raster: Raster,
    pub col_off: usize,
    pub row_off: usize,
    pub tile_size: usize,
}

impl Tile {
    /// Stable name derived from the tile's origin in the parent grid
    pub fn name(&self) -> String {
        tile_name(self.col_off, self.row_off)
    }

    pub fn file_name(&self) -> String {
        format!("{}.tif", self.name())
    }
}

pub fn tile_name(col_off: usize, row_off: usize) -> String {
    format!("tile_{}_{}", col_off, row_off)
}

/// Pipeline settings passed explicitly through every call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Tile edge length in pixels
    pub tile_size: usize,
    /// Integer upscale factor applied to both axes
    pub upscale_factor: usize,
    /// Directory holding tiles to enhance
    pub tiles_dir: PathBuf,
    /// Directory receiving enhanced tiles
    pub output_dir: PathBuf,
    /// Recognized raster file extensions, compared case-insensitively
    pub extensions: Vec<String>,
    /// Process batch files on the rayon pool
    pub parallel: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tile_size: 128,
            upscale_factor: 4, // 10m -> 2.5m
            tiles_dir: PathBuf::from("data/intermediate/tiles"),
            output_dir: PathBuf::from("data/intermediate/super_resolved"),
            extensions: vec!["tif".to_string(), "tiff".to_string()],
            parallel: true,
        }
    }
}

/// Error types for raster pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum GeoError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Failed to read source window at col {col_off}, row {row_off}: {reason}")]
    SourceReadError {
        col_off: usize,
        row_off: usize,
        reason: String,
    },

    #[error("Upscaler returned {actual:?} but {expected:?} was expected")]
    ShapeMismatch {
        expected: (usize, usize),
        actual: (usize, usize),
    },

    #[error("Degenerate input: {0}")]
    DegenerateInput(String),

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("GDAL error: {0}")]
    Gdal(#[from] gdal::errors::GdalError),
}

/// Result type for raster pipeline operations
pub type GeoResult<T> = Result<T, GeoError>;
