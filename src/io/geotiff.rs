use crate::core::tiling::RasterSource;
use crate::types::{DataType, GeoError, GeoResult, GeoTransform, Profile, Raster, RasterBuffer, Window};
use gdal::raster::{Buffer, GdalDataType, GdalType, RasterCreationOption};
use gdal::{Dataset, DriverManager, Metadata};
use ndarray::{s, Array2};
use num_traits::NumCast;
use std::path::Path;

/// GeoTIFF reader backed by an open GDAL dataset.
///
/// The dataset is closed when the reader is dropped.
pub struct GeoTiffReader {
    dataset: Dataset,
    profile: Profile,
}

impl GeoTiffReader {
    /// Open a raster and collect its profile
    pub fn open<P: AsRef<Path>>(path: P) -> GeoResult<Self> {
        let path = path.as_ref();
        log::debug!("Opening raster: {}", path.display());

        let dataset = Dataset::open(path)?;
        let (width, height) = dataset.raster_size();
        let band_count = dataset.raster_count() as usize;
        if band_count == 0 {
            return Err(GeoError::InvalidFormat(format!(
                "{} has no raster bands",
                path.display()
            )));
        }

        let (data_type, nodata) = {
            let band = dataset.rasterband(1)?;
            (band_data_type(&band)?, band.no_data_value())
        };

        let transform = match dataset.geo_transform() {
            Ok(gt) => GeoTransform::from_gdal(gt),
            Err(e) => {
                log::warn!("{} has no geotransform ({}), using pixel coordinates", path.display(), e);
                GeoTransform::default()
            }
        };

        let profile = Profile {
            width,
            height,
            band_count,
            data_type,
            transform,
            crs: dataset.projection(),
            nodata,
            compression: dataset.metadata_item("COMPRESSION", "IMAGE_STRUCTURE"),
        };

        log::debug!(
            "Raster {}: {}x{} x{} bands, {}, transform {:?}",
            path.display(), width, height, band_count, data_type, transform.to_gdal()
        );

        Ok(Self { dataset, profile })
    }

    /// Read every band at full extent
    pub fn read_all(&self) -> GeoResult<Raster> {
        let window = Window::new(0, 0, self.profile.width, self.profile.height);
        let data = self.read_window(window)?;
        Raster::new(data, self.profile.clone())
    }
}

impl RasterSource for GeoTiffReader {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn read_window(&self, window: Window) -> GeoResult<RasterBuffer> {
        let source_error = |reason: String| GeoError::SourceReadError {
            col_off: window.col_off,
            row_off: window.row_off,
            reason,
        };

        let mut data = RasterBuffer::zeros((self.profile.band_count, window.height, window.width));
        for b in 0..self.profile.band_count {
            let band = self
                .dataset
                .rasterband((b + 1) as isize)
                .map_err(|e| source_error(e.to_string()))?;

            let buffer = band
                .read_as::<f64>(
                    (window.col_off as isize, window.row_off as isize),
                    (window.width, window.height),
                    (window.width, window.height),
                    None,
                )
                .map_err(|e| source_error(format!("band {}: {}", b + 1, e)))?;

            let samples = Array2::from_shape_vec((window.height, window.width), buffer.data)
                .map_err(|e| source_error(format!("band {}: {}", b + 1, e)))?;

            data.slice_mut(s![b, .., ..]).assign(&samples);
        }

        Ok(data)
    }
}

/// Read a whole raster file into memory
pub fn read_raster<P: AsRef<Path>>(path: P) -> GeoResult<Raster> {
    GeoTiffReader::open(path)?.read_all()
}

/// Write a raster as GeoTIFF using the data type, CRS, nodata and compression of its profile
pub fn write_raster<P: AsRef<Path>>(raster: &Raster, path: P) -> GeoResult<()> {
    match raster.profile().data_type {
        DataType::UInt8 => write_typed::<u8>(raster, path.as_ref()),
        DataType::UInt16 => write_typed::<u16>(raster, path.as_ref()),
        DataType::Int16 => write_typed::<i16>(raster, path.as_ref()),
        DataType::UInt32 => write_typed::<u32>(raster, path.as_ref()),
        DataType::Int32 => write_typed::<i32>(raster, path.as_ref()),
        DataType::Float32 => write_typed::<f32>(raster, path.as_ref()),
        DataType::Float64 => write_typed::<f64>(raster, path.as_ref()),
    }
}

fn write_typed<T: GdalType + NumCast + Copy>(raster: &Raster, path: &Path) -> GeoResult<()> {
    let profile = raster.profile();
    log::debug!(
        "Writing {}x{} x{} {} raster: {}",
        profile.width, profile.height, profile.band_count, profile.data_type, path.display()
    );

    let driver = DriverManager::get_driver_by_name("GTiff")?;
    let options: Vec<RasterCreationOption> = profile
        .compression
        .as_deref()
        .map(|value| vec![RasterCreationOption { key: "COMPRESS", value }])
        .unwrap_or_default();

    let mut dataset = driver.create_with_band_type_with_options::<T, _>(
        path,
        profile.width as isize,
        profile.height as isize,
        profile.band_count as isize,
        &options,
    )?;

    dataset.set_geo_transform(&profile.transform.to_gdal())?;
    if !profile.crs.is_empty() {
        dataset.set_projection(&profile.crs)?;
    }

    let range = profile.data_type.integer_range();
    // Integer outputs cannot hold NaN; fall back to nodata, then zero
    let fill = profile.nodata.filter(|nd| nd.is_finite()).unwrap_or(0.0);

    for b in 0..profile.band_count {
        let samples = raster
            .band(b)
            .iter()
            .map(|&v| to_sample::<T>(v, range, fill))
            .collect::<GeoResult<Vec<T>>>()?;

        let mut rasterband = dataset.rasterband((b + 1) as isize)?;
        let buffer = Buffer::new((profile.width, profile.height), samples);
        rasterband.write((0, 0), (profile.width, profile.height), &buffer)?;

        if let Some(nodata) = profile.nodata {
            rasterband.set_no_data_value(Some(nodata))?;
        }
    }

    Ok(())
}

/// Convert an in-memory sample to the on-disk type, rounding and clamping integers
fn to_sample<T: NumCast>(value: f64, range: Option<(f64, f64)>, fill: f64) -> GeoResult<T> {
    let value = match range {
        Some((lo, hi)) if value.is_nan() => fill.clamp(lo, hi),
        Some((lo, hi)) => value.round().clamp(lo, hi),
        None => value,
    };

    T::from(value).ok_or_else(|| GeoError::InvalidFormat(format!("sample {} out of range", value)))
}

fn band_data_type(band: &gdal::raster::RasterBand) -> GeoResult<DataType> {
    match band.band_type() {
        GdalDataType::UInt8 => Ok(DataType::UInt8),
        GdalDataType::UInt16 => Ok(DataType::UInt16),
        GdalDataType::Int16 => Ok(DataType::Int16),
        GdalDataType::UInt32 => Ok(DataType::UInt32),
        GdalDataType::Int32 => Ok(DataType::Int32),
        GdalDataType::Float32 => Ok(DataType::Float32),
        GdalDataType::Float64 => Ok(DataType::Float64),
        other => Err(GeoError::InvalidFormat(format!(
            "Unsupported GDAL pixel type {:?}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integer_samples_rounded_and_clamped() {
        let range = DataType::UInt8.integer_range();

        assert_eq!(to_sample::<u8>(12.6, range, 0.0).unwrap(), 13);
        assert_eq!(to_sample::<u8>(-4.0, range, 0.0).unwrap(), 0);
        assert_eq!(to_sample::<u8>(300.0, range, 0.0).unwrap(), 255);
        assert_eq!(to_sample::<u8>(f64::NAN, range, 7.0).unwrap(), 7);
    }

    #[test]
    fn test_float_samples_pass_through() {
        let value = to_sample::<f32>(f64::NAN, None, 0.0).unwrap();
        assert!(value.is_nan());
        assert_eq!(to_sample::<f64>(0.25, None, 0.0).unwrap(), 0.25);
    }
}
