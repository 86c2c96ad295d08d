use crate::types::{DataType, GeoError, GeoResult, Raster};

/// Rescale intensities of a whole raster into `[0, 1]`.
///
/// A single minimum and maximum is taken over every band and pixel, then each
/// sample maps to `(v - min) / (max - min)`. Non-finite samples and samples
/// equal to the profile's nodata value are left out of the statistics and come
/// out as NaN.
///
/// Fails with [`GeoError::DegenerateInput`] when the raster has no valid
/// sample or when every valid sample has the same value.
pub fn normalize(raster: &Raster) -> GeoResult<Raster> {
    let nodata = raster.profile().nodata;
    let is_valid = |v: f64| v.is_finite() && nodata.map_or(true, |nd| v != nd);

    let (min, max) = raster
        .data()
        .iter()
        .copied()
        .filter(|&v| is_valid(v))
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
        .ok_or_else(|| GeoError::DegenerateInput("raster has no valid samples".to_string()))?;

    if max == min {
        return Err(GeoError::DegenerateInput(format!(
            "constant raster (all samples = {})",
            min
        )));
    }

    log::debug!("Normalizing with global min {} and max {}", min, max);

    let range = max - min;
    let scaled = raster
        .data()
        .mapv(|v| if is_valid(v) { (v - min) / range } else { f64::NAN });

    let mut profile = raster.profile().clone();
    profile.data_type = match profile.data_type {
        DataType::Float64 => DataType::Float64,
        _ => DataType::Float32,
    };
    if profile.nodata.is_some() {
        profile.nodata = Some(f64::NAN);
    }

    Raster::new(scaled, profile)
}
