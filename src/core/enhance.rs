use crate::core::geotransform;
use crate::core::upscale::Upscale;
use crate::types::{GeoError, GeoResult, Raster, RasterBuffer, Tile};
use ndarray::s;

/// Upscale every band of a raster by `factor` and rescale its geotransform.
///
/// Bands go through the upscaler one at a time and are restacked in their
/// original order. The returned profile has width and height multiplied by
/// `factor`; every other field is copied from the input.
pub fn enhance<U: Upscale + ?Sized>(raster: &Raster, factor: usize, upscaler: &U) -> GeoResult<Raster> {
    if factor == 0 {
        return Err(GeoError::InvalidConfiguration(
            "Upscale factor must be a positive integer".to_string(),
        ));
    }

    let (bands, height, width) = raster.data().dim();
    let expected = match (height.checked_mul(factor), width.checked_mul(factor)) {
        (Some(rows), Some(cols)) => (rows, cols),
        _ => {
            return Err(GeoError::InvalidConfiguration(format!(
                "Upscale factor {} overflows a {}x{} raster",
                factor, width, height
            )))
        }
    };

    log::debug!(
        "Enhancing {}x{} raster ({} bands) by x{} with {} upscaler",
        width, height, bands, factor, upscaler.name()
    );

    let mut enhanced = RasterBuffer::zeros((bands, expected.0, expected.1));
    for b in 0..bands {
        let upscaled = upscaler.upscale(raster.band(b), factor)?;
        if upscaled.dim() != expected {
            return Err(GeoError::ShapeMismatch {
                expected,
                actual: upscaled.dim(),
            });
        }
        enhanced.slice_mut(s![b, .., ..]).assign(&upscaled);
    }

    let transform = geotransform::upscaled(&raster.transform(), factor);
    let profile = raster.profile().derive(expected.1, expected.0, transform);

    Raster::new(enhanced, profile)
}

/// Enhance a tile. Offsets stay in the source grid so the tile keeps its name.
pub fn enhance_tile<U: Upscale + ?Sized>(tile: &Tile, factor: usize, upscaler: &U) -> GeoResult<Tile> {
    Ok(Tile {
        raster: enhance(&tile.raster, factor, upscaler)?,
        col_off: tile.col_off,
        row_off: tile.row_off,
        tile_size: tile.tile_size * factor,
    })
}
