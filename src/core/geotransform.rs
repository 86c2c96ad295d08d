//! Derivation of child geotransforms from a parent transform.
//!
//! Both operations work on the six coefficients directly. Nothing is re-derived
//! from bounding boxes, so repeated tiling and upscaling does not drift.

use crate::types::GeoTransform;

/// Move the origin to pixel (col_off, row_off) of the parent grid.
///
/// The per-pixel step and rotation terms are unchanged.
pub fn offset(parent: &GeoTransform, col_off: usize, row_off: usize) -> GeoTransform {
    let (c, f) = parent.apply(col_off as f64, row_off as f64);

    GeoTransform {
        c,
        f,
        ..*parent
    }
}

/// Scale the per-pixel step: `a` and `d` by `scale_x`, `b` and `e` by `scale_y`.
///
/// The origin stays fixed. Upscaling by an integer factor `k` uses `1/k` on both axes.
pub fn rescale(parent: &GeoTransform, scale_x: f64, scale_y: f64) -> GeoTransform {
    GeoTransform {
        a: parent.a * scale_x,
        b: parent.b * scale_y,
        d: parent.d * scale_x,
        e: parent.e * scale_y,
        ..*parent
    }
}

/// Transform for a raster whose pixels are `factor` times finer than the parent's
pub fn upscaled(parent: &GeoTransform, factor: usize) -> GeoTransform {
    let scale = 1.0 / factor as f64;
    rescale(parent, scale, scale)
}
