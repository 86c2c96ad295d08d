use crate::types::{Band, BandView, GeoResult};
use ndarray::Array2;

/// Single-band upscaling capability.
///
/// Given a band of shape (h, w) and an integer factor `k`, an implementation
/// must return a band of shape (h * k, w * k). Interpolation kernels and
/// learned models plug in behind the same call.
pub trait Upscale {
    fn upscale(&self, band: BandView<'_>, factor: usize) -> GeoResult<Band>;

    /// Short label used in log output
    fn name(&self) -> &str {
        "custom"
    }
}

impl<F> Upscale for F
where
    F: Fn(BandView<'_>, usize) -> GeoResult<Band>,
{
    fn upscale(&self, band: BandView<'_>, factor: usize) -> GeoResult<Band> {
        self(band, factor)
    }
}

/// Returns the band unchanged; only shape-valid at factor 1
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Upscale for Identity {
    fn upscale(&self, band: BandView<'_>, _factor: usize) -> GeoResult<Band> {
        Ok(band.to_owned())
    }

    fn name(&self) -> &str {
        "identity"
    }
}

/// Pixel replication
#[derive(Debug, Clone, Copy, Default)]
pub struct NearestNeighbour;

impl Upscale for NearestNeighbour {
    fn upscale(&self, band: BandView<'_>, factor: usize) -> GeoResult<Band> {
        let (height, width) = band.dim();
        Ok(Array2::from_shape_fn((height * factor, width * factor), |(r, c)| {
            band[[r / factor, c / factor]]
        }))
    }

    fn name(&self) -> &str {
        "nearest"
    }
}

/// Separable cubic convolution with half-pixel centred sampling and
/// replicated borders.
#[derive(Debug, Clone, Copy)]
pub struct Bicubic {
    /// Kernel sharpness parameter
    pub a: f64,
}

impl Default for Bicubic {
    fn default() -> Self {
        Self { a: -0.75 }
    }
}

impl Bicubic {
    fn weight(&self, t: f64) -> f64 {
        let a = self.a;
        let t = t.abs();
        if t <= 1.0 {
            ((a + 2.0) * t - (a + 3.0)) * t * t + 1.0
        } else if t < 2.0 {
            ((a * t - 5.0 * a) * t + 8.0 * a) * t - 4.0 * a
        } else {
            0.0
        }
    }

    /// Source taps and weights for every output coordinate along one axis
    fn taps(&self, src_len: usize, factor: usize) -> Vec<([usize; 4], [f64; 4])> {
        let last = src_len as isize - 1;
        (0..src_len * factor)
            .map(|dst| {
                let src = (dst as f64 + 0.5) / factor as f64 - 0.5;
                let base = src.floor();
                let frac = src - base;
                let base = base as isize;

                let mut idx = [0usize; 4];
                let mut w = [0.0f64; 4];
                for k in 0..4 {
                    idx[k] = (base + k as isize - 1).clamp(0, last) as usize;
                    w[k] = self.weight(frac - (k as f64 - 1.0));
                }
                (idx, w)
            })
            .collect()
    }
}

impl Upscale for Bicubic {
    fn upscale(&self, band: BandView<'_>, factor: usize) -> GeoResult<Band> {
        let (height, width) = band.dim();
        if height == 0 || width == 0 {
            return Ok(Array2::zeros((height * factor, width * factor)));
        }

        let col_taps = self.taps(width, factor);
        let row_taps = self.taps(height, factor);

        // Horizontal pass
        let mut horizontal = Array2::<f64>::zeros((height, width * factor));
        for r in 0..height {
            for (c, (idx, w)) in col_taps.iter().enumerate() {
                horizontal[[r, c]] = (0..4).map(|k| band[[r, idx[k]]] * w[k]).sum();
            }
        }

        // Vertical pass
        let mut output = Array2::<f64>::zeros((height * factor, width * factor));
        for (r, (idx, w)) in row_taps.iter().enumerate() {
            for c in 0..width * factor {
                output[[r, c]] = (0..4).map(|k| horizontal[[idx[k], c]] * w[k]).sum();
            }
        }

        Ok(output)
    }

    fn name(&self) -> &str {
        "cubic"
    }
}

/// Built-in interpolation kernels selectable by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Cubic,
    Nearest,
}

impl Upscale for Interpolation {
    fn upscale(&self, band: BandView<'_>, factor: usize) -> GeoResult<Band> {
        match self {
            Interpolation::Cubic => Bicubic::default().upscale(band, factor),
            Interpolation::Nearest => NearestNeighbour.upscale(band, factor),
        }
    }

    fn name(&self) -> &str {
        match self {
            Interpolation::Cubic => "cubic",
            Interpolation::Nearest => "nearest",
        }
    }
}
