use crate::core::geotransform;
use crate::types::{GeoError, GeoResult, Profile, Raster, RasterBuffer, Tile, Window};
use ndarray::s;

/// Anything that can hand out pixel windows of a raster
pub trait RasterSource {
    fn profile(&self) -> &Profile;

    /// Read all bands inside `window`, returned as (band x row x col)
    fn read_window(&self, window: Window) -> GeoResult<RasterBuffer>;
}

impl RasterSource for Raster {
    fn profile(&self) -> &Profile {
        Raster::profile(self)
    }

    fn read_window(&self, window: Window) -> GeoResult<RasterBuffer> {
        if window.col_off + window.width > self.width() || window.row_off + window.height > self.height() {
            return Err(GeoError::SourceReadError {
                col_off: window.col_off,
                row_off: window.row_off,
                reason: format!(
                    "window {}x{} exceeds raster extent {}x{}",
                    window.width, window.height, self.width(), self.height()
                ),
            });
        }

        Ok(self
            .data()
            .slice(s![
                ..,
                window.row_off..window.row_off + window.height,
                window.col_off..window.col_off + window.width
            ])
            .to_owned())
    }
}

/// Fixed-stride grid of read windows over a raster
#[derive(Debug, Clone)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tile_size: usize,
}

impl TileGrid {
    pub fn new(width: usize, height: usize, tile_size: usize) -> GeoResult<Self> {
        if tile_size == 0 {
            return Err(GeoError::InvalidConfiguration(
                "Tile size must be a positive integer".to_string(),
            ));
        }
        Ok(Self { width, height, tile_size })
    }

    /// Number of tiles that fit entirely inside the raster
    pub fn full_tile_count(&self) -> usize {
        (self.width / self.tile_size) * (self.height / self.tile_size)
    }

    /// Read windows clipped to the raster extent, columns in the outer loop
    pub fn windows(&self) -> impl Iterator<Item = Window> + '_ {
        (0..self.width).step_by(self.tile_size).flat_map(move |col_off| {
            (0..self.height).step_by(self.tile_size).map(move |row_off| {
                Window::new(
                    col_off,
                    row_off,
                    self.tile_size.min(self.width - col_off),
                    self.tile_size.min(self.height - row_off),
                )
            })
        })
    }
}

/// Read one grid window and turn it into a tile.
///
/// Returns `Ok(None)` for trailing edge windows smaller than the tile size;
/// those are read but never emitted.
pub fn extract_tile<S: RasterSource + ?Sized>(
    source: &S,
    window: Window,
    tile_size: usize,
) -> GeoResult<Option<Tile>> {
    let data = source.read_window(window).map_err(|e| match e {
        GeoError::SourceReadError { .. } => e,
        other => GeoError::SourceReadError {
            col_off: window.col_off,
            row_off: window.row_off,
            reason: other.to_string(),
        },
    })?;

    let (_, rows, cols) = data.dim();
    if rows != tile_size || cols != tile_size {
        log::debug!(
            "Dropping edge window at ({}, {}): {}x{} < {}",
            window.col_off, window.row_off, cols, rows, tile_size
        );
        return Ok(None);
    }

    let parent = source.profile();
    let transform = geotransform::offset(&parent.transform, window.col_off, window.row_off);
    let profile = parent.derive(tile_size, tile_size, transform);

    Ok(Some(Tile {
        raster: Raster::new(data, profile)?,
        col_off: window.col_off,
        row_off: window.row_off,
        tile_size,
    }))
}

/// Split a raster into full `tile_size` x `tile_size` tiles.
///
/// Any window read failure aborts the whole run.
pub fn tile<S: RasterSource + ?Sized>(source: &S, tile_size: usize) -> GeoResult<Vec<Tile>> {
    let profile = source.profile();
    let grid = TileGrid::new(profile.width, profile.height, tile_size)?;

    log::info!(
        "Tiling {}x{} raster ({} bands) into {}px tiles",
        profile.width, profile.height, profile.band_count, tile_size
    );

    let mut tiles = Vec::with_capacity(grid.full_tile_count());
    for window in grid.windows() {
        if let Some(tile) = extract_tile(source, window, tile_size)? {
            tiles.push(tile);
        }
    }

    log::info!("Produced {} tiles", tiles.len());
    Ok(tiles)
}

/// Recover (col_off, row_off) from a tile file name such as `tile_128_0.tif`
pub fn parse_tile_name(name: &str) -> Option<(usize, usize)> {
    let stem = name.strip_prefix("tile_")?;
    let stem = stem.split_once('.').map_or(stem, |(stem, _)| stem);
    let (col, row) = stem.split_once('_')?;
    Some((col.parse().ok()?, row.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::GeoTransform;
    use ndarray::Array3;

    fn ramp_raster(bands: usize, height: usize, width: usize) -> Raster {
        let data = Array3::from_shape_fn((bands, height, width), |(b, r, c)| {
            (b * 1_000_000 + r * 1_000 + c) as f64
        });
        Raster::from_buffer(data, GeoTransform::north_up(500000.0, 4200000.0, 10.0, 10.0))
    }

    struct FailingSource {
        profile: Profile,
        fail_at: (usize, usize),
    }

    impl RasterSource for FailingSource {
        fn profile(&self) -> &Profile {
            &self.profile
        }

        fn read_window(&self, window: Window) -> GeoResult<RasterBuffer> {
            if (window.col_off, window.row_off) == self.fail_at {
                return Err(GeoError::InvalidFormat("corrupt strip".to_string()));
            }
            Ok(RasterBuffer::zeros((self.profile.band_count, window.height, window.width)))
        }
    }

    #[test]
    fn test_grid_coverage_drops_edges() {
        let raster = ramp_raster(2, 300, 520);
        let tiles = tile(&raster, 128).unwrap();

        assert_eq!(tiles.len(), (520 / 128) * (300 / 128));
        for t in &tiles {
            assert_eq!(t.raster.data().dim(), (2, 128, 128));
            assert_eq!(t.raster.width(), 128);
            assert_eq!(t.raster.height(), 128);
        }
    }

    #[test]
    fn test_windows_are_column_major_and_clipped() {
        let grid = TileGrid::new(5, 3, 2).unwrap();
        let windows: Vec<Window> = grid.windows().collect();

        assert_eq!(windows.len(), 6);
        assert_eq!(windows[0], Window::new(0, 0, 2, 2));
        assert_eq!(windows[1], Window::new(0, 2, 2, 1));
        assert_eq!(windows[2], Window::new(2, 0, 2, 2));
        assert_eq!(windows[5], Window::new(4, 2, 1, 1));
        assert_eq!(grid.full_tile_count(), 2);
    }

    #[test]
    fn test_tile_pixels_and_transform() {
        let raster = ramp_raster(1, 256, 256);
        let tiles = tile(&raster, 128).unwrap();
        let t = tiles.iter().find(|t| t.col_off == 128 && t.row_off == 0).unwrap();

        assert_eq!(t.raster.data()[[0, 0, 0]], 128.0);
        assert_eq!(t.raster.data()[[0, 5, 7]], (5 * 1_000 + 135) as f64);
        assert_eq!(t.raster.transform().apply(0.0, 0.0), raster.transform().apply(128.0, 0.0));
        assert_eq!(t.name(), "tile_128_0");
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let raster = ramp_raster(1, 16, 16);
        assert!(matches!(tile(&raster, 0), Err(GeoError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_raster_smaller_than_tile_yields_nothing() {
        let raster = ramp_raster(3, 100, 100);
        assert!(tile(&raster, 128).unwrap().is_empty());
    }

    #[test]
    fn test_read_failure_aborts_run() {
        let profile = ramp_raster(1, 64, 64).profile().clone();
        let source = FailingSource { profile, fail_at: (32, 32) };

        match tile(&source, 32) {
            Err(GeoError::SourceReadError { col_off, row_off, .. }) => {
                assert_eq!((col_off, row_off), (32, 32));
            }
            other => panic!("expected SourceReadError, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_tile_name() {
        assert_eq!(parse_tile_name("tile_128_0.tif"), Some((128, 0)));
        assert_eq!(parse_tile_name("tile_0_256"), Some((0, 256)));
        assert_eq!(parse_tile_name("scene.tif"), None);
        assert_eq!(parse_tile_name("tile_12.tif"), None);
        assert_eq!(parse_tile_name("tile_a_3.tif"), None);
        assert_eq!(parse_tile_name("tile_1_2_3.tif"), None);
    }
}
