use crate::core::enhance::enhance;
use crate::core::normalize::normalize;
use crate::core::tiling::{extract_tile, RasterSource, TileGrid};
use crate::core::upscale::Upscale;
use crate::io::{read_raster, write_raster, GeoTiffReader};
use crate::types::{GeoError, GeoResult, PipelineConfig};
use std::path::{Path, PathBuf};

/// A file that failed inside a batch run
#[derive(Debug)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: GeoError,
}

impl std::fmt::Display for FileFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.path.display(), self.error)
    }
}

/// Per-file outcome of a directory run
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Output files written
    pub written: Vec<PathBuf>,
    /// Input entries ignored because they are not recognized rasters
    pub skipped: Vec<PathBuf>,
    pub failures: Vec<FileFailure>,
}

impl BatchSummary {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Cut a raster file into `tile_size` tiles written as `tile_{col}_{row}.tif`.
///
/// The output directory is created if needed. Tiles are streamed one window
/// at a time; the first read or write failure aborts the run.
pub fn tile_to_directory<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output_dir: Q,
    tile_size: usize,
) -> GeoResult<Vec<PathBuf>> {
    let output_dir = output_dir.as_ref();
    let reader = GeoTiffReader::open(input.as_ref())?;
    let (width, height) = (reader.profile().width, reader.profile().height);
    let grid = TileGrid::new(width, height, tile_size)?;

    std::fs::create_dir_all(output_dir)?;
    log::info!(
        "Tiling {} ({}x{}) into {} full {}px tiles",
        input.as_ref().display(), width, height, grid.full_tile_count(), tile_size
    );

    let mut written = Vec::with_capacity(grid.full_tile_count());
    for window in grid.windows() {
        if let Some(tile) = extract_tile(&reader, window, tile_size)? {
            let path = output_dir.join(tile.file_name());
            log::info!("Generating tile: {}", tile.file_name());
            write_raster(&tile.raster, &path)?;
            written.push(path);
        }
    }

    log::info!(
        "Tiling complete for {} -> {}",
        input.as_ref().display(),
        output_dir.display()
    );
    Ok(written)
}

/// Enhance every raster in `config.tiles_dir` into `config.output_dir`.
///
/// Output files keep their input names. Files are independent: a failure is
/// recorded in the summary and the remaining files are still processed.
/// Configuration and directory listing errors abort before any file is touched.
pub fn enhance_directory<U: Upscale + Sync + ?Sized>(
    config: &PipelineConfig,
    upscaler: &U,
) -> GeoResult<BatchSummary> {
    if config.upscale_factor == 0 {
        return Err(GeoError::InvalidConfiguration(
            "Upscale factor must be a positive integer".to_string(),
        ));
    }

    let (inputs, skipped) = list_rasters(&config.tiles_dir, &config.extensions)?;
    std::fs::create_dir_all(&config.output_dir)?;

    log::info!(
        "Enhancing {} rasters from {} by x{} ({} upscaler)",
        inputs.len(),
        config.tiles_dir.display(),
        config.upscale_factor,
        upscaler.name()
    );

    let process = |path: &PathBuf| -> GeoResult<PathBuf> {
        let file_name = path
            .file_name()
            .ok_or_else(|| GeoError::InvalidFormat(format!("{} has no file name", path.display())))?;
        let output = config.output_dir.join(file_name);

        log::info!("Processing: {}", path.display());
        let raster = read_raster(path)?;
        let enhanced = enhance(&raster, config.upscale_factor, upscaler)?;
        write_raster(&enhanced, &output)?;
        Ok(output)
    };

    #[cfg(feature = "parallel")]
    let results: Vec<(PathBuf, GeoResult<PathBuf>)> = if config.parallel {
        use rayon::prelude::*;
        inputs.par_iter().map(|p| (p.clone(), process(p))).collect()
    } else {
        inputs.iter().map(|p| (p.clone(), process(p))).collect()
    };

    #[cfg(not(feature = "parallel"))]
    let results: Vec<(PathBuf, GeoResult<PathBuf>)> =
        inputs.iter().map(|p| (p.clone(), process(p))).collect();

    let mut summary = BatchSummary {
        skipped,
        ..Default::default()
    };
    for (path, result) in results {
        match result {
            Ok(output) => summary.written.push(output),
            Err(error) => {
                log::warn!("Failed to enhance {}: {}", path.display(), error);
                summary.failures.push(FileFailure { path, error });
            }
        }
    }

    log::info!(
        "Super-resolution finished: {} written, {} skipped, {} failed",
        summary.written.len(),
        summary.skipped.len(),
        summary.failures.len()
    );
    Ok(summary)
}

/// Normalize one raster file into another
pub fn normalize_file<P: AsRef<Path>, Q: AsRef<Path>>(input: P, output: Q) -> GeoResult<()> {
    log::info!("Normalizing {}", input.as_ref().display());
    let raster = read_raster(input)?;
    let normalized = normalize(&raster)?;
    write_raster(&normalized, output.as_ref())?;
    log::info!("Normalized raster written to {}", output.as_ref().display());
    Ok(())
}

/// Split a directory listing into recognized rasters and everything else, sorted by path
fn list_rasters(dir: &Path, extensions: &[String]) -> GeoResult<(Vec<PathBuf>, Vec<PathBuf>)> {
    let mut rasters = Vec::new();
    let mut skipped = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, extensions) {
            rasters.push(path);
        } else {
            log::debug!("Skipping {}", path.display());
            skipped.push(path);
        }
    }

    rasters.sort();
    skipped.sort();
    Ok((rasters, skipped))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| extensions.iter().any(|known| known.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_matching() {
        let exts = vec!["tif".to_string(), "tiff".to_string()];

        assert!(has_extension(Path::new("tile_0_0.tif"), &exts));
        assert!(has_extension(Path::new("scene.TIFF"), &exts));
        assert!(!has_extension(Path::new("notes.txt"), &exts));
        assert!(!has_extension(Path::new("README"), &exts));
    }

    #[test]
    fn test_zero_factor_rejected_before_listing() {
        let config = PipelineConfig {
            upscale_factor: 0,
            tiles_dir: PathBuf::from("/nonexistent/tiles"),
            ..Default::default()
        };
        let result = enhance_directory(&config, &crate::core::upscale::Identity);

        assert!(matches!(result, Err(GeoError::InvalidConfiguration(_))));
    }
}
