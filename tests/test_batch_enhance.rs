use geotile::core::{enhance_directory, tile_to_directory, Interpolation, NearestNeighbour};
use geotile::types::{Band, BandView, DataType, GeoError, GeoResult, GeoTransform, PipelineConfig, Profile, Raster};
use geotile::{read_raster, write_raster};
use ndarray::Array3;
use tempfile::TempDir;

fn write_tile(path: &std::path::Path, value: f64) {
    let data = Array3::from_elem((3, 16, 16), value);
    let profile = Profile {
        width: 16,
        height: 16,
        band_count: 3,
        data_type: DataType::UInt16,
        transform: GeoTransform::north_up(500000.0, 4200000.0, 10.0, 10.0),
        crs: String::new(),
        nodata: None,
        compression: None,
    };
    write_raster(&Raster::new(data, profile).unwrap(), path).unwrap();
}

fn config_for(tmp: &TempDir, factor: usize, parallel: bool) -> PipelineConfig {
    PipelineConfig {
        tiles_dir: tmp.path().join("tiles"),
        output_dir: tmp.path().join("super_resolved"),
        upscale_factor: factor,
        parallel,
        ..Default::default()
    }
}

#[test]
fn test_enhance_directory_mirrors_names() {
    let _ = env_logger::builder().is_test(true).try_init();
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp, 4, true);
    std::fs::create_dir_all(&config.tiles_dir).unwrap();

    write_tile(&config.tiles_dir.join("tile_0_0.tif"), 100.0);
    write_tile(&config.tiles_dir.join("tile_16_0.tif"), 200.0);
    std::fs::write(config.tiles_dir.join("notes.txt"), "not a raster").unwrap();

    let summary = enhance_directory(&config, &Interpolation::Cubic).unwrap();

    assert!(summary.is_success());
    assert_eq!(summary.written.len(), 2);
    assert_eq!(summary.skipped.len(), 1);

    let out = read_raster(config.output_dir.join("tile_16_0.tif")).unwrap();
    assert_eq!(out.data().dim(), (3, 64, 64));
    assert_eq!(out.profile().data_type, DataType::UInt16);
    assert_eq!(out.transform().pixel_size(), (2.5, -2.5));
    assert_eq!(out.transform().apply(0.0, 0.0), (500000.0, 4200000.0));
    assert!(out.data().iter().all(|&v| v == 200.0));
}

#[test]
fn test_failures_reported_not_swallowed() {
    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp, 2, false);
    std::fs::create_dir_all(&config.tiles_dir).unwrap();

    write_tile(&config.tiles_dir.join("tile_0_0.tif"), 1.0);
    std::fs::write(config.tiles_dir.join("tile_0_16.tif"), b"garbage").unwrap();

    let summary = enhance_directory(&config, &NearestNeighbour).unwrap();

    assert!(!summary.is_success());
    assert_eq!(summary.written.len(), 1);
    assert_eq!(summary.failures.len(), 1);
    assert!(summary.failures[0].path.ends_with("tile_0_16.tif"));
}

#[test]
fn test_contract_violation_surfaces_as_shape_mismatch() {
    fn broken(band: BandView<'_>, _factor: usize) -> GeoResult<Band> {
        Ok(band.to_owned())
    }

    let tmp = TempDir::new().unwrap();
    let config = config_for(&tmp, 3, false);
    std::fs::create_dir_all(&config.tiles_dir).unwrap();
    write_tile(&config.tiles_dir.join("tile_0_0.tif"), 5.0);

    let summary = enhance_directory(&config, &broken).unwrap();

    assert_eq!(summary.failures.len(), 1);
    assert!(matches!(
        summary.failures[0].error,
        GeoError::ShapeMismatch { expected: (48, 48), actual: (16, 16) }
    ));
}

#[test]
fn test_tile_then_enhance_pipeline() {
    let tmp = TempDir::new().unwrap();
    let scene_path = tmp.path().join("scene.tif");
    let data = Array3::from_shape_fn((2, 100, 70), |(b, r, c)| (b * 10_000 + r * 100 + c) as f64);
    let scene = Raster::from_buffer(data, GeoTransform::north_up(0.0, 1000.0, 10.0, 10.0));
    write_raster(&scene, &scene_path).unwrap();

    let config = config_for(&tmp, 2, true);
    let tiles = tile_to_directory(&scene_path, &config.tiles_dir, 32).unwrap();
    assert_eq!(tiles.len(), (70 / 32) * (100 / 32));

    let summary = enhance_directory(&config, &NearestNeighbour).unwrap();
    assert_eq!(summary.written.len(), tiles.len());

    let total_pixels: usize = summary
        .written
        .iter()
        .map(|p| {
            let r = read_raster(p).unwrap();
            r.width() * r.height()
        })
        .sum();
    assert_eq!(total_pixels, (70 / 32) * 32 * 2 * (100 / 32) * 32 * 2);

    let up = read_raster(config.output_dir.join("tile_32_64.tif")).unwrap();
    assert_eq!(up.transform().apply(0.0, 0.0), scene.transform().apply(32.0, 64.0));
    assert_eq!(up.band(1)[[3, 5]], scene.band(1)[[64 + 1, 32 + 2]]);
}
