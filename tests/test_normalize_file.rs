use geotile::core::normalize_file;
use geotile::types::{DataType, GeoError, GeoTransform, Profile, Raster};
use geotile::{read_raster, write_raster};
use ndarray::Array3;
use tempfile::TempDir;

fn uint16_scene(data: Array3<f64>) -> Raster {
    let (band_count, height, width) = data.dim();
    let profile = Profile {
        width,
        height,
        band_count,
        data_type: DataType::UInt16,
        transform: GeoTransform::north_up(300000.0, 5000000.0, 10.0, 10.0),
        crs: String::new(),
        nodata: None,
        compression: None,
    };
    Raster::new(data, profile).unwrap()
}

#[test]
fn test_normalized_file_in_unit_range() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("in.tif");
    let output = tmp.path().join("out.tif");

    let data = Array3::from_shape_fn((3, 32, 32), |(b, r, c)| (b * 1000 + r * 32 + c) as f64);
    write_raster(&uint16_scene(data), &input).unwrap();

    normalize_file(&input, &output).unwrap();
    let out = read_raster(&output).unwrap();

    assert_eq!(out.profile().data_type, DataType::Float32);
    assert_eq!(out.data().dim(), (3, 32, 32));
    assert_eq!(out.transform(), GeoTransform::north_up(300000.0, 5000000.0, 10.0, 10.0));
    assert_eq!(out.data()[[0, 0, 0]], 0.0);
    assert_eq!(out.data()[[2, 31, 31]], 1.0);
    assert!(out.data().iter().all(|&v| (0.0..=1.0).contains(&v)));
}

#[test]
fn test_constant_file_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    let input = tmp.path().join("flat.tif");
    let output = tmp.path().join("flat_norm.tif");
    write_raster(&uint16_scene(Array3::from_elem((1, 8, 8), 42.0)), &input).unwrap();

    let result = normalize_file(&input, &output);

    assert!(matches!(result, Err(GeoError::DegenerateInput(_))));
    assert!(!output.exists());
}
