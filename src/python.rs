use crate::core::{self, Interpolation};
use crate::types::{GeoError, GeoTransform, PipelineConfig, Raster};
use numpy::{PyReadonlyArray3, ToPyArray};
use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;
use pyo3::types::PyDict;
use std::path::PathBuf;

fn to_py_err(err: GeoError) -> PyErr {
    match err {
        GeoError::InvalidConfiguration(_)
        | GeoError::ShapeMismatch { .. }
        | GeoError::DegenerateInput(_) => PyValueError::new_err(err.to_string()),
        _ => PyRuntimeError::new_err(err.to_string()),
    }
}

fn parse_method(method: &str) -> PyResult<Interpolation> {
    match method.to_lowercase().as_str() {
        "cubic" => Ok(Interpolation::Cubic),
        "nearest" => Ok(Interpolation::Nearest),
        _ => Err(PyValueError::new_err(format!("Invalid interpolation method: {}", method))),
    }
}

/// Tile a GeoTIFF into `tile_size` tiles, returning the written paths
#[pyfunction]
#[pyo3(signature = (input, output_dir, tile_size = None))]
fn tile_raster(py: Python, input: String, output_dir: String, tile_size: Option<usize>) -> PyResult<Vec<String>> {
    let tile_size = tile_size.unwrap_or(PipelineConfig::default().tile_size);
    let written = py
        .allow_threads(|| core::tile_to_directory(&input, &output_dir, tile_size))
        .map_err(to_py_err)?;

    Ok(written.iter().map(|p| p.to_string_lossy().to_string()).collect())
}

/// Upscale every tile in a directory
#[pyfunction]
#[pyo3(signature = (input_dir, output_dir, factor = 4, method = "cubic"))]
fn enhance_tiles(
    py: Python,
    input_dir: String,
    output_dir: String,
    factor: usize,
    method: &str,
) -> PyResult<PyObject> {
    let upscaler = parse_method(method)?;
    let config = PipelineConfig {
        tiles_dir: PathBuf::from(input_dir),
        output_dir: PathBuf::from(output_dir),
        upscale_factor: factor,
        ..Default::default()
    };

    let summary = py
        .allow_threads(|| core::enhance_directory(&config, &upscaler))
        .map_err(to_py_err)?;

    let paths = |v: &[PathBuf]| -> Vec<String> { v.iter().map(|p| p.to_string_lossy().to_string()).collect() };
    let failures: Vec<(String, String)> = summary
        .failures
        .iter()
        .map(|f| (f.path.to_string_lossy().to_string(), f.error.to_string()))
        .collect();

    let result = PyDict::new(py);
    result.set_item("written", paths(&summary.written))?;
    result.set_item("skipped", paths(&summary.skipped))?;
    result.set_item("failures", failures)?;

    Ok(result.into())
}

/// Normalize a GeoTIFF into a float GeoTIFF with values in [0, 1]
#[pyfunction]
fn normalize_raster(input: String, output: String) -> PyResult<()> {
    core::normalize_file(&input, &output).map_err(to_py_err)
}

/// Normalize a (bands, rows, cols) array in memory
#[pyfunction]
fn normalize_array(py: Python, data: PyReadonlyArray3<f64>) -> PyResult<PyObject> {
    let raster = Raster::from_buffer(data.as_array().to_owned(), GeoTransform::default());
    let normalized = core::normalize(&raster).map_err(to_py_err)?;

    let numpy_array = normalized.data().to_pyarray(py);
    Ok(numpy_array.into())
}

/// Python module definition
#[pymodule]
fn _core(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(tile_raster, m)?)?;
    m.add_function(wrap_pyfunction!(enhance_tiles, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_raster, m)?)?;
    m.add_function(wrap_pyfunction!(normalize_array, m)?)?;
    Ok(())
}
