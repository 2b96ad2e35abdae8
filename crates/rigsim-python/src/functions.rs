//! Module-level helpers: description conversion and frame math.

use nalgebra::{Matrix3, Vector3};
use numpy::{PyArray1, PyArray2};
use pyo3::prelude::*;

use crate::accessor::{matrix, vector};
use crate::error::description_err;

/// Convert URDF text to SDF text. Raises ValueError on malformed input.
#[pyfunction]
#[pyo3(signature = (model_urdf))]
pub(crate) fn urdf_to_sdf(model_urdf: &str) -> PyResult<String> {
    rigsim_description::convert_legacy_description(model_urdf).map_err(description_err)
}

/// Name declared by the first `<model>` of an SDF document.
#[pyfunction]
#[pyo3(signature = (model_sdf))]
pub(crate) fn extract_model_name(model_sdf: &str) -> PyResult<String> {
    rigsim_description::extract_model_name(model_sdf).map_err(description_err)
}

/// Roll-pitch-yaw angles (radians) of a 3x3 rotation matrix.
#[pyfunction]
#[pyo3(signature = (global_r_local))]
pub(crate) fn dcm_to_euler_angles<'py>(
    py: Python<'py>,
    global_r_local: [[f64; 3]; 3],
) -> Bound<'py, PyArray1<f64>> {
    let m = Matrix3::from_fn(|i, j| global_r_local[i][j]);
    vector(py, rigsim_core::dcm_to_euler_angles(&m))
}

/// 3x3 rotation matrix of roll-pitch-yaw angles (radians).
#[pyfunction]
#[pyo3(signature = (euler_angles))]
pub(crate) fn euler_angles_to_dcm<'py>(
    py: Python<'py>,
    euler_angles: [f64; 3],
) -> PyResult<Bound<'py, PyArray2<f64>>> {
    matrix(
        py,
        &rigsim_core::euler_angles_to_dcm(&Vector3::from(euler_angles)),
    )
}
