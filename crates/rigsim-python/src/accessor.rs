//! PyBody / PyActuator: Python wrappers around the session accessors.
//!
//! Vector quantities come back as float64 numpy arrays of shape (3,),
//! rotations as (3, 3). Accessors outliving their session raise
//! RuntimeError.

use nalgebra::{Matrix3, Vector3};
use numpy::{PyArray1, PyArray2};
use pyo3::prelude::*;

use rigsim_session::{Actuator as InnerActuator, Body as InnerBody, SessionError};

use crate::error::session_err;

pub(crate) fn vector<'py>(py: Python<'py>, v: Vector3<f64>) -> Bound<'py, PyArray1<f64>> {
    PyArray1::from_slice(py, v.as_slice())
}

pub(crate) fn matrix<'py>(py: Python<'py>, m: &Matrix3<f64>) -> PyResult<Bound<'py, PyArray2<f64>>> {
    let rows: Vec<Vec<f64>> = m
        .row_iter()
        .map(|row| row.iter().copied().collect())
        .collect();
    Ok(PyArray2::from_vec2(py, &rows)?)
}

fn query<'py>(
    py: Python<'py>,
    r: Result<Vector3<f64>, SessionError>,
) -> PyResult<Bound<'py, PyArray1<f64>>> {
    r.map(|v| vector(py, v)).map_err(session_err)
}

/// A rigid body (link) of the session's model.
#[pyclass(name = "Body")]
pub(crate) struct Body {
    pub(crate) inner: InnerBody,
}

#[pymethods]
impl Body {
    /// The link name.
    #[getter]
    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Returns `(world_p_body, world_r_body)`: position (3,) and rotation
    /// matrix (3, 3) of the body frame in the world.
    fn get_world_pose<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<(Bound<'py, PyArray1<f64>>, Bound<'py, PyArray2<f64>>)> {
        let (p, r) = self.inner.world_pose().map_err(session_err)?;
        Ok((vector(py, p), matrix(py, &r)?))
    }

    /// Linear velocity in the world frame.
    fn get_world_linear_vel<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.world_linear_vel())
    }

    /// Angular velocity in the world frame.
    fn get_world_angular_vel<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.world_angular_vel())
    }

    /// Linear acceleration in the world frame.
    fn get_world_linear_accel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.world_linear_accel())
    }

    /// Angular acceleration in the world frame.
    fn get_world_angular_accel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.world_angular_accel())
    }

    /// Linear velocity in the body frame.
    fn get_relative_linear_vel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.relative_linear_vel())
    }

    /// Linear acceleration in the body frame.
    fn get_relative_linear_accel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.relative_linear_accel())
    }

    /// Angular velocity in the body frame.
    fn get_relative_angular_vel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.relative_angular_vel())
    }

    /// Angular acceleration in the body frame.
    fn get_relative_angular_accel<'py>(
        &self,
        py: Python<'py>,
    ) -> PyResult<Bound<'py, PyArray1<f64>>> {
        query(py, self.inner.relative_angular_accel())
    }

    fn __repr__(&self) -> String {
        format!("Body({:?})", self.inner.name())
    }
}

/// A single-axis actuator (joint) of the session's model.
#[pyclass(name = "Actuator")]
pub(crate) struct Actuator {
    pub(crate) inner: InnerActuator,
}

#[pymethods]
impl Actuator {
    /// The joint name.
    #[getter]
    fn name(&self) -> &str {
        self.inner.name()
    }

    /// Commanded effort along the joint axis. Cleared on reset.
    fn get_torque(&self) -> PyResult<f64> {
        self.inner.torque().map_err(session_err)
    }

    /// Commands `torque` for the next tick. Raises ValueError if not finite.
    #[pyo3(signature = (torque))]
    fn set_torque(&self, torque: f64) -> PyResult<()> {
        self.inner.set_torque(torque).map_err(session_err)
    }

    /// Joint velocity along the axis.
    fn get_velocity(&self) -> PyResult<f64> {
        self.inner.velocity().map_err(session_err)
    }

    /// Joint position along the axis.
    fn get_position(&self) -> PyResult<f64> {
        self.inner.position().map_err(session_err)
    }

    fn __repr__(&self) -> String {
        format!("Actuator({:?})", self.inner.name())
    }
}
