//! Python bindings for rigsim simulation sessions.
//!
//! This crate provides PyO3 bindings over `rigsim-session`. The native
//! extension is named `_rigsim`.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

use pyo3::prelude::*;

mod accessor;
mod config;
mod error;
mod functions;
mod session;

/// The native `_rigsim` extension module.
#[pymodule]
fn _rigsim(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Core classes
    m.add_class::<config::SessionConfig>()?;
    m.add_class::<session::Session>()?;
    m.add_class::<accessor::Body>()?;
    m.add_class::<accessor::Actuator>()?;

    // Functions
    m.add_function(wrap_pyfunction!(functions::urdf_to_sdf, m)?)?;
    m.add_function(wrap_pyfunction!(functions::extract_model_name, m)?)?;
    m.add_function(wrap_pyfunction!(functions::dcm_to_euler_angles, m)?)?;
    m.add_function(wrap_pyfunction!(functions::euler_angles_to_dcm, m)?)?;

    // Constants
    m.add("AS_FAST_AS_POSSIBLE", rigsim_session::AS_FAST_AS_POSSIBLE)?;
    m.add("WORLD_DEFAULT_RATE", rigsim_session::WORLD_DEFAULT_RATE)?;
    m.add("DEFAULT_SEED", rigsim_session::DEFAULT_SEED)?;

    Ok(())
}
