//! PyO3 bindings for Python integration

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::error::SpectrumError;

mod spectrum_bindings;
mod window_bindings;

impl From<SpectrumError> for PyErr {
    fn from(err: SpectrumError) -> Self {
        PyValueError::new_err(err.to_string())
    }
}

/// Python module definition
#[pymodule]
fn bandscope(_py: Python, m: &PyModule) -> PyResult<()> {
    m.add_class::<spectrum_bindings::PyAudioSpectrum>()?;

    // Add WindowType enum
    m.add_class::<window_bindings::PyWindowType>()?;

    Ok(())
}
