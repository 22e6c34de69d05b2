//! Python binding for window selection

use pyo3::prelude::*;
use crate::spectrum::WindowType;

/// Window type enum exposed to Python
#[pyclass(name = "WindowType")]
#[derive(Clone, Copy)]
pub enum PyWindowType {
    Hamming,
    Hanning,
    Welch,
    BlackmanHarris,
    BlackmanNuttall,
    Cosine,
    TriangularA,
    TriangularB,
    TriangularC,
}

impl From<PyWindowType> for WindowType {
    fn from(py_win: PyWindowType) -> Self {
        match py_win {
            PyWindowType::Hamming => WindowType::Hamming,
            PyWindowType::Hanning => WindowType::Hanning,
            PyWindowType::Welch => WindowType::Welch,
            PyWindowType::BlackmanHarris => WindowType::BlackmanHarris,
            PyWindowType::BlackmanNuttall => WindowType::BlackmanNuttall,
            PyWindowType::Cosine => WindowType::Cosine,
            PyWindowType::TriangularA => WindowType::TriangularA,
            PyWindowType::TriangularB => WindowType::TriangularB,
            PyWindowType::TriangularC => WindowType::TriangularC,
        }
    }
}

impl From<WindowType> for PyWindowType {
    fn from(win: WindowType) -> Self {
        match win {
            WindowType::Hamming => PyWindowType::Hamming,
            WindowType::Hanning => PyWindowType::Hanning,
            WindowType::Welch => PyWindowType::Welch,
            WindowType::BlackmanHarris => PyWindowType::BlackmanHarris,
            WindowType::BlackmanNuttall => PyWindowType::BlackmanNuttall,
            WindowType::Cosine => PyWindowType::Cosine,
            WindowType::TriangularA => PyWindowType::TriangularA,
            WindowType::TriangularB => PyWindowType::TriangularB,
            WindowType::TriangularC => PyWindowType::TriangularC,
        }
    }
}
