//! Bandscope - Banded Audio Spectrum Core
//! 
//! Turns live stereo audio into a small number of smoothed frequency-energy
//! bands for real-time visualisation, with optional Python bindings.

// Suppress PyO3 non-local impl warnings (harmless macro-generated code)
#![cfg_attr(feature = "python", allow(non_local_definitions))]

pub mod audio;
pub mod error;
pub mod spectrum;

#[cfg(feature = "python")]
pub mod python_bindings;

pub use audio::{SampleProducer, SpectrumSource, WaveformSource};
pub use error::{Result, SpectrumError};
pub use spectrum::{AudioSpectrum, BandAggregation, SpectrumConfig, WarmupNormalization, WindowType};
