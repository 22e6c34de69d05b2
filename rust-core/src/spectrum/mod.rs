//! Spectral analysis, energy binning and temporal smoothing

pub mod windows;
pub mod fft;
pub mod energy;
pub mod history;
pub mod analysis;

pub use windows::{apply_window, WindowType};
pub use fft::{transform, ComplexSample, Direction, FftEngine};
pub use energy::{BandAggregation, EnergyBinner};
pub use history::{EnergyHistory, WarmupNormalization};
pub use analysis::{AudioSpectrum, SpectrumConfig};
