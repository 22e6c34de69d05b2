//! Python bindings for the banded spectrum pipeline

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use numpy::{PyArray1, PyReadonlyArray1};

use crate::audio::{SampleProducer, WaveformSource};
use crate::spectrum::{AudioSpectrum, SpectrumConfig};
use super::window_bindings::PyWindowType;

/// Banded spectrum pipeline exposed to Python
///
/// Samples are pushed interleaved; the spectrum is computed from the most
/// recent frame on each `get_audio_spectrum` call.
#[pyclass(name = "AudioSpectrum")]
pub struct PyAudioSpectrum {
    spectrum: AudioSpectrum<WaveformSource>,
    producer: SampleProducer,
}

#[pymethods]
impl PyAudioSpectrum {
    /// Create a new spectrum pipeline
    /// 
    /// Args:
    ///     channels: Interleaved channel count of pushed samples
    ///     left_channel: Channel used as left
    ///     right_channel: Channel used as right
    ///     window: Window applied before the FFT
    ///     fft_size: Magnitude bins per channel (power of two)
    ///     fragment_count: Output bands (must divide fft_size)
    ///     history_capacity: Updates averaged for smoothing
    ///     buffer_frames: Sample buffer capacity in frames
    #[new]
    #[pyo3(signature = (
        channels=2,
        left_channel=0,
        right_channel=1,
        window=PyWindowType::BlackmanHarris,
        fft_size=512,
        fragment_count=64,
        history_capacity=43,
        buffer_frames=16384
    ))]
    #[allow(clippy::too_many_arguments)]
    fn new(
        channels: usize,
        left_channel: usize,
        right_channel: usize,
        window: PyWindowType,
        fft_size: usize,
        fragment_count: usize,
        history_capacity: usize,
        buffer_frames: usize,
    ) -> PyResult<Self> {
        let config = SpectrumConfig {
            left_channel,
            right_channel,
            window: window.into(),
            fft_size,
            fragment_count,
            history_capacity,
            ..SpectrumConfig::default()
        };

        let (source, producer) = WaveformSource::new(channels, fft_size, buffer_frames)?;
        let spectrum = AudioSpectrum::new(source, config)?;

        Ok(Self { spectrum, producer })
    }

    /// Push interleaved samples
    /// 
    /// Args:
    ///     samples: Interleaved float32 samples as numpy array
    /// 
    /// Returns:
    ///     Number of samples accepted
    fn push_samples(&mut self, samples: PyReadonlyArray1<f32>) -> PyResult<usize> {
        let data = samples
            .as_slice()
            .map_err(|e| PyValueError::new_err(e.to_string()))?;
        Ok(self.producer.write(data))
    }

    /// Advance one frame and return the averaged band energies
    /// 
    /// Call once per rendered frame.
    /// 
    /// Returns:
    ///     Band energies as numpy array
    fn get_audio_spectrum<'py>(&mut self, py: Python<'py>) -> PyResult<&'py PyArray1<f32>> {
        let averaged = self.spectrum.update()?;
        Ok(PyArray1::from_slice(py, averaged))
    }

    /// Change the analysis window
    fn set_window(&mut self, window: PyWindowType) -> PyResult<()> {
        let mut config = self.spectrum.config().clone();
        config.window = window.into();
        self.spectrum.update_config(config)?;
        Ok(())
    }

    /// Get current analysis window
    fn get_window(&self) -> PyWindowType {
        self.spectrum.config().window.into()
    }

    /// Number of output bands
    fn fragment_count(&self) -> usize {
        self.spectrum.config().fragment_count
    }

    /// Snapshots currently averaged
    fn history_len(&self) -> usize {
        self.spectrum.history_len()
    }

    /// Discard the smoothing history
    fn reset(&mut self) {
        self.spectrum.reset();
    }
}
