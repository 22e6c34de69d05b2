//! Per-channel magnitude spectra for the spectrum pipeline
//!
//! [`SpectrumSource`] is the seam between the pipeline and whatever owns the
//! audio. [`WaveformSource`] is the built-in implementation: it keeps the most
//! recent frame of raw samples per channel and transforms it on demand.

use super::buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
use crate::error::{Result, SpectrumError};
use crate::spectrum::fft::FftEngine;
use crate::spectrum::windows::WindowType;

/// Supplier of normalised magnitude spectra
pub trait SpectrumSource {
    /// Fill `out` with the magnitude spectrum of `channel`, analysed with
    /// `window`. `out.len()` is the number of bins requested.
    fn fill_spectrum(&mut self, channel: usize, window: WindowType, out: &mut [f32]) -> Result<()>;

    /// Number of channels the source carries, if fixed
    fn channel_count(&self) -> Option<usize> {
        None
    }

    /// Number of bins the source produces per request, if fixed
    fn bin_count(&self) -> Option<usize> {
        None
    }
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for &mut S {
    fn fill_spectrum(&mut self, channel: usize, window: WindowType, out: &mut [f32]) -> Result<()> {
        (**self).fill_spectrum(channel, window, out)
    }

    fn channel_count(&self) -> Option<usize> {
        (**self).channel_count()
    }

    fn bin_count(&self) -> Option<usize> {
        (**self).bin_count()
    }
}

impl<S: SpectrumSource + ?Sized> SpectrumSource for Box<S> {
    fn fill_spectrum(&mut self, channel: usize, window: WindowType, out: &mut [f32]) -> Result<()> {
        (**self).fill_spectrum(channel, window, out)
    }

    fn channel_count(&self) -> Option<usize> {
        (**self).channel_count()
    }

    fn bin_count(&self) -> Option<usize> {
        (**self).bin_count()
    }
}

/// Spectrum source computing magnitudes from raw interleaved samples
///
/// Each channel keeps a sliding frame of `2 * bins` samples. A request for
/// `bins` magnitudes windows that frame, runs the forward FFT and returns the
/// first `bins` bins.
pub struct WaveformSource {
    consumer: SampleConsumer,
    channels: usize,

    /// Most recent samples per channel, oldest first
    frames: Vec<Vec<f32>>,

    /// Interleaved read buffer
    scratch: Vec<f32>,

    /// One channel's worth of freshly read samples
    lane: Vec<f32>,

    engine: FftEngine,

    /// Samples per channel received so far, capped at the frame length
    received: usize,

    warned_partial: bool,
}

impl WaveformSource {
    /// Create source and the producer that feeds it
    ///
    /// # Arguments
    /// * `channels` - Interleaved channel count
    /// * `bins` - Magnitude bins per request (power of two)
    /// * `capacity_frames` - Ring buffer capacity in frames
    pub fn new(channels: usize, bins: usize, capacity_frames: usize) -> Result<(Self, SampleProducer)> {
        let frame_len = bins.checked_mul(2).ok_or_else(|| {
            SpectrumError::InvalidConfig(format!("{} bins is too large", bins))
        })?;
        let engine = FftEngine::new(frame_len)?;
        let (producer, consumer) = SampleRingBuffer::new(channels, capacity_frames)?.split();

        log::debug!(
            "Waveform source: {} channels, {}-point FFT, {} frame buffer",
            channels,
            frame_len,
            capacity_frames
        );

        let source = Self {
            consumer,
            channels,
            frames: vec![vec![0.0; frame_len]; channels],
            scratch: vec![0.0; channels * frame_len],
            lane: Vec::with_capacity(frame_len),
            engine,
            received: 0,
            warned_partial: false,
        };

        Ok((source, producer))
    }

    /// Move everything waiting in the ring buffer into the channel frames
    pub fn drain(&mut self) {
        let frame_len = self.engine.frame_size();

        while self.consumer.available_frames() > 0 {
            let read = self.consumer.read(&mut self.scratch);
            let fresh = read / self.channels;
            if fresh == 0 {
                break;
            }

            for (channel, frame) in self.frames.iter_mut().enumerate() {
                self.lane.clear();
                self.lane.extend(
                    self.scratch[..read]
                        .iter()
                        .skip(channel)
                        .step_by(self.channels)
                        .copied(),
                );
                slide_in(frame, &self.lane);
            }

            self.received = (self.received + fresh).min(frame_len);
        }
    }

    /// Most recent time-domain frame of `channel`
    pub fn frame(&self, channel: usize) -> Option<&[f32]> {
        self.frames.get(channel).map(|f| f.as_slice())
    }

    /// True once a full frame has been received on every channel
    pub fn is_primed(&self) -> bool {
        self.received == self.engine.frame_size()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Magnitude bins produced per request
    pub fn num_bins(&self) -> usize {
        self.engine.num_bins()
    }
}

impl SpectrumSource for WaveformSource {
    fn fill_spectrum(&mut self, channel: usize, window: WindowType, out: &mut [f32]) -> Result<()> {
        if channel >= self.channels {
            return Err(SpectrumError::ChannelOutOfRange {
                channel,
                channels: self.channels,
            });
        }
        if out.len() != self.engine.num_bins() {
            return Err(SpectrumError::LengthMismatch {
                expected: self.engine.num_bins(),
                found: out.len(),
            });
        }

        self.drain();

        if !self.is_primed() && !self.warned_partial {
            log::warn!(
                "Analysing a partial frame ({} of {} samples received)",
                self.received,
                self.engine.frame_size()
            );
            self.warned_partial = true;
        }

        self.engine.magnitudes(&self.frames[channel], window, out)
    }

    fn channel_count(&self) -> Option<usize> {
        Some(self.channels)
    }

    fn bin_count(&self) -> Option<usize> {
        Some(self.engine.num_bins())
    }
}

/// Shift `fresh` into the end of `frame`, discarding the oldest samples
fn slide_in(frame: &mut [f32], fresh: &[f32]) {
    let len = frame.len();
    if fresh.len() >= len {
        frame.copy_from_slice(&fresh[fresh.len() - len..]);
    } else {
        frame.copy_within(fresh.len().., 0);
        frame[len - fresh.len()..].copy_from_slice(fresh);
    }
}
