//! In-place radix-2 FFT
//!
//! Iterative decimation-in-time Cooley-Tukey transform over `2^m` complex
//! samples. Twiddle factors are generated with the half-angle recurrence, so
//! no trigonometric call is made inside the butterfly loops. Twiddle products
//! are carried in `f64` while the samples stay `f32`.

use num_complex::Complex;

use super::windows::{apply_window, WindowType};
use crate::error::{Result, SpectrumError};

/// Single complex sample, magnitude via [`Complex::norm`]
pub type ComplexSample = Complex<f32>;

/// Transform direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Time to frequency, output scaled by 1/N
    Forward,
    /// Frequency to time, unscaled
    Inverse,
}

/// Exponent `m` such that `len == 2^m`, if one exists
pub fn log2_exact(len: usize) -> Option<u32> {
    if len.is_power_of_two() {
        Some(len.trailing_zeros())
    } else {
        None
    }
}

/// Transform `data` in place
///
/// # Arguments
/// * `direction` - Forward (scaled by 1/N) or inverse (unscaled)
/// * `exponent` - log2 of the transform length
/// * `data` - Exactly `2^exponent` samples
///
/// # Errors
/// [`SpectrumError::InvalidSize`] if the length does not match the exponent.
/// The buffer is left untouched in that case.
pub fn transform(direction: Direction, exponent: u32, data: &mut [ComplexSample]) -> Result<()> {
    let n = data.len();
    if 1usize.checked_shl(exponent) != Some(n) {
        return Err(SpectrumError::InvalidSize { len: n, exponent });
    }

    bit_reverse_permute(data);

    let forward = direction == Direction::Forward;

    // cos/sin of the per-stage rotation, starting at θ = π
    let mut step_cos = -1.0f64;
    let mut step_sin = 0.0f64;
    let mut half = 1usize;

    for _ in 0..exponent {
        let span = half << 1;
        let mut w_re = 1.0f64;
        let mut w_im = 0.0f64;

        for offset in 0..half {
            let mut top = offset;
            while top < n {
                let bottom = top + half;
                let b_re = data[bottom].re as f64;
                let b_im = data[bottom].im as f64;
                let t_re = (w_re * b_re - w_im * b_im) as f32;
                let t_im = (w_re * b_im + w_im * b_re) as f32;

                data[bottom].re = data[top].re - t_re;
                data[bottom].im = data[top].im - t_im;
                data[top].re += t_re;
                data[top].im += t_im;

                top += span;
            }

            let next_re = w_re * step_cos - w_im * step_sin;
            w_im = w_re * step_sin + w_im * step_cos;
            w_re = next_re;
        }

        // Halve the angle for the next stage
        step_sin = ((1.0 - step_cos) / 2.0).sqrt();
        if forward {
            step_sin = -step_sin;
        }
        step_cos = ((1.0 + step_cos) / 2.0).sqrt();
        half = span;
    }

    if forward {
        let scale = n as f32;
        for sample in data.iter_mut() {
            sample.re /= scale;
            sample.im /= scale;
        }
    }

    Ok(())
}

/// Reorder so index `i` holds the sample originally at bit-reverse(`i`)
fn bit_reverse_permute(data: &mut [ComplexSample]) {
    let n = data.len();
    let half = n >> 1;
    let mut j = 0usize;

    for i in 0..n.saturating_sub(1) {
        if i < j {
            data.swap(i, j);
        }
        let mut k = half;
        while k > 0 && k <= j {
            j -= k;
            k >>= 1;
        }
        j += k;
    }
}

/// Magnitude spectrum engine for real-valued frames
///
/// Owns a preallocated complex buffer sized for one frame, so repeated
/// analysis does not allocate.
pub struct FftEngine {
    exponent: u32,
    buffer: Vec<ComplexSample>,
}

impl FftEngine {
    /// Create engine for frames of `frame_size` samples (power of two)
    pub fn new(frame_size: usize) -> Result<Self> {
        let exponent = log2_exact(frame_size).ok_or_else(|| {
            SpectrumError::InvalidConfig(format!(
                "FFT frame size {} is not a power of two",
                frame_size
            ))
        })?;

        Ok(Self {
            exponent,
            buffer: vec![ComplexSample::new(0.0, 0.0); frame_size],
        })
    }

    /// Window `frame`, transform it and write bin magnitudes into `out`
    ///
    /// # Arguments
    /// * `frame` - Real time-domain samples, exactly `frame_size` long
    /// * `window` - Window applied to each sample before the transform
    /// * `out` - Receives |X[k]| for k = 0..out.len(), at most `frame_size` bins
    pub fn magnitudes(&mut self, frame: &[f32], window: WindowType, out: &mut [f32]) -> Result<()> {
        if frame.len() != self.buffer.len() {
            return Err(SpectrumError::LengthMismatch {
                expected: self.buffer.len(),
                found: frame.len(),
            });
        }
        if out.len() > self.buffer.len() {
            return Err(SpectrumError::LengthMismatch {
                expected: self.buffer.len(),
                found: out.len(),
            });
        }

        for (slot, &s) in self.buffer.iter_mut().zip(frame.iter()) {
            *slot = ComplexSample::new(s, 0.0);
        }

        apply_window(&mut self.buffer, window)?;
        transform(Direction::Forward, self.exponent, &mut self.buffer)?;

        for (o, c) in out.iter_mut().zip(self.buffer.iter()) {
            *o = c.norm();
        }

        Ok(())
    }

    /// Get frame size
    pub fn frame_size(&self) -> usize {
        self.buffer.len()
    }

    /// Get log2 of the frame size
    pub fn exponent(&self) -> u32 {
        self.exponent
    }

    /// Number of non-redundant bins for a real input (frame_size/2)
    pub fn num_bins(&self) -> usize {
        self.buffer.len() / 2
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rustfft::FftPlanner;
    use std::f64::consts::PI;

    fn test_signal(len: usize, seed: u32) -> Vec<ComplexSample> {
        // Deterministic unit-range pseudo-noise
        let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);
        (0..len)
            .map(|_| {
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let re = (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                state = state.wrapping_mul(1664525).wrapping_add(1013904223);
                let im = (state >> 8) as f32 / (1u32 << 24) as f32 * 2.0 - 1.0;
                ComplexSample::new(re, im)
            })
            .collect()
    }

    fn max_error(a: &[ComplexSample], b: &[ComplexSample]) -> f32 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).norm())
            .fold(0.0, f32::max)
    }

    #[test]
    fn test_round_trip() {
        for exponent in 0..=10 {
            let original = test_signal(1 << exponent, exponent);
            let mut data = original.clone();

            transform(Direction::Forward, exponent, &mut data).unwrap();
            transform(Direction::Inverse, exponent, &mut data).unwrap();

            assert!(max_error(&original, &data) < 1e-4, "exponent {}", exponent);
        }
    }

    #[test]
    fn test_impulse_is_flat() {
        let n = 64;
        let mut data = vec![ComplexSample::new(0.0, 0.0); n];
        data[0].re = 1.0;

        transform(Direction::Forward, 6, &mut data).unwrap();

        for bin in &data {
            assert!((bin.norm() - 1.0 / n as f32).abs() < 1e-7);
        }
    }

    #[test]
    fn test_linearity() {
        let x = test_signal(256, 1);
        let y = test_signal(256, 2);
        let (a, b) = (0.75f32, -1.5f32);

        let mut combined: Vec<ComplexSample> = x
            .iter()
            .zip(y.iter())
            .map(|(&xi, &yi)| xi * a + yi * b)
            .collect();
        let mut fx = x.clone();
        let mut fy = y.clone();

        transform(Direction::Forward, 8, &mut combined).unwrap();
        transform(Direction::Forward, 8, &mut fx).unwrap();
        transform(Direction::Forward, 8, &mut fy).unwrap();

        let expected: Vec<ComplexSample> = fx
            .iter()
            .zip(fy.iter())
            .map(|(&xi, &yi)| xi * a + yi * b)
            .collect();

        assert!(max_error(&combined, &expected) < 1e-5);
    }

    #[test]
    fn test_matches_rustfft() {
        let n = 512;
        let input = test_signal(n, 7);

        let mut ours = input.clone();
        transform(Direction::Forward, 9, &mut ours).unwrap();

        let mut reference = input.clone();
        let mut planner = FftPlanner::<f32>::new();
        planner.plan_fft_forward(n).process(&mut reference);
        for c in reference.iter_mut() {
            *c /= n as f32;
        }

        assert!(max_error(&ours, &reference) < 1e-5);

        let mut ours_inv = input.clone();
        transform(Direction::Inverse, 9, &mut ours_inv).unwrap();

        let mut reference_inv = input;
        planner.plan_fft_inverse(n).process(&mut reference_inv);

        assert!(max_error(&ours_inv, &reference_inv) < 1e-3);
    }

    #[test]
    fn test_invalid_size_leaves_data_untouched() {
        let original = test_signal(100, 3);
        let mut data = original.clone();

        let err = transform(Direction::Forward, 7, &mut data).unwrap_err();
        assert_eq!(err, SpectrumError::InvalidSize { len: 100, exponent: 7 });
        assert_eq!(data, original);

        let mut short = test_signal(64, 4);
        assert!(transform(Direction::Forward, 7, &mut short).is_err());
        assert!(transform(Direction::Forward, 200, &mut short).is_err());
    }

    #[test]
    fn test_bit_reverse_order() {
        let mut data: Vec<ComplexSample> = (0..8).map(|i| ComplexSample::new(i as f32, 0.0)).collect();
        bit_reverse_permute(&mut data);
        let order: Vec<f32> = data.iter().map(|c| c.re).collect();
        assert_eq!(order, vec![0.0, 4.0, 2.0, 6.0, 1.0, 5.0, 3.0, 7.0]);
    }

    #[test]
    fn test_engine_sine_peak() {
        let mut engine = FftEngine::new(1024).unwrap();
        assert_eq!(engine.exponent(), 10);
        assert_eq!(engine.num_bins(), 512);

        // Exactly on bin 64
        let signal: Vec<f32> = (0..1024)
            .map(|n| (2.0 * PI * 64.0 * n as f64 / 1024.0).sin() as f32)
            .collect();

        let mut spectrum = vec![0.0f32; 512];
        engine.magnitudes(&signal, WindowType::Hanning, &mut spectrum).unwrap();

        let (peak_bin, &peak_mag) = spectrum
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
            .unwrap();

        assert_eq!(peak_bin, 64);
        // Hann coherent gain 0.5, one-sided amplitude 0.5, scaled by 1/N
        assert!((peak_mag - 0.25).abs() < 0.01);
    }

    #[test]
    fn test_engine_rejects_bad_lengths() {
        assert!(FftEngine::new(1000).is_err());

        let mut engine = FftEngine::new(64).unwrap();
        let mut out = vec![0.0f32; 32];
        assert!(engine.magnitudes(&[0.0; 32], WindowType::Hamming, &mut out).is_err());

        let mut too_many = vec![0.0f32; 65];
        assert!(engine.magnitudes(&[0.0; 64], WindowType::Hamming, &mut too_many).is_err());
    }
}
