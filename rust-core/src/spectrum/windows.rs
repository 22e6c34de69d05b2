//! Window functions for spectral analysis
//!
//! Each window scales the real part of a sample by a weight that depends only
//! on the sample position `n` and the frame length. The imaginary part is left
//! untouched.

use std::f64::consts::PI;

use num_complex::Complex;

use crate::error::{Result, SpectrumError};

/// Window function types
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum WindowType {
    /// w[n] = 0.54 - 0.46*cos(2πn/(N-1))
    Hamming,

    /// w[n] = 0.5*(1 - cos(2πn/(N-1)))
    Hanning,

    /// w[n] = 1 - ((n - h)/h)², h = (N-1)/2 truncated
    Welch,

    /// Four-term Blackman-Harris, sidelobes around -92 dB
    #[default]
    BlackmanHarris,

    /// Four-term Blackman-Nuttall
    BlackmanNuttall,

    /// w[n] = cos(πn/(N-1) - π/2)
    Cosine,

    /// |1 - (n - h)/b| with b = N/2
    TriangularA,

    /// |1 - (n - h)/b| with b = (N+1)/2
    TriangularB,

    /// |1 - (n - h)/b| with b = (N-1)/2
    TriangularC,
}

impl WindowType {
    pub const ALL: [WindowType; 9] = [
        WindowType::Hamming,
        WindowType::Hanning,
        WindowType::Welch,
        WindowType::BlackmanHarris,
        WindowType::BlackmanNuttall,
        WindowType::Cosine,
        WindowType::TriangularA,
        WindowType::TriangularB,
        WindowType::TriangularC,
    ];

    /// Smallest frame for which the weight is defined.
    ///
    /// Welch and TriangularC divide by the truncated half width `(N-1)/2`,
    /// which is zero for a two-sample frame.
    pub fn min_frame_size(&self) -> usize {
        match self {
            WindowType::Welch | WindowType::TriangularC => 3,
            _ => 2,
        }
    }

    /// Weight of sample `n` in a frame of `frame_size` samples
    ///
    /// All half-width terms use truncating integer division, so the
    /// Welch and triangular windows are slightly asymmetric for even frame
    /// sizes.
    pub fn weight(&self, n: usize, frame_size: usize) -> Result<f64> {
        if frame_size < self.min_frame_size() {
            return Err(SpectrumError::DegenerateFrame {
                frame_size,
                window: *self,
            });
        }

        let size = frame_size as i64;
        let pos = n as f64;
        let span = (frame_size - 1) as f64;
        // Offset from the truncated frame centre
        let centred = (n as i64 - (size - 1) / 2) as f64;

        let w = match self {
            WindowType::Hamming => 0.54 - 0.46 * (2.0 * PI * pos / span).cos(),
            WindowType::Hanning => 0.5 * (1.0 - (2.0 * PI * pos / span).cos()),
            WindowType::Welch => {
                let half = ((size - 1) / 2) as f64;
                1.0 - (centred / half) * (centred / half)
            }
            WindowType::BlackmanHarris => {
                0.35875 - 0.48829 * (2.0 * PI * pos / span).cos()
                    + 0.14128 * (4.0 * PI * pos / span).cos()
                    - 0.01168 * (6.0 * PI * pos / span).cos()
            }
            WindowType::BlackmanNuttall => {
                0.355768 - 0.487396 * (2.0 * PI * pos / span).cos()
                    + 0.144232 * (4.0 * PI * pos / span).cos()
                    - 0.012604 * (6.0 * PI * pos / span).cos()
            }
            WindowType::Cosine => (PI * pos / span - PI / 2.0).cos(),
            WindowType::TriangularA => triangular(centred, (size / 2) as f64),
            WindowType::TriangularB => triangular(centred, ((size + 1) / 2) as f64),
            WindowType::TriangularC => triangular(centred, ((size - 1) / 2) as f64),
        };

        Ok(w)
    }

    /// Multiply the real part of `sample` by the weight at position `n`
    pub fn apply(&self, sample: &mut Complex<f32>, n: usize, frame_size: usize) -> Result<()> {
        let w = self.weight(n, frame_size)?;
        sample.re = (sample.re as f64 * w) as f32;
        Ok(())
    }
}

fn triangular(centred: f64, width: f64) -> f64 {
    (1.0 - centred / width).abs()
}

/// Apply window in-place across a whole frame
///
/// The frame size is the slice length. Fails before touching any sample if
/// the frame is too short for the window.
pub fn apply_window(frame: &mut [Complex<f32>], window: WindowType) -> Result<()> {
    let frame_size = frame.len();
    if frame_size < window.min_frame_size() {
        return Err(SpectrumError::DegenerateFrame { frame_size, window });
    }

    for (n, sample) in frame.iter_mut().enumerate() {
        window.apply(sample, n, frame_size)?;
    }

    Ok(())
}
