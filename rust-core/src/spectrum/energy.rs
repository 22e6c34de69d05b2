//! Energy binning
//!
//! Turns two channel magnitude spectra into per-bin instantaneous energy
//! (`left² + right²`) and collapses it into a small number of contiguous
//! bands ("fragments").

use crate::error::{Result, SpectrumError};

/// How bins are collapsed into fragments
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BandAggregation {
    /// Fragment `i` is the mean of bins `[i*w, (i+1)*w)`
    #[default]
    SubRangeMean,

    /// Fragment `i` is instantaneous bin `i` alone.
    ///
    /// Reproduces the legacy aggregation that summed bin `i` once per group
    /// member and divided by the group width. Kept for visual presets tuned
    /// against that output.
    ReferenceOuterIndex,
}

/// Per-bin instantaneous energy
///
/// `out[i] = left[i]² + right[i]²`
pub fn instantaneous_energy(left: &[f32], right: &[f32], out: &mut [f32]) -> Result<()> {
    for found in [left.len(), right.len()] {
        if found != out.len() {
            return Err(SpectrumError::LengthMismatch {
                expected: out.len(),
                found,
            });
        }
    }

    for ((e, &l), &r) in out.iter_mut().zip(left.iter()).zip(right.iter()) {
        *e = l * l + r * r;
    }

    Ok(())
}

/// Collapse `instant` into `out.len()` fragments
///
/// `out.len()` must divide `instant.len()`.
pub fn fragment_energy(instant: &[f32], out: &mut [f32], aggregation: BandAggregation) -> Result<()> {
    let fragments = out.len();
    if fragments == 0 || instant.len() % fragments != 0 {
        return Err(SpectrumError::ConfigurationMismatch {
            bins: instant.len(),
            fragments,
        });
    }
    let width = instant.len() / fragments;

    match aggregation {
        BandAggregation::SubRangeMean => {
            for (frag, group) in out.iter_mut().zip(instant.chunks_exact(width)) {
                *frag = group.iter().sum::<f32>() / width as f32;
            }
        }
        BandAggregation::ReferenceOuterIndex => {
            out.copy_from_slice(&instant[..fragments]);
        }
    }

    Ok(())
}

/// Stateful binning stage with preallocated buffers
pub struct EnergyBinner {
    instant: Vec<f32>,
    fragments: Vec<f32>,
    aggregation: BandAggregation,
}

impl EnergyBinner {
    /// Create binner for `bins` spectrum bins collapsed into `fragments` bands
    pub fn new(bins: usize, fragments: usize, aggregation: BandAggregation) -> Result<Self> {
        if bins == 0 || fragments == 0 || bins % fragments != 0 {
            return Err(SpectrumError::ConfigurationMismatch { bins, fragments });
        }

        Ok(Self {
            instant: vec![0.0; bins],
            fragments: vec![0.0; fragments],
            aggregation,
        })
    }

    /// Recompute both energy arrays from the channel spectra
    ///
    /// # Returns
    /// The fragment energy array, overwritten on every call
    pub fn process(&mut self, left: &[f32], right: &[f32]) -> Result<&[f32]> {
        instantaneous_energy(left, right, &mut self.instant)?;
        fragment_energy(&self.instant, &mut self.fragments, self.aggregation)?;
        Ok(&self.fragments)
    }

    pub fn instant_energy(&self) -> &[f32] {
        &self.instant
    }

    pub fn fragment_energy(&self) -> &[f32] {
        &self.fragments
    }

    pub fn aggregation(&self) -> BandAggregation {
        self.aggregation
    }

    /// Number of bins averaged into each fragment
    pub fn fragment_width(&self) -> usize {
        self.instant.len() / self.fragments.len()
    }
}
