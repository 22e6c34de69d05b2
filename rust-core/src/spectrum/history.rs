//! Temporal smoothing over a fixed window of fragment-energy snapshots
//!
//! Snapshots are copied into an owned ring of fixed-size slots, so callers
//! may reuse and overwrite their fragment buffer between cycles.

use crate::error::{Result, SpectrumError};

/// Divisor used while the history is still filling
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WarmupNormalization {
    /// Always divide by the capacity. Output ramps up from zero until the
    /// history is full.
    #[default]
    FixedCapacity,

    /// Divide by the number of snapshots currently held
    SnapshotCount,
}

/// Rolling history of fragment-energy snapshots
pub struct EnergyHistory {
    /// `capacity` slots of `bands` values, stored back to back
    slots: Vec<f32>,

    /// Averaged output, overwritten on every push
    averaged: Vec<f32>,

    bands: usize,
    capacity: usize,

    /// Slot the next snapshot is written to
    cursor: usize,

    /// Number of snapshots held (<= capacity)
    len: usize,

    normalization: WarmupNormalization,
}

impl EnergyHistory {
    /// Create an empty history
    ///
    /// # Arguments
    /// * `bands` - Values per snapshot
    /// * `capacity` - Snapshots kept before the oldest is evicted
    /// * `normalization` - Divisor policy during warm-up
    pub fn new(bands: usize, capacity: usize, normalization: WarmupNormalization) -> Result<Self> {
        if bands == 0 {
            return Err(SpectrumError::InvalidConfig(
                "history needs at least one band".to_string(),
            ));
        }
        if capacity == 0 {
            return Err(SpectrumError::InvalidConfig(
                "history capacity must be at least 1".to_string(),
            ));
        }

        let total = bands.checked_mul(capacity).ok_or_else(|| {
            SpectrumError::InvalidConfig(format!(
                "history of {} snapshots x {} bands is too large",
                capacity, bands
            ))
        })?;

        Ok(Self {
            slots: vec![0.0; total],
            averaged: vec![0.0; bands],
            bands,
            capacity,
            cursor: 0,
            len: 0,
            normalization,
        })
    }

    /// Append a snapshot, evicting the oldest once full, and recompute the
    /// per-band average
    ///
    /// # Returns
    /// The averaged energy array, overwritten on every call
    pub fn push(&mut self, snapshot: &[f32]) -> Result<&[f32]> {
        if snapshot.len() != self.bands {
            return Err(SpectrumError::LengthMismatch {
                expected: self.bands,
                found: snapshot.len(),
            });
        }

        let start = self.cursor * self.bands;
        self.slots[start..start + self.bands].copy_from_slice(snapshot);
        self.cursor = (self.cursor + 1) % self.capacity;
        self.len = (self.len + 1).min(self.capacity);

        self.recompute();
        Ok(&self.averaged)
    }

    fn recompute(&mut self) {
        let divisor = match self.normalization {
            WarmupNormalization::FixedCapacity => self.capacity,
            WarmupNormalization::SnapshotCount => self.len,
        } as f32;

        // Oldest first, matching the order snapshots arrived in
        let oldest = if self.len < self.capacity { 0 } else { self.cursor };

        self.averaged.fill(0.0);
        for age in 0..self.len {
            let slot = (oldest + age) % self.capacity;
            let values = &self.slots[slot * self.bands..(slot + 1) * self.bands];
            for (acc, &v) in self.averaged.iter_mut().zip(values.iter()) {
                *acc += v;
            }
        }

        if self.len > 0 {
            for acc in self.averaged.iter_mut() {
                *acc /= divisor;
            }
        }
    }

    /// Latest averaged energy
    pub fn averaged(&self) -> &[f32] {
        &self.averaged
    }

    /// Snapshot by age, 0 being the oldest held
    pub fn snapshot(&self, age: usize) -> Option<&[f32]> {
        if age >= self.len {
            return None;
        }
        let oldest = if self.len < self.capacity { 0 } else { self.cursor };
        let slot = (oldest + age) % self.capacity;
        Some(&self.slots[slot * self.bands..(slot + 1) * self.bands])
    }

    /// Drop all snapshots and zero the output
    pub fn clear(&mut self) {
        self.slots.fill(0.0);
        self.averaged.fill(0.0);
        self.cursor = 0;
        self.len = 0;
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn bands(&self) -> usize {
        self.bands
    }

    pub fn normalization(&self) -> WarmupNormalization {
        self.normalization
    }
}
