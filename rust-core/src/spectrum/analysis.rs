//! High-level spectrum pipeline
//!
//! Pulls two channel spectra from a [`SpectrumSource`], bins them into bands
//! and smooths the bands over time.

use super::energy::{BandAggregation, EnergyBinner};
use super::history::{EnergyHistory, WarmupNormalization};
use super::windows::WindowType;
use crate::audio::source::SpectrumSource;
use crate::error::{Result, SpectrumError};

/// Spectrum pipeline configuration
#[derive(Debug, Clone, PartialEq)]
pub struct SpectrumConfig {
    /// Source channel read as "left"
    pub left_channel: usize,

    /// Source channel read as "right"
    pub right_channel: usize,

    /// Window the source analyses with
    pub window: WindowType,

    /// Magnitude bins requested per channel
    pub fft_size: usize,

    /// Output bands; must divide `fft_size`
    pub fragment_count: usize,

    /// Snapshots averaged (43 is about 0.7 s at 60 updates per second)
    pub history_capacity: usize,

    pub aggregation: BandAggregation,

    pub warmup: WarmupNormalization,
}

impl Default for SpectrumConfig {
    fn default() -> Self {
        Self {
            left_channel: 0,
            right_channel: 1,
            window: WindowType::BlackmanHarris,
            fft_size: 512,
            fragment_count: 64,
            history_capacity: 43,
            aggregation: BandAggregation::SubRangeMean,
            warmup: WarmupNormalization::FixedCapacity,
        }
    }
}

impl SpectrumConfig {
    /// Check the size invariants of the pipeline
    pub fn validate(&self) -> Result<()> {
        if self.fft_size == 0 {
            return Err(SpectrumError::InvalidConfig(
                "fft_size must be at least 1".to_string(),
            ));
        }
        if self.fragment_count == 0 || self.fft_size % self.fragment_count != 0 {
            return Err(SpectrumError::ConfigurationMismatch {
                bins: self.fft_size,
                fragments: self.fragment_count,
            });
        }
        if self.history_capacity == 0 {
            return Err(SpectrumError::InvalidConfig(
                "history_capacity must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Bins averaged into each band
    pub fn fragment_width(&self) -> usize {
        self.fft_size / self.fragment_count
    }

    /// Check the channel selection and bin count against what `source`
    /// reports. Sources that report nothing are accepted as is.
    pub fn validate_source<S: SpectrumSource + ?Sized>(&self, source: &S) -> Result<()> {
        if let Some(channels) = source.channel_count() {
            for channel in [self.left_channel, self.right_channel] {
                if channel >= channels {
                    return Err(SpectrumError::ChannelOutOfRange { channel, channels });
                }
            }
        }
        if let Some(bins) = source.bin_count() {
            if bins != self.fft_size {
                return Err(SpectrumError::LengthMismatch {
                    expected: bins,
                    found: self.fft_size,
                });
            }
        }
        Ok(())
    }
}

/// Smoothed, banded energy spectrum of a stereo source
///
/// Call [`AudioSpectrum::update`] exactly once per displayed frame. Every call
/// pushes a snapshot into the history, so extra calls shorten the effective
/// smoothing window.
pub struct AudioSpectrum<S> {
    source: S,
    config: SpectrumConfig,
    left: Vec<f32>,
    right: Vec<f32>,

    /// Filled by the source first, swapped in once both channels succeed
    incoming_left: Vec<f32>,
    incoming_right: Vec<f32>,

    binner: EnergyBinner,
    history: EnergyHistory,
}

impl<S: SpectrumSource> AudioSpectrum<S> {
    /// Create pipeline over `source`
    ///
    /// # Errors
    /// [`SpectrumError::ConfigurationMismatch`] if the fragment count does not
    /// divide the bin count, [`SpectrumError::InvalidConfig`] for empty sizes,
    /// [`SpectrumError::ChannelOutOfRange`] or [`SpectrumError::LengthMismatch`]
    /// if the source cannot serve the configured channels or bin count.
    pub fn new(source: S, config: SpectrumConfig) -> Result<Self> {
        config.validate()?;
        config.validate_source(&source)?;

        let binner = EnergyBinner::new(config.fft_size, config.fragment_count, config.aggregation)?;
        let history = EnergyHistory::new(config.fragment_count, config.history_capacity, config.warmup)?;

        log::debug!(
            "Audio spectrum: {} bins -> {} bands, {} snapshot history, {:?} window",
            config.fft_size,
            config.fragment_count,
            config.history_capacity,
            config.window
        );

        Ok(Self {
            source,
            left: vec![0.0; config.fft_size],
            right: vec![0.0; config.fft_size],
            incoming_left: vec![0.0; config.fft_size],
            incoming_right: vec![0.0; config.fft_size],
            binner,
            history,
            config,
        })
    }

    /// Pull fresh spectra from the source and advance the pipeline one frame
    ///
    /// # Returns
    /// Averaged energy per band. The slice is owned by the pipeline and
    /// overwritten on the next update; copy it to keep a snapshot.
    ///
    /// If the source fails, the pipeline state is left as of the previous
    /// update.
    pub fn update(&mut self) -> Result<&[f32]> {
        self.source.fill_spectrum(
            self.config.left_channel,
            self.config.window,
            &mut self.incoming_left,
        )?;
        self.source.fill_spectrum(
            self.config.right_channel,
            self.config.window,
            &mut self.incoming_right,
        )?;
        std::mem::swap(&mut self.left, &mut self.incoming_left);
        std::mem::swap(&mut self.right, &mut self.incoming_right);

        let fragments = self.binner.process(&self.left, &self.right)?;
        self.history.push(fragments)?;

        log::trace!("Spectrum update: {} snapshots in history", self.history.len());

        Ok(self.history.averaged())
    }

    /// Latest averaged energy per band, without advancing
    pub fn averaged(&self) -> &[f32] {
        self.history.averaged()
    }

    /// Channel spectra read by the last update
    pub fn channel_spectra(&self) -> (&[f32], &[f32]) {
        (&self.left, &self.right)
    }

    /// Instantaneous per-bin energy of the last update
    pub fn instant_energy(&self) -> &[f32] {
        self.binner.instant_energy()
    }

    /// Per-band energy of the last update, before smoothing
    pub fn fragment_energy(&self) -> &[f32] {
        self.binner.fragment_energy()
    }

    /// Snapshots currently held in the history
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Discard the smoothing history
    pub fn reset(&mut self) {
        self.history.clear();
    }

    /// Update configuration
    ///
    /// Channel and window changes take effect on the next update. Any size or
    /// policy change rebuilds the pipeline and clears the history.
    pub fn update_config(&mut self, config: SpectrumConfig) -> Result<()> {
        config.validate()?;
        config.validate_source(&self.source)?;

        let needs_rebuild = config.fft_size != self.config.fft_size
            || config.fragment_count != self.config.fragment_count
            || config.history_capacity != self.config.history_capacity
            || config.aggregation != self.config.aggregation
            || config.warmup != self.config.warmup;

        if needs_rebuild {
            self.binner = EnergyBinner::new(config.fft_size, config.fragment_count, config.aggregation)?;
            self.history =
                EnergyHistory::new(config.fragment_count, config.history_capacity, config.warmup)?;
            self.left = vec![0.0; config.fft_size];
            self.right = vec![0.0; config.fft_size];
            self.incoming_left = vec![0.0; config.fft_size];
            self.incoming_right = vec![0.0; config.fft_size];
            log::debug!("Spectrum pipeline rebuilt, history cleared");
        }

        self.config = config;
        Ok(())
    }

    /// Get current configuration
    pub fn config(&self) -> &SpectrumConfig {
        &self.config
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::source::WaveformSource;

    /// Source that returns the same magnitude in every bin, per channel
    struct FlatSource {
        levels: Vec<f32>,
        calls: usize,
    }

    impl SpectrumSource for FlatSource {
        fn fill_spectrum(&mut self, channel: usize, _window: WindowType, out: &mut [f32]) -> Result<()> {
            let level = *self.levels.get(channel).ok_or(SpectrumError::ChannelOutOfRange {
                channel,
                channels: self.levels.len(),
            })?;
            out.fill(level);
            self.calls += 1;
            Ok(())
        }
    }

    fn flat(levels: &[f32]) -> FlatSource {
        FlatSource {
            levels: levels.to_vec(),
            calls: 0,
        }
    }

    #[test]
    fn test_default_config() {
        let config = SpectrumConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.fragment_width(), 8);
        assert_eq!(config.window, WindowType::BlackmanHarris);
        assert_eq!((config.left_channel, config.right_channel), (0, 1));
    }

    #[test]
    fn test_rejects_mismatched_fragments() {
        let config = SpectrumConfig {
            fragment_count: 48,
            ..SpectrumConfig::default()
        };
        assert!(matches!(
            AudioSpectrum::new(flat(&[1.0, 1.0]), config),
            Err(SpectrumError::ConfigurationMismatch { bins: 512, fragments: 48 })
        ));
    }

    #[test]
    fn test_rejects_empty_history() {
        let config = SpectrumConfig {
            history_capacity: 0,
            ..SpectrumConfig::default()
        };
        assert!(matches!(
            AudioSpectrum::new(flat(&[1.0, 1.0]), config),
            Err(SpectrumError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_one_source_call_per_channel() {
        let mut spectrum = AudioSpectrum::new(flat(&[1.0, 2.0]), SpectrumConfig::default()).unwrap();
        spectrum.update().unwrap();

        assert_eq!(spectrum.source().calls, 2);
        assert_eq!(spectrum.history_len(), 1);
        assert!(spectrum.instant_energy().iter().all(|&e| e == 5.0));
        assert!(spectrum.fragment_energy().iter().all(|&e| e == 5.0));
    }

    #[test]
    fn test_channel_selection() {
        let config = SpectrumConfig {
            left_channel: 2,
            right_channel: 2,
            warmup: WarmupNormalization::SnapshotCount,
            ..SpectrumConfig::default()
        };
        let mut spectrum = AudioSpectrum::new(flat(&[0.0, 0.0, 3.0]), config).unwrap();
        let out = spectrum.update().unwrap();
        assert!(out.iter().all(|&e| e == 18.0));
    }

    #[test]
    fn test_source_errors_propagate() {
        let mut spectrum = AudioSpectrum::new(flat(&[1.0]), SpectrumConfig::default()).unwrap();
        assert_eq!(
            spectrum.update().unwrap_err(),
            SpectrumError::ChannelOutOfRange { channel: 1, channels: 1 }
        );
        assert_eq!(spectrum.history_len(), 0);
    }

    #[test]
    fn test_update_config_rebuilds_on_size_change() {
        let mut spectrum = AudioSpectrum::new(flat(&[1.0, 1.0]), SpectrumConfig::default()).unwrap();
        spectrum.update().unwrap();
        spectrum.update().unwrap();

        // Window change keeps history
        let config = SpectrumConfig {
            window: WindowType::Welch,
            ..SpectrumConfig::default()
        };
        spectrum.update_config(config.clone()).unwrap();
        assert_eq!(spectrum.history_len(), 2);

        let resized = SpectrumConfig {
            fft_size: 256,
            fragment_count: 32,
            ..config
        };
        spectrum.update_config(resized).unwrap();
        assert_eq!(spectrum.history_len(), 0);

        let out = spectrum.update().unwrap();
        assert_eq!(out.len(), 32);

        let bad = SpectrumConfig {
            fragment_count: 3,
            ..SpectrumConfig::default()
        };
        assert!(spectrum.update_config(bad).is_err());
        assert_eq!(spectrum.config().fft_size, 256);
    }

    #[test]
    fn test_reset_clears_history() {
        let mut spectrum = AudioSpectrum::new(flat(&[1.0, 1.0]), SpectrumConfig::default()).unwrap();
        spectrum.update().unwrap();
        spectrum.reset();

        assert_eq!(spectrum.history_len(), 0);
        assert!(spectrum.averaged().iter().all(|&e| e == 0.0));
    }

    #[test]
    fn test_rejects_source_without_configured_channel() {
        let (source, _producer) = WaveformSource::new(1, 512, 4096).unwrap();
        assert!(matches!(
            AudioSpectrum::new(source, SpectrumConfig::default()),
            Err(SpectrumError::ChannelOutOfRange { channel: 1, channels: 1 })
        ));

        let (mono, _producer) = WaveformSource::new(1, 512, 4096).unwrap();
        let config = SpectrumConfig {
            right_channel: 0,
            ..SpectrumConfig::default()
        };
        assert!(AudioSpectrum::new(mono, config).is_ok());
    }

    #[test]
    fn test_rejects_source_with_other_bin_count() {
        let (source, _producer) = WaveformSource::new(2, 256, 4096).unwrap();
        assert!(matches!(
            AudioSpectrum::new(source, SpectrumConfig::default()),
            Err(SpectrumError::LengthMismatch { expected: 256, found: 512 })
        ));
    }

    #[test]
    fn test_update_config_checks_source() {
        let (source, _producer) = WaveformSource::new(2, 512, 4096).unwrap();
        let mut spectrum = AudioSpectrum::new(source, SpectrumConfig::default()).unwrap();
        spectrum.update().unwrap();

        let resized = SpectrumConfig {
            fft_size: 256,
            fragment_count: 32,
            ..SpectrumConfig::default()
        };
        assert_eq!(
            spectrum.update_config(resized),
            Err(SpectrumError::LengthMismatch { expected: 512, found: 256 })
        );

        let moved = SpectrumConfig {
            right_channel: 5,
            ..SpectrumConfig::default()
        };
        assert_eq!(
            spectrum.update_config(moved),
            Err(SpectrumError::ChannelOutOfRange { channel: 5, channels: 2 })
        );

        // Rejected changes leave the pipeline running as before
        assert_eq!(spectrum.config(), &SpectrumConfig::default());
        assert_eq!(spectrum.history_len(), 1);
        assert!(spectrum.update().is_ok());
    }

    #[test]
    fn test_failed_update_keeps_previous_spectra() {
        let mut spectrum = AudioSpectrum::new(flat(&[1.0, 2.0]), SpectrumConfig::default()).unwrap();
        spectrum.update().unwrap();

        // Left succeeds, right fails
        spectrum.source_mut().levels = vec![9.0];
        assert!(spectrum.update().is_err());

        let (left, right) = spectrum.channel_spectra();
        assert!(left.iter().all(|&m| m == 1.0));
        assert!(right.iter().all(|&m| m == 2.0));
        assert!(spectrum.instant_energy().iter().all(|&e| e == 5.0));
        assert_eq!(spectrum.history_len(), 1);
    }

    #[test]
    fn test_borrowed_source() {
        let mut source = flat(&[1.0, 1.0]);
        {
            let mut spectrum = AudioSpectrum::new(&mut source, SpectrumConfig::default()).unwrap();
            spectrum.update().unwrap();
        }
        assert_eq!(source.calls, 2);
    }
}
