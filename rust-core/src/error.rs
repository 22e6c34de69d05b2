//! Error types for the spectrum pipeline

use crate::spectrum::windows::WindowType;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpectrumError {
    #[error("FFT buffer holds {len} samples but exponent {exponent} requires a power-of-two length of 2^{exponent}")]
    InvalidSize { len: usize, exponent: u32 },

    #[error("{window:?} window is undefined for a frame of {frame_size} samples")]
    DegenerateFrame { frame_size: usize, window: WindowType },

    #[error("{fragments} fragments do not evenly divide {bins} spectrum bins")]
    ConfigurationMismatch { bins: usize, fragments: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Channel {channel} requested but the source carries {channels} channel(s)")]
    ChannelOutOfRange { channel: usize, channels: usize },

    #[error("Expected a buffer of {expected} values, found {found}")]
    LengthMismatch { expected: usize, found: usize },
}

pub type Result<T> = std::result::Result<T, SpectrumError>;
