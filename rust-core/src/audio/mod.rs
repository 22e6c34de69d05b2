//! Audio sample hand-off and spectrum sources

pub mod buffer;
pub mod source;

pub use buffer::{SampleConsumer, SampleProducer, SampleRingBuffer};
pub use source::{SpectrumSource, WaveformSource};
