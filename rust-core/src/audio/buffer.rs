//! Lock-free ring buffer for interleaved audio samples
//!
//! The producer end is handed to whatever captures or synthesises audio; the
//! consumer end is drained by [`WaveformSource`](super::source::WaveformSource).
//! Writes and reads always move whole frames (one sample per channel).

use ringbuf::{HeapConsumer, HeapProducer, HeapRb};

use crate::error::{Result, SpectrumError};

/// Interleaved sample ring buffer
pub struct SampleRingBuffer {
    producer: HeapProducer<f32>,
    consumer: HeapConsumer<f32>,
    channels: usize,
}

impl SampleRingBuffer {
    /// Create new ring buffer
    ///
    /// # Arguments
    /// * `channels` - Samples per interleaved frame
    /// * `capacity_frames` - Buffer capacity in frames
    pub fn new(channels: usize, capacity_frames: usize) -> Result<Self> {
        if channels == 0 || capacity_frames == 0 {
            return Err(SpectrumError::InvalidConfig(format!(
                "ring buffer needs at least one channel and one frame (got {} channels, {} frames)",
                channels, capacity_frames
            )));
        }

        let capacity = channels.checked_mul(capacity_frames).ok_or_else(|| {
            SpectrumError::InvalidConfig(format!(
                "ring buffer of {} frames x {} channels is too large",
                capacity_frames, channels
            ))
        })?;

        let rb = HeapRb::<f32>::new(capacity);
        let (producer, consumer) = rb.split();

        Ok(Self {
            producer,
            consumer,
            channels,
        })
    }

    /// Split into producer and consumer ends
    pub fn split(self) -> (SampleProducer, SampleConsumer) {
        (
            SampleProducer {
                producer: self.producer,
                channels: self.channels,
            },
            SampleConsumer {
                consumer: self.consumer,
                channels: self.channels,
            },
        )
    }
}

/// Producer end (for writing)
pub struct SampleProducer {
    producer: HeapProducer<f32>,
    channels: usize,
}

impl SampleProducer {
    /// Write interleaved samples
    ///
    /// Only whole frames are written; a trailing partial frame and anything
    /// that does not fit are dropped.
    ///
    /// # Returns
    /// Number of samples actually written
    pub fn write(&mut self, interleaved: &[f32]) -> usize {
        let room = self.producer.free_len() / self.channels * self.channels;
        let whole = interleaved.len() / self.channels * self.channels;
        let len = room.min(whole);
        self.producer.push_slice(&interleaved[..len])
    }

    /// Number of whole frames that can still be written
    pub fn free_frames(&self) -> usize {
        self.producer.free_len() / self.channels
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}

/// Consumer end (for reading)
pub struct SampleConsumer {
    consumer: HeapConsumer<f32>,
    channels: usize,
}

impl SampleConsumer {
    /// Read whole frames into `buffer`
    ///
    /// # Returns
    /// Number of samples read, always a multiple of the channel count
    pub fn read(&mut self, buffer: &mut [f32]) -> usize {
        let len = self.available_frames().min(buffer.len() / self.channels) * self.channels;
        self.consumer.pop_slice(&mut buffer[..len])
    }

    /// Number of whole frames waiting
    pub fn available_frames(&self) -> usize {
        self.consumer.len() / self.channels
    }

    pub fn is_empty(&self) -> bool {
        self.consumer.is_empty()
    }

    pub fn channels(&self) -> usize {
        self.channels
    }
}
