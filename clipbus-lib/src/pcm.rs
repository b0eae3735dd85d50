//! Decoded PCM audio held in memory.

/// An immutable block of interleaved `f32` samples.
///
/// Buffers are shared between clips and one-shot queues behind an `Arc`, so
/// playing the same source many times never copies the sample data.
#[derive(Debug, Clone)]
pub struct PcmBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl PcmBuffer {
    /// Wrap interleaved samples.
    ///
    /// # Arguments
    ///
    /// * `channels` - Interleaved channel count, clamped to at least 1.
    /// * `sample_rate` - Frames per second, clamped to at least 1.
    /// * `samples` - Interleaved sample data.
    pub fn new(channels: u16, sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate: sample_rate.max(1),
        }
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Number of whole frames (one sample per channel).
    pub fn frame_count(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Total length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        self.frame_count() as f64 / self.sample_rate as f64
    }

    /// Interleaved sample index of the frame nearest `seconds`, clamped to
    /// the end of the buffer.
    pub fn sample_index_at(&self, seconds: f64) -> usize {
        if !seconds.is_finite() || seconds <= 0.0 {
            return 0;
        }
        let frame = (seconds * self.sample_rate as f64) as usize;
        frame.min(self.frame_count()) * self.channels as usize
    }
}
