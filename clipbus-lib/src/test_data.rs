//! Synthetic PCM sources for tests and demos.

use std::f32::consts::TAU;

use crate::pcm::PcmBuffer;

/// A buffer of zeroed samples.
pub fn silence(channels: u16, sample_rate: u32, seconds: f64) -> PcmBuffer {
    let frames = (seconds * sample_rate as f64).round().max(0.0) as usize;
    PcmBuffer::new(channels, sample_rate, vec![0.0; frames * channels as usize])
}

/// A sine tone at `frequency` Hz, duplicated across all channels.
pub fn sine(channels: u16, sample_rate: u32, frequency: f32, seconds: f64) -> PcmBuffer {
    let frames = (seconds * sample_rate as f64).round().max(0.0) as usize;
    let mut samples = Vec::with_capacity(frames * channels as usize);
    for frame in 0..frames {
        let value = (TAU * frequency * frame as f32 / sample_rate as f32).sin() * 0.8;
        for _ in 0..channels {
            samples.push(value);
        }
    }
    PcmBuffer::new(channels, sample_rate, samples)
}
