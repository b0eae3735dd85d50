//! Shared constants for scheduling and clock smoothing.

use std::time::Duration;

/// Target dispatch rate of the frame ticker, in frames per second.
pub const FRAME_RATE: u64 = 60;

/// Sleep interval between ticker frames.
pub const FRAME_INTERVAL: Duration = Duration::from_micros(1_000_000 / FRAME_RATE);

/// Number of offset samples averaged by the playback clock.
pub const CLOCK_WINDOW_LEN: usize = 60;
