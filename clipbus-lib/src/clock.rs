//! Drift-corrected playback clock.
//!
//! Wall time (a monotonic `Instant`) has good resolution but is not the time
//! base audio is rendered against; the backend's hardware clock is, but it
//! advances in coarse quanta. The clock samples the offset between the two
//! every frame into a bounded window and publishes `wall - mean(offsets)`,
//! which follows the hardware clock while moving as smoothly as wall time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Instant;

use dasp_ring_buffer::Bounded;

use crate::backend::{ClockState, SharedBackend};
use crate::constants::CLOCK_WINDOW_LEN;
use crate::ticker::{CallbackId, Ticker};

struct OffsetWindow {
    offsets: Bounded<Vec<f64>>,
    sum: f64,
}

/// Cloneable handle to one smoothed clock.
///
/// Reads never block: the published time is refreshed once per frame and
/// stays at `0.0` until the backend clock starts running.
#[derive(Clone)]
pub struct Clock {
    backend: SharedBackend,
    epoch: Instant,
    window: Arc<Mutex<OffsetWindow>>,
    current_time_bits: Arc<AtomicU64>,
    registration: Arc<Mutex<Option<CallbackId>>>,
}

impl Clock {
    pub fn new(backend: SharedBackend) -> Self {
        Self {
            backend,
            epoch: Instant::now(),
            window: Arc::new(Mutex::new(OffsetWindow {
                offsets: Bounded::from(vec![0.0; CLOCK_WINDOW_LEN]),
                sum: 0.0,
            })),
            current_time_bits: Arc::new(AtomicU64::new(0)),
            registration: Arc::new(Mutex::new(None)),
        }
    }

    /// Smoothed playback position of the hardware clock, in seconds.
    pub fn current_time(&self) -> f64 {
        f64::from_bits(self.current_time_bits.load(Ordering::Relaxed))
    }

    /// Register the per-frame offset sampling. Does nothing when already
    /// registered.
    pub(crate) fn start(&self, ticker: &Ticker) {
        let mut registration = self.registration.lock().unwrap();
        if registration.is_some() {
            return;
        }
        let this = self.clone();
        *registration = Some(ticker.add(move || this.tick_once()));
    }

    fn tick_once(&self) {
        if self.backend.clock_state() != ClockState::Running {
            return;
        }
        let hardware_now = self.backend.clock_seconds();
        let wall_now = self.epoch.elapsed().as_secs_f64();
        self.observe(wall_now, hardware_now);
    }

    /// Fold one `(wall, hardware)` clock pair into the window and republish
    /// the smoothed time.
    pub(crate) fn observe(&self, wall_now: f64, hardware_now: f64) {
        let delta = wall_now - hardware_now;
        let mut window = self.window.lock().unwrap();
        if let Some(evicted) = window.offsets.push(delta) {
            window.sum -= evicted;
        }
        window.sum += delta;
        let mean = window.sum / window.offsets.len() as f64;
        let current = wall_now - mean;
        self.current_time_bits
            .store(current.to_bits(), Ordering::Relaxed);
    }
}
