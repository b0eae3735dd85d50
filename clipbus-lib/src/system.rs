//! Root playback context.
//!
//! An `AudioSystem` ties one backend, one [`Ticker`] and one [`Clock`]
//! together and owns their lifecycle. Everything else (buses, channels,
//! clips) borrows these pieces from the system, so two systems in one
//! process stay fully independent.

use std::sync::Arc;

use log::warn;

use crate::backend::rodio::RodioBackend;
use crate::backend::SharedBackend;
use crate::clock::Clock;
use crate::ticker::Ticker;

pub struct AudioSystem {
    backend: SharedBackend,
    ticker: Ticker,
    clock: Clock,
}

impl AudioSystem {
    /// Build a system over the given backend: asks the backend clock to
    /// start, registers the smoothed clock, and spawns the frame thread.
    ///
    /// A backend that fails to resume is tolerated; playback positions stay
    /// at zero until a later [`AudioSystem::resume`] succeeds.
    pub fn new(backend: SharedBackend) -> Self {
        let ticker = Ticker::new();
        let clock = Clock::new(backend.clone());
        if !backend.resume() {
            warn!("audio clock is suspended; playback positions stay at zero until resume succeeds");
        }
        clock.start(&ticker);
        ticker.start();
        Self {
            backend,
            ticker,
            clock,
        }
    }

    /// System playing through the default output device.
    pub fn default_output() -> Self {
        Self::new(Arc::new(RodioBackend::new()))
    }

    /// Retry starting the backend clock. Safe to call at any time.
    pub fn resume(&self) -> bool {
        let resumed = self.backend.resume();
        if !resumed {
            warn!("audio backend did not resume; will try again on the next call");
        }
        resumed
    }

    pub fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    pub fn ticker(&self) -> &Ticker {
        &self.ticker
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Halt the frame thread. Clips and queues stop advancing but keep
    /// their state.
    pub fn shutdown(&self) {
        self.ticker.stop();
    }
}

impl Drop for AudioSystem {
    fn drop(&mut self) {
        self.ticker.stop();
    }
}
