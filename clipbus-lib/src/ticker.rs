//! Per-frame callback dispatch.
//!
//! A `Ticker` owns an ordered registry of recurring callbacks and a queue of
//! run-once callbacks, and dispatches both from a frame thread that targets
//! [`crate::constants::FRAME_RATE`] frames per second. `tick` is public so
//! tests and headless hosts can drive frames by hand instead.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use log::warn;

use crate::constants::FRAME_INTERVAL;

/// Registration token returned by [`Ticker::add`], required by
/// [`Ticker::remove`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CallbackId(u64);

type TickFn = Arc<Mutex<dyn FnMut() + Send>>;
type OnceFn = Box<dyn FnOnce() + Send>;

struct FrameThread {
    alive: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

/// Cloneable handle to one frame dispatcher.
///
/// Clones share the registry and the frame thread. Dispatch order follows
/// registration order, and callbacks registered or removed during a frame
/// take effect within that same frame: a removed callback no longer runs,
/// a new callback first runs on the next frame.
#[derive(Clone)]
pub struct Ticker {
    callbacks: Arc<Mutex<Vec<(CallbackId, TickFn)>>>,
    once_queue: Arc<Mutex<Vec<OnceFn>>>,
    next_id: Arc<AtomicU64>,
    frame: Arc<Mutex<Option<FrameThread>>>,
    frame_interval: Duration,
}

impl Ticker {
    pub fn new() -> Self {
        Self::with_interval(FRAME_INTERVAL)
    }

    /// Ticker with a custom frame interval.
    pub fn with_interval(frame_interval: Duration) -> Self {
        Self {
            callbacks: Arc::new(Mutex::new(Vec::new())),
            once_queue: Arc::new(Mutex::new(Vec::new())),
            next_id: Arc::new(AtomicU64::new(0)),
            frame: Arc::new(Mutex::new(None)),
            frame_interval,
        }
    }

    /// Register a recurring callback and return its removal token.
    pub fn add(&self, callback: impl FnMut() + Send + 'static) -> CallbackId {
        let id = CallbackId(self.next_id.fetch_add(1, Ordering::SeqCst));
        let hook: TickFn = Arc::new(Mutex::new(callback));
        self.callbacks.lock().unwrap().push((id, hook));
        id
    }

    /// Unregister a callback. Unknown tokens are ignored.
    pub fn remove(&self, id: CallbackId) {
        self.callbacks.lock().unwrap().retain(|(other, _)| *other != id);
    }

    /// Queue a callback that runs at the start of the next frame and is then
    /// discarded.
    pub fn once(&self, callback: impl FnOnce() + Send + 'static) {
        self.once_queue.lock().unwrap().push(Box::new(callback));
    }

    /// Run one frame: drain the run-once queue in FIFO order, then invoke
    /// every still-registered recurring callback in registration order.
    ///
    /// Callbacks run without any registry lock held, so they may freely call
    /// back into the ticker. A panicking callback takes the calling thread
    /// down with it.
    pub fn tick(&self) {
        let once_batch: Vec<OnceFn> = {
            let mut queue = self.once_queue.lock().unwrap();
            queue.drain(..).collect()
        };
        for hook in once_batch {
            hook();
        }

        let snapshot: Vec<(CallbackId, TickFn)> = {
            let callbacks = self.callbacks.lock().unwrap();
            callbacks
                .iter()
                .map(|(id, hook)| (*id, hook.clone()))
                .collect()
        };
        for (id, hook) in snapshot {
            let still_registered = {
                let callbacks = self.callbacks.lock().unwrap();
                callbacks.iter().any(|(other, _)| *other == id)
            };
            if !still_registered {
                continue;
            }
            let mut callback = hook.lock().unwrap();
            (*callback)();
        }
    }

    /// Spawn the frame thread. Does nothing if it is already running.
    pub fn start(&self) {
        let mut slot = self.frame.lock().unwrap();
        if slot.is_some() {
            return;
        }
        let alive = Arc::new(AtomicBool::new(true));
        let thread_alive = alive.clone();
        let this = self.clone();
        let interval = self.frame_interval;
        let handle = thread::spawn(move || loop {
            thread::sleep(interval);
            if !thread_alive.load(Ordering::SeqCst) {
                break;
            }
            this.tick();
            if !thread_alive.load(Ordering::SeqCst) {
                break;
            }
        });
        *slot = Some(FrameThread { alive, handle });
    }

    /// Halt the frame thread after the frame in flight, if any, completes.
    /// Does nothing if the ticker is not running. Calling this from inside a
    /// callback is allowed; the thread then winds down on its own.
    pub fn stop(&self) {
        let taken = { self.frame.lock().unwrap().take() };
        let frame = match taken {
            Some(frame) => frame,
            None => return,
        };
        frame.alive.store(false, Ordering::SeqCst);
        if frame.handle.thread().id() == thread::current().id() {
            return;
        }
        if frame.handle.join().is_err() {
            warn!("ticker frame thread panicked before join");
        }
    }

    pub fn is_running(&self) -> bool {
        self.frame.lock().unwrap().is_some()
    }
}

impl Default for Ticker {
    fn default() -> Self {
        Self::new()
    }
}
