//! Named mixing channel with a fire-and-forget queue.
//!
//! A channel is a gain node inside a [`crate::bus::Bus`] plus a FIFO of
//! buffers waiting to be played as one-shots. The queue only accepts and
//! drains entries while the channel's frame callback is registered; one
//! whole batch is handed to the backend per frame.

use std::sync::{Arc, Mutex, Weak};

use log::warn;

use crate::backend::{NodeId, SharedBackend};
use crate::clip::Clip;
use crate::pcm::PcmBuffer;
use crate::ticker::{CallbackId, Ticker};

pub struct Channel {
    backend: SharedBackend,
    ticker: Ticker,
    node: NodeId,
    weak_self: Weak<Channel>,
    queue: Mutex<Vec<Arc<PcmBuffer>>>,
    tick_registration: Mutex<Option<CallbackId>>,
}

impl Channel {
    pub(crate) fn create(backend: SharedBackend, ticker: Ticker, parent: NodeId) -> Arc<Channel> {
        let node = backend.create_node();
        backend.connect(node, parent);
        Arc::new_cyclic(|weak| Channel {
            backend,
            ticker,
            node,
            weak_self: weak.clone(),
            queue: Mutex::new(Vec::new()),
            tick_registration: Mutex::new(None),
        })
    }

    pub(crate) fn node(&self) -> NodeId {
        self.node
    }

    pub(crate) fn backend(&self) -> &SharedBackend {
        &self.backend
    }

    /// Channel gain, `1.0` by default.
    pub fn volume(&self) -> f32 {
        self.backend.gain(self.node)
    }

    pub fn set_volume(&self, volume: f32) {
        self.backend.set_gain(self.node, volume);
    }

    /// Register the per-frame queue drain. Does nothing when already
    /// registered.
    pub fn start_tick(&self) {
        let mut registration = self.tick_registration.lock().unwrap();
        if registration.is_some() {
            return;
        }
        let weak = self.weak_self.clone();
        *registration = Some(self.ticker.add(move || {
            if let Some(channel) = weak.upgrade() {
                channel.drain_queue();
            }
        }));
    }

    /// Unregister the queue drain and discard anything still queued.
    /// Does nothing beyond the discard when not registered.
    pub fn stop_tick(&self) {
        let mut registration = self.tick_registration.lock().unwrap();
        if let Some(id) = registration.take() {
            self.ticker.remove(id);
        }
        self.queue.lock().unwrap().clear();
    }

    pub fn is_ticking(&self) -> bool {
        self.tick_registration.lock().unwrap().is_some()
    }

    /// Queue a clip's source for one-shot playback on the next frame.
    /// Ignored while the queue drain is not registered.
    pub fn push_clip_to_queue(&self, clip: &Clip) {
        self.push_to_queue(clip.source().clone());
    }

    /// Queue a raw buffer for one-shot playback on the next frame. Ignored
    /// while the queue drain is not registered.
    pub fn push_to_queue(&self, buffer: Arc<PcmBuffer>) {
        let registration = self.tick_registration.lock().unwrap();
        if registration.is_none() {
            return;
        }
        self.queue.lock().unwrap().push(buffer);
    }

    fn drain_queue(&self) {
        let pending: Vec<Arc<PcmBuffer>> = {
            let mut queue = self.queue.lock().unwrap();
            std::mem::take(&mut *queue)
        };
        for buffer in pending {
            if let Err(err) = self.backend.start_one_shot(buffer, self.node) {
                warn!("one-shot playback failed: {}", err);
            }
        }
    }

    /// Halt queue processing and detach the channel from its bus. Clips
    /// still pointing here fail to play afterwards.
    pub fn destroy(&self) {
        self.stop_tick();
        self.backend.disconnect(self.node);
    }
}
