//! Top-level mixing group.
//!
//! A `Bus` owns one gain node wired straight to the output and a set of
//! named [`Channel`]s feeding it. An application typically builds one bus
//! per broad purpose (music, effects, dialogue) and creates channels below
//! it for finer control.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::backend::{NodeId, SharedBackend};
use crate::channel::Channel;
use crate::system::AudioSystem;
use crate::ticker::Ticker;

pub struct Bus {
    backend: SharedBackend,
    ticker: Ticker,
    node: NodeId,
    channels: Mutex<HashMap<String, Arc<Channel>>>,
}

impl Bus {
    pub fn new(system: &AudioSystem) -> Self {
        Self::with_parts(system.backend().clone(), system.ticker().clone())
    }

    pub(crate) fn with_parts(backend: SharedBackend, ticker: Ticker) -> Self {
        let node = backend.create_node();
        backend.connect_to_output(node);
        Self {
            backend,
            ticker,
            node,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Master gain over every channel in the bus.
    pub fn volume(&self) -> f32 {
        self.backend.gain(self.node)
    }

    pub fn set_volume(&self, volume: f32) {
        self.backend.set_gain(self.node, volume);
    }

    /// Create a channel under `name` and route it into the bus. Creating a
    /// channel under a taken name destroys and replaces the old one.
    pub fn create_channel(&self, name: &str) -> Arc<Channel> {
        let channel = Channel::create(self.backend.clone(), self.ticker.clone(), self.node);
        let replaced = self
            .channels
            .lock()
            .unwrap()
            .insert(name.to_string(), channel.clone());
        if let Some(old) = replaced {
            old.destroy();
        }
        channel
    }

    pub fn channel(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.lock().unwrap().get(name).cloned()
    }

    /// Destroy the named channel and forget it. Returns whether the name
    /// was known.
    pub fn remove_channel(&self, name: &str) -> bool {
        let removed = self.channels.lock().unwrap().remove(name);
        match removed {
            Some(channel) => {
                channel.destroy();
                true
            }
            None => false,
        }
    }

    pub fn channel_names(&self) -> Vec<String> {
        self.channels.lock().unwrap().keys().cloned().collect()
    }
}
