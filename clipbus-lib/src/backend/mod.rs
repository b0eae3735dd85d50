//! Output backend abstraction.
//!
//! The playback graph (bus and channel gain nodes, clip voices, one-shot
//! voices) is expressed against [`AudioBackend`] so that the control layer can
//! run against real hardware through rodio or against the in-memory mock in
//! tests. Backends synchronize internally; trait methods take `&self` and may
//! be called from any thread.

mod graph;
pub mod mock;
pub mod rodio;

use std::sync::Arc;

use crate::error::AudioError;
use crate::pcm::PcmBuffer;

/// Backend-assigned identifier of a gain node in the mixing graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Whether the backend's hardware clock is advancing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockState {
    Suspended,
    Running,
}

/// Everything needed to start a controllable voice.
pub struct VoiceParams {
    /// Sample data to play.
    pub buffer: Arc<PcmBuffer>,
    /// Gain node the voice feeds into.
    pub node: NodeId,
    /// Start position within the buffer, in source seconds.
    pub offset_seconds: f64,
    /// Initial playback rate multiplier.
    pub speed: f64,
    /// Restart from the beginning when the buffer runs out.
    pub looped: bool,
    /// Invoked once when a non-looping voice plays to the end of its buffer.
    /// [`Voice::stop`] discards a notification that has not fired yet; one
    /// already in flight can still land after `stop` returns, and receivers
    /// must drop it as stale.
    pub on_ended: Option<Box<dyn FnOnce() + Send>>,
}

/// A live, controllable playback voice.
pub trait Voice: Send {
    /// Change the playback rate of the running voice.
    fn set_speed(&mut self, speed: f64);

    /// Stop output and discard an end notification that has not fired yet.
    fn stop(&mut self);
}

/// Mixing and scheduling services supplied by an audio output.
pub trait AudioBackend: Send + Sync {
    /// Allocate a gain node with unit gain and no destination.
    fn create_node(&self) -> NodeId;

    /// Route a node straight to the output.
    fn connect_to_output(&self, node: NodeId);

    /// Route a node into another node.
    fn connect(&self, node: NodeId, target: NodeId);

    /// Detach a node from its destination. Voices feeding it fall silent.
    fn disconnect(&self, node: NodeId);

    fn set_gain(&self, node: NodeId, gain: f32);

    fn gain(&self, node: NodeId) -> f32;

    /// Start a controllable voice feeding `params.node`.
    fn start_voice(&self, params: VoiceParams) -> Result<Box<dyn Voice>, AudioError>;

    /// Start a fire-and-forget voice that plays `buffer` from the beginning
    /// and releases itself when done.
    fn start_one_shot(&self, buffer: Arc<PcmBuffer>, node: NodeId) -> Result<(), AudioError>;

    fn clock_state(&self) -> ClockState;

    /// Hardware clock position in seconds. Meaningless until the clock runs.
    fn clock_seconds(&self) -> f64;

    /// Ask a suspended backend to start its clock. Returns whether the clock
    /// is running afterwards; callers retry on `false`.
    fn resume(&self) -> bool;
}

/// Shared handle to a backend instance.
pub type SharedBackend = Arc<dyn AudioBackend>;
