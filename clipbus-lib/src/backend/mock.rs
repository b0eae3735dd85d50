//! In-memory backend for tests.
//!
//! `MockBackend` records the routing graph and every voice started against
//! it, and lets tests move the hardware clock by hand. `advance` retires
//! non-looping voices once their source runs out and fires their end
//! notifications, so end-of-playback paths can be exercised without a device.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use super::graph::NodeGraph;
use super::{AudioBackend, ClockState, NodeId, Voice, VoiceParams};
use crate::error::AudioError;
use crate::pcm::PcmBuffer;

/// Snapshot of the parameters a voice was started with.
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceRecord {
    pub node: NodeId,
    pub offset_seconds: f64,
    pub speed: f64,
    pub looped: bool,
    pub one_shot: bool,
    /// Frame count of the source buffer, to tell queued buffers apart.
    pub frames: usize,
}

struct MockVoiceState {
    remaining: f64,
    speed: f64,
    looped: bool,
    active: bool,
    on_ended: Option<Box<dyn FnOnce() + Send>>,
}

struct MockState {
    graph: NodeGraph,
    voices: HashMap<u64, MockVoiceState>,
    next_voice: u64,
    records: Vec<VoiceRecord>,
    clock: f64,
    clock_state: ClockState,
    resume_succeeds: bool,
    resume_calls: usize,
}

/// Cloneable handle to shared mock state.
#[derive(Clone)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Backend whose clock is already running.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(MockState {
                graph: NodeGraph::new(),
                voices: HashMap::new(),
                next_voice: 0,
                records: Vec::new(),
                clock: 0.0,
                clock_state: ClockState::Running,
                resume_succeeds: true,
                resume_calls: 0,
            })),
        }
    }

    /// Backend that starts suspended and stays suspended until
    /// `set_resume_succeeds(true)` and a `resume` call.
    pub fn suspended() -> Self {
        let backend = Self::new();
        {
            let mut state = backend.state.lock().unwrap();
            state.clock_state = ClockState::Suspended;
            state.resume_succeeds = false;
        }
        backend
    }

    /// Move the hardware clock forward and retire voices that finish within
    /// the elapsed span. End notifications run after internal locks are
    /// released.
    pub fn advance(&self, dt: f64) {
        let due = {
            let mut state = self.state.lock().unwrap();
            state.clock += dt;
            let mut due = Vec::new();
            for voice in state.voices.values_mut() {
                if !voice.active || voice.looped {
                    continue;
                }
                voice.remaining -= dt * voice.speed;
                if voice.remaining <= 1e-9 {
                    voice.active = false;
                    if let Some(hook) = voice.on_ended.take() {
                        due.push(hook);
                    }
                }
            }
            due
        };
        for hook in due {
            hook();
        }
    }

    pub fn set_clock(&self, seconds: f64) {
        self.state.lock().unwrap().clock = seconds;
    }

    pub fn set_clock_state(&self, clock_state: ClockState) {
        self.state.lock().unwrap().clock_state = clock_state;
    }

    pub fn set_resume_succeeds(&self, succeeds: bool) {
        self.state.lock().unwrap().resume_succeeds = succeeds;
    }

    pub fn resume_calls(&self) -> usize {
        self.state.lock().unwrap().resume_calls
    }

    /// Controllable voices started so far, finished ones included.
    pub fn voice_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.records.iter().filter(|r| !r.one_shot).count()
    }

    /// Fire-and-forget voices started so far.
    pub fn one_shot_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.records.iter().filter(|r| r.one_shot).count()
    }

    /// Voices of any kind that are neither stopped nor finished.
    pub fn active_voice_count(&self) -> usize {
        let state = self.state.lock().unwrap();
        state.voices.values().filter(|v| v.active).count()
    }

    pub fn last_voice(&self) -> Option<VoiceRecord> {
        self.state.lock().unwrap().records.last().cloned()
    }

    pub fn voice_records(&self) -> Vec<VoiceRecord> {
        self.state.lock().unwrap().records.clone()
    }

    /// Current rate of the most recently started voice that is still active.
    pub fn active_voice_speed(&self) -> Option<f64> {
        let state = self.state.lock().unwrap();
        state
            .voices
            .iter()
            .filter(|(_, v)| v.active)
            .max_by_key(|(id, _)| **id)
            .map(|(_, v)| v.speed)
    }

    pub fn node_gain(&self, node: NodeId) -> f32 {
        self.state.lock().unwrap().graph.gain(node)
    }

    pub fn effective_gain(&self, node: NodeId) -> f32 {
        self.state.lock().unwrap().graph.effective_gain(node)
    }

    pub fn connected_to_output(&self, node: NodeId) -> bool {
        self.state.lock().unwrap().graph.reaches_output(node)
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for MockBackend {
    fn create_node(&self) -> NodeId {
        self.state.lock().unwrap().graph.create()
    }

    fn connect_to_output(&self, node: NodeId) {
        self.state.lock().unwrap().graph.connect_to_output(node);
    }

    fn connect(&self, node: NodeId, target: NodeId) {
        self.state.lock().unwrap().graph.connect(node, target);
    }

    fn disconnect(&self, node: NodeId) {
        self.state.lock().unwrap().graph.disconnect(node);
    }

    fn set_gain(&self, node: NodeId, gain: f32) {
        self.state.lock().unwrap().graph.set_gain(node, gain);
    }

    fn gain(&self, node: NodeId) -> f32 {
        self.state.lock().unwrap().graph.gain(node)
    }

    fn start_voice(&self, params: VoiceParams) -> Result<Box<dyn Voice>, AudioError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_voice;
        state.next_voice += 1;
        let remaining = (params.buffer.duration_seconds() - params.offset_seconds).max(0.0);
        state.records.push(VoiceRecord {
            node: params.node,
            offset_seconds: params.offset_seconds,
            speed: params.speed,
            looped: params.looped,
            one_shot: false,
            frames: params.buffer.frame_count(),
        });
        state.voices.insert(
            id,
            MockVoiceState {
                remaining,
                speed: params.speed,
                looped: params.looped,
                active: true,
                on_ended: params.on_ended,
            },
        );
        Ok(Box::new(MockVoice {
            state: self.state.clone(),
            id,
        }))
    }

    fn start_one_shot(&self, buffer: Arc<PcmBuffer>, node: NodeId) -> Result<(), AudioError> {
        let mut state = self.state.lock().unwrap();
        let id = state.next_voice;
        state.next_voice += 1;
        state.records.push(VoiceRecord {
            node,
            offset_seconds: 0.0,
            speed: 1.0,
            looped: false,
            one_shot: true,
            frames: buffer.frame_count(),
        });
        state.voices.insert(
            id,
            MockVoiceState {
                remaining: buffer.duration_seconds(),
                speed: 1.0,
                looped: false,
                active: true,
                on_ended: None,
            },
        );
        Ok(())
    }

    fn clock_state(&self) -> ClockState {
        self.state.lock().unwrap().clock_state
    }

    fn clock_seconds(&self) -> f64 {
        self.state.lock().unwrap().clock
    }

    fn resume(&self) -> bool {
        let mut state = self.state.lock().unwrap();
        state.resume_calls += 1;
        if state.resume_succeeds {
            state.clock_state = ClockState::Running;
        }
        state.clock_state == ClockState::Running
    }
}

struct MockVoice {
    state: Arc<Mutex<MockState>>,
    id: u64,
}

impl MockVoice {
    fn deactivate(&self) {
        let mut state = self.state.lock().unwrap();
        if let Some(voice) = state.voices.get_mut(&self.id) {
            voice.active = false;
            voice.on_ended = None;
        }
    }
}

impl Voice for MockVoice {
    fn set_speed(&mut self, speed: f64) {
        let mut state = self.state.lock().unwrap();
        if let Some(voice) = state.voices.get_mut(&self.id) {
            voice.speed = speed;
        }
    }

    fn stop(&mut self) {
        self.deactivate();
    }
}

impl Drop for MockVoice {
    fn drop(&mut self) {
        self.deactivate();
    }
}
