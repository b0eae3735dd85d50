//! rodio-backed output.
//!
//! `OutputStream` is tied to the thread that opened it, so the backend parks
//! a dedicated thread on the stream and hands out clones of its mixer. Gain
//! nodes are resolved to a single volume per voice: every graph change
//! recomputes the product of gains between each live voice and the output
//! and pushes it onto the voice's sink.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread;
use std::time::{Duration, Instant};

use log::{error, info, warn};
use rodio::buffer::SamplesBuffer;
use rodio::mixer::Mixer;
use rodio::{OutputStream, OutputStreamBuilder, Sink, Source};

use super::graph::NodeGraph;
use super::{AudioBackend, ClockState, NodeId, Voice, VoiceParams};
use crate::error::AudioError;
use crate::pcm::PcmBuffer;

const OUTPUT_STREAM_OPEN_RETRIES: usize = 20;
const OUTPUT_STREAM_OPEN_RETRY_MS: u64 = 100;
const OUTPUT_IDLE_POLL_MS: u64 = 50;
const END_WATCH_POLL_MS: u64 = 15;
const RESUME_WAIT_MS: u64 = 2_000;
const RESUME_POLL_MS: u64 = 20;

struct VoiceShared {
    sink: Sink,
    node: NodeId,
    cancelled: AtomicBool,
}

impl VoiceShared {
    fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
        self.sink.stop();
    }
}

struct OutputHandle {
    mixer: Option<Mixer>,
    opened_at: Option<Instant>,
}

/// Hardware output over the default rodio device.
///
/// The handle is cheap to clone; all clones drive the same stream thread.
/// If no device can be opened the backend stays suspended, keeps answering
/// control calls, and retries whenever [`AudioBackend::resume`] is called.
#[derive(Clone)]
pub struct RodioBackend {
    graph: Arc<Mutex<NodeGraph>>,
    voices: Arc<Mutex<Vec<Weak<VoiceShared>>>>,
    one_shots: Arc<Mutex<Vec<Arc<VoiceShared>>>>,
    output: Arc<Mutex<OutputHandle>>,
    resume_requested: Arc<AtomicBool>,
    shutdown: Arc<AtomicBool>,
}

impl RodioBackend {
    /// Spawn the output thread and return immediately. The stream may still
    /// be opening; poll [`AudioBackend::clock_state`] or call
    /// [`AudioBackend::resume`] to wait for it.
    pub fn new() -> Self {
        let backend = Self {
            graph: Arc::new(Mutex::new(NodeGraph::new())),
            voices: Arc::new(Mutex::new(Vec::new())),
            one_shots: Arc::new(Mutex::new(Vec::new())),
            output: Arc::new(Mutex::new(OutputHandle {
                mixer: None,
                opened_at: None,
            })),
            resume_requested: Arc::new(AtomicBool::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
        };
        let thread_backend = backend.clone();
        thread::spawn(move || thread_backend.run_output_thread());
        backend
    }

    /// Ask the output thread to drop the stream and exit. Safe to call more
    /// than once; playback started afterwards stays silent.
    pub fn close(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    fn run_output_thread(&self) {
        loop {
            if self.shutdown.load(Ordering::Relaxed) {
                return;
            }
            match open_output_stream_with_retry() {
                Some(stream) => {
                    {
                        let mut output = self.output.lock().unwrap();
                        output.mixer = Some(stream.mixer().clone());
                        output.opened_at = Some(Instant::now());
                    }
                    info!("audio output stream opened");
                    // The stream closes when dropped, so this thread parks
                    // here holding it until shutdown.
                    while !self.shutdown.load(Ordering::Relaxed) {
                        thread::sleep(Duration::from_millis(OUTPUT_IDLE_POLL_MS));
                    }
                    return;
                }
                None => {
                    while !self.resume_requested.swap(false, Ordering::Relaxed) {
                        if self.shutdown.load(Ordering::Relaxed) {
                            return;
                        }
                        thread::sleep(Duration::from_millis(OUTPUT_IDLE_POLL_MS));
                    }
                }
            }
        }
    }

    fn mixer(&self) -> Result<Mixer, AudioError> {
        let output = self.output.lock().unwrap();
        output
            .mixer
            .clone()
            .ok_or_else(|| AudioError::Backend("output stream is not open".to_string()))
    }

    /// Push the current effective gain onto every live sink and drop entries
    /// for voices that have gone away.
    fn refresh_voice_gains(&self) {
        let graph = self.graph.lock().unwrap();
        let mut voices = self.voices.lock().unwrap();
        voices.retain(|weak| match weak.upgrade() {
            Some(voice) => {
                voice.sink.set_volume(graph.effective_gain(voice.node));
                true
            }
            None => false,
        });
        drop(voices);
        let mut one_shots = self.one_shots.lock().unwrap();
        one_shots.retain(|voice| {
            if voice.sink.empty() {
                return false;
            }
            voice.sink.set_volume(graph.effective_gain(voice.node));
            true
        });
    }
}

impl Default for RodioBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioBackend for RodioBackend {
    fn create_node(&self) -> NodeId {
        self.graph.lock().unwrap().create()
    }

    fn connect_to_output(&self, node: NodeId) {
        self.graph.lock().unwrap().connect_to_output(node);
        self.refresh_voice_gains();
    }

    fn connect(&self, node: NodeId, target: NodeId) {
        self.graph.lock().unwrap().connect(node, target);
        self.refresh_voice_gains();
    }

    fn disconnect(&self, node: NodeId) {
        self.graph.lock().unwrap().disconnect(node);
        self.refresh_voice_gains();
    }

    fn set_gain(&self, node: NodeId, gain: f32) {
        self.graph.lock().unwrap().set_gain(node, gain);
        self.refresh_voice_gains();
    }

    fn gain(&self, node: NodeId) -> f32 {
        self.graph.lock().unwrap().gain(node)
    }

    fn start_voice(&self, params: VoiceParams) -> Result<Box<dyn Voice>, AudioError> {
        let mixer = self.mixer()?;
        let gain = { self.graph.lock().unwrap().effective_gain(params.node) };

        let sink = Sink::connect_new(&mixer);
        sink.set_volume(gain);
        sink.set_speed(params.speed as f32);

        let start = params.buffer.sample_index_at(params.offset_seconds);
        let samples = params.buffer.samples()[start..].to_vec();
        if !samples.is_empty() {
            let source = SamplesBuffer::new(
                params.buffer.channels(),
                params.buffer.sample_rate(),
                samples,
            );
            if params.looped {
                sink.append(source.repeat_infinite());
            } else {
                sink.append(source);
            }
        }

        let shared = Arc::new(VoiceShared {
            sink,
            node: params.node,
            cancelled: AtomicBool::new(false),
        });
        if let Some(on_ended) = params.on_ended {
            spawn_end_watcher(shared.clone(), on_ended);
        }
        self.voices.lock().unwrap().push(Arc::downgrade(&shared));
        Ok(Box::new(RodioVoice { shared }))
    }

    fn start_one_shot(&self, buffer: Arc<PcmBuffer>, node: NodeId) -> Result<(), AudioError> {
        let mixer = self.mixer()?;
        let gain = { self.graph.lock().unwrap().effective_gain(node) };

        let sink = Sink::connect_new(&mixer);
        sink.set_volume(gain);
        if !buffer.samples().is_empty() {
            sink.append(SamplesBuffer::new(
                buffer.channels(),
                buffer.sample_rate(),
                buffer.samples().to_vec(),
            ));
        }

        let shared = Arc::new(VoiceShared {
            sink,
            node,
            cancelled: AtomicBool::new(false),
        });
        let mut one_shots = self.one_shots.lock().unwrap();
        one_shots.retain(|voice| !voice.sink.empty());
        one_shots.push(shared);
        Ok(())
    }

    fn clock_state(&self) -> ClockState {
        if self.output.lock().unwrap().opened_at.is_some() {
            ClockState::Running
        } else {
            ClockState::Suspended
        }
    }

    fn clock_seconds(&self) -> f64 {
        self.output
            .lock()
            .unwrap()
            .opened_at
            .map(|at| at.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }

    fn resume(&self) -> bool {
        if self.clock_state() == ClockState::Running {
            return true;
        }
        self.resume_requested.store(true, Ordering::Relaxed);
        let deadline = Instant::now() + Duration::from_millis(RESUME_WAIT_MS);
        while Instant::now() < deadline {
            if self.clock_state() == ClockState::Running {
                return true;
            }
            thread::sleep(Duration::from_millis(RESUME_POLL_MS));
        }
        warn!("audio output is still unavailable after resume request");
        false
    }
}

struct RodioVoice {
    shared: Arc<VoiceShared>,
}

impl Voice for RodioVoice {
    fn set_speed(&mut self, speed: f64) {
        self.shared.sink.set_speed(speed as f32);
    }

    fn stop(&mut self) {
        self.shared.cancel();
    }
}

impl Drop for RodioVoice {
    fn drop(&mut self) {
        self.shared.cancel();
    }
}

/// Poll the sink until it drains, then run the end notification. The swap
/// on `cancelled` decides against a concurrent cancel; a delivery that wins
/// it can still finish after `stop` has returned.
fn spawn_end_watcher(voice: Arc<VoiceShared>, on_ended: Box<dyn FnOnce() + Send>) {
    thread::spawn(move || {
        loop {
            if voice.cancelled.load(Ordering::Relaxed) {
                return;
            }
            if voice.sink.empty() {
                break;
            }
            thread::sleep(Duration::from_millis(END_WATCH_POLL_MS));
        }
        if !voice.cancelled.swap(true, Ordering::Relaxed) {
            on_ended();
        }
    });
}

/// Open the default output stream with bounded retry behavior.
fn open_output_stream_with_retry() -> Option<OutputStream> {
    for attempt in 1..=OUTPUT_STREAM_OPEN_RETRIES {
        match OutputStreamBuilder::open_default_stream() {
            Ok(stream) => return Some(stream),
            Err(err) => {
                if attempt == OUTPUT_STREAM_OPEN_RETRIES {
                    error!(
                        "failed to open default output stream after {} attempts: {}",
                        OUTPUT_STREAM_OPEN_RETRIES, err
                    );
                    return None;
                }
                warn!(
                    "open_default_stream attempt {}/{} failed: {}",
                    attempt, OUTPUT_STREAM_OPEN_RETRIES, err
                );
                thread::sleep(Duration::from_millis(OUTPUT_STREAM_OPEN_RETRY_MS));
            }
        }
    }
    None
}
