//! Clip playback state machine.
//!
//! A `Clip` wraps one decoded buffer and tracks position through two
//! timestamps against the shared [`Clock`]: `start_time` (when playback
//! began, rebased on seek, speed change and resume) and `paused_time` (when
//! pause happened). Position is never read back from the backend; releasing
//! the voice on pause and computing the resume offset from the timestamps is
//! what keeps pause/resume sample-exact.
//!
//! `play` never starts a voice inline. It queues the start onto the next
//! ticker frame, and `pause`, `stop` and `destroy` invalidate anything still
//! queued, so a play/pause pair inside one frame never leaks a voice.

use std::path::Path;
use std::sync::{Arc, Mutex, Weak};

use log::warn;
use symphonia::core::io::MediaSource;

use crate::backend::{Voice, VoiceParams};
use crate::channel::Channel;
use crate::clock::Clock;
use crate::decode;
use crate::error::AudioError;
use crate::pcm::PcmBuffer;
use crate::system::AudioSystem;
use crate::ticker::Ticker;

/// Lifecycle state of a clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipStatus {
    Stopped,
    Paused,
    Playing,
}

struct ClipInner {
    status: ClipStatus,
    /// Clock timestamp playback began at; NaN while unset.
    start_time: f64,
    /// Clock timestamp of the last pause; NaN while unset.
    paused_time: f64,
    speed: f64,
    looping: bool,
    voice: Option<Box<dyn Voice>>,
    channel: Option<Weak<Channel>>,
    /// Bumped by every play/pause/stop/destroy; a queued deferred start
    /// only fires if its epoch still matches.
    play_epoch: u64,
    /// Identity of the current voice; stale end notifications are dropped.
    voice_seq: u64,
}

/// Cloneable handle to one playable clip.
#[derive(Clone)]
pub struct Clip {
    source: Arc<PcmBuffer>,
    clock: Clock,
    ticker: Ticker,
    inner: Arc<Mutex<ClipInner>>,
}

impl Clip {
    /// Clip over an already decoded buffer.
    pub fn new(source: Arc<PcmBuffer>, system: &AudioSystem) -> Self {
        Self::from_parts(source, system.clock().clone(), system.ticker().clone())
    }

    /// Decode an audio file and wrap it in a clip.
    pub fn from_file(path: impl AsRef<Path>, system: &AudioSystem) -> Result<Self, AudioError> {
        let buffer = decode::decode_file(path)?;
        Ok(Self::new(Arc::new(buffer), system))
    }

    /// Decode in-memory audio data and wrap it in a clip.
    pub fn from_bytes(bytes: Vec<u8>, system: &AudioSystem) -> Result<Self, AudioError> {
        let buffer = decode::decode_bytes(bytes)?;
        Ok(Self::new(Arc::new(buffer), system))
    }

    /// Decode audio from a seekable reader and wrap it in a clip.
    pub fn from_reader(
        source: impl MediaSource + 'static,
        system: &AudioSystem,
    ) -> Result<Self, AudioError> {
        let buffer = decode::decode_reader(source)?;
        Ok(Self::new(Arc::new(buffer), system))
    }

    pub(crate) fn from_parts(source: Arc<PcmBuffer>, clock: Clock, ticker: Ticker) -> Self {
        Self {
            source,
            clock,
            ticker,
            inner: Arc::new(Mutex::new(ClipInner {
                status: ClipStatus::Stopped,
                start_time: f64::NAN,
                paused_time: f64::NAN,
                speed: 1.0,
                looping: false,
                voice: None,
                channel: None,
                play_epoch: 0,
                voice_seq: 0,
            })),
        }
    }

    pub fn source(&self) -> &Arc<PcmBuffer> {
        &self.source
    }

    /// Length of the source in seconds, independent of speed and loop mode.
    pub fn duration(&self) -> f64 {
        self.source.duration_seconds()
    }

    pub fn status(&self) -> ClipStatus {
        self.inner.lock().unwrap().status
    }

    pub fn speed(&self) -> f64 {
        self.inner.lock().unwrap().speed
    }

    pub fn is_looping(&self) -> bool {
        self.inner.lock().unwrap().looping
    }

    /// The channel this clip plays into, if it is set and still alive.
    pub fn channel(&self) -> Option<Arc<Channel>> {
        self.inner.lock().unwrap().channel.as_ref().and_then(Weak::upgrade)
    }

    /// Point the clip at a channel, or detach it with `None`. The reference
    /// is weak; a clip never keeps its channel alive.
    pub fn set_channel(&self, channel: Option<&Arc<Channel>>) {
        self.inner.lock().unwrap().channel = channel.map(Arc::downgrade);
    }

    /// Begin or resume playback on the next ticker frame.
    ///
    /// Playing while already playing is a no-op. Errors when no live channel
    /// is attached.
    pub fn play(&self) -> Result<(), AudioError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.channel.as_ref().and_then(Weak::upgrade).is_none() {
            return Err(AudioError::InvalidState(
                "clip has no channel to play into".to_string(),
            ));
        }
        if inner.status == ClipStatus::Playing {
            return Ok(());
        }
        inner.play_epoch = inner.play_epoch.wrapping_add(1);
        let epoch = inner.play_epoch;
        drop(inner);

        let this = self.clone();
        self.ticker.once(move || this.start_deferred(epoch));
        Ok(())
    }

    fn start_deferred(&self, epoch: u64) {
        let mut inner = self.inner.lock().unwrap();
        if inner.play_epoch != epoch {
            return;
        }
        if inner.status == ClipStatus::Playing {
            return;
        }
        let channel = match inner.channel.as_ref().and_then(Weak::upgrade) {
            Some(channel) => channel,
            None => return,
        };

        let now = self.clock.current_time();
        let resuming = !inner.paused_time.is_nan() && !inner.looping;
        let (start_time, offset_seconds) = if resuming {
            let elapsed = inner.paused_time - inner.start_time;
            (now - elapsed, elapsed * inner.speed)
        } else {
            (now, 0.0)
        };

        inner.voice_seq = inner.voice_seq.wrapping_add(1);
        let on_ended: Option<Box<dyn FnOnce() + Send>> = if inner.looping {
            None
        } else {
            let weak = Arc::downgrade(&self.inner);
            let seq = inner.voice_seq;
            Some(Box::new(move || finish_from_voice(&weak, seq)))
        };

        let params = VoiceParams {
            buffer: self.source.clone(),
            node: channel.node(),
            offset_seconds,
            speed: inner.speed,
            looped: inner.looping,
            on_ended,
        };
        let voice = match channel.backend().start_voice(params) {
            Ok(voice) => voice,
            Err(err) => {
                warn!("voice start failed: {}", err);
                return;
            }
        };

        if let Some(mut old) = inner.voice.replace(voice) {
            old.stop();
        }
        inner.start_time = start_time;
        inner.paused_time = f64::NAN;
        inner.status = ClipStatus::Playing;
    }

    /// Freeze playback, keeping the position. No-op unless playing, but a
    /// queued deferred start is cancelled either way.
    pub fn pause(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.play_epoch = inner.play_epoch.wrapping_add(1);
        if inner.status != ClipStatus::Playing {
            return;
        }
        if let Some(mut voice) = inner.voice.take() {
            voice.stop();
        }
        inner.paused_time = self.clock.current_time();
        inner.status = ClipStatus::Paused;
    }

    /// Halt playback and reset the position to the beginning. No-op when
    /// already stopped, but a queued deferred start is cancelled either way.
    pub fn stop(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.play_epoch = inner.play_epoch.wrapping_add(1);
        if inner.status == ClipStatus::Stopped {
            return;
        }
        if let Some(mut voice) = inner.voice.take() {
            voice.stop();
        }
        inner.start_time = f64::NAN;
        inner.paused_time = f64::NAN;
        inner.status = ClipStatus::Stopped;
    }

    /// Move the position to `seconds` into the source. Ignored while
    /// stopped or detached; a playing clip keeps playing from the new
    /// position, a paused clip stays paused there.
    ///
    /// Targets before the start clamp to `0.0`.
    pub fn seek(&self, seconds: f64) {
        if !seconds.is_finite() {
            return;
        }
        let was_playing = {
            let inner = self.inner.lock().unwrap();
            if inner.channel.as_ref().and_then(Weak::upgrade).is_none() {
                return;
            }
            if inner.status == ClipStatus::Stopped {
                return;
            }
            inner.status == ClipStatus::Playing
        };

        self.pause();
        {
            let mut inner = self.inner.lock().unwrap();
            let target = inner.paused_time - seconds / inner.speed;
            inner.start_time = if target > inner.paused_time {
                inner.paused_time
            } else {
                target
            };
        }
        if was_playing {
            if let Err(err) = self.play() {
                warn!("seek could not resume playback: {}", err);
            }
        }
    }

    /// Change the playback rate, rebasing the timestamps so the current
    /// position does not move. Applies to the live voice immediately.
    ///
    /// Rejects zero, negative and non-finite rates.
    pub fn set_speed(&self, speed: f64) -> Result<(), AudioError> {
        if !speed.is_finite() || speed <= 0.0 {
            return Err(AudioError::InvalidState(format!(
                "playback speed must be a positive number, got {}",
                speed
            )));
        }
        let mut inner = self.inner.lock().unwrap();
        if inner.status != ClipStatus::Stopped {
            let now = self.clock.current_time();
            let reference = if inner.paused_time.is_nan() {
                now
            } else {
                inner.paused_time
            };
            let elapsed = reference - inner.start_time;
            inner.start_time = now - elapsed * inner.speed / speed;
            if !inner.paused_time.is_nan() {
                inner.paused_time = now;
            }
        }
        inner.speed = speed;
        if let Some(voice) = inner.voice.as_mut() {
            voice.set_speed(speed);
        }
        Ok(())
    }

    /// Switch loop mode. Returns `false` and leaves the mode unchanged while
    /// a voice is live; stop or pause first.
    // TODO: rebuild the live voice instead of rejecting the change.
    pub fn set_loop(&self, looping: bool) -> bool {
        let mut inner = self.inner.lock().unwrap();
        if inner.voice.is_some() {
            warn!("loop mode can only change while no voice is live; ignoring");
            return false;
        }
        inner.looping = looping;
        true
    }

    /// Position within the source in seconds. `0.0` while stopped and always
    /// `0.0` for looping clips.
    pub fn current_time(&self) -> f64 {
        let inner = self.inner.lock().unwrap();
        if inner.looping {
            return 0.0;
        }
        match inner.status {
            ClipStatus::Playing => (self.clock.current_time() - inner.start_time) * inner.speed,
            ClipStatus::Paused => (inner.paused_time - inner.start_time) * inner.speed,
            ClipStatus::Stopped => 0.0,
        }
    }

    /// Stop playback and detach from the channel. No-op when no channel was
    /// ever attached; the clip is reusable after `set_channel`.
    pub fn destroy(&self) {
        {
            let inner = self.inner.lock().unwrap();
            if inner.channel.is_none() {
                return;
            }
        }
        self.stop();
        self.inner.lock().unwrap().channel = None;
    }
}

/// End-of-playback transition, run from a voice's end notification.
/// Backends may deliver a notification that was already in flight when
/// [`Voice::stop`] returned, so this only acts when it can take the very
/// voice it was armed for: a stale sequence means the voice was replaced,
/// a missing voice means `pause`, `stop` or `destroy` got there first.
fn finish_from_voice(inner: &Weak<Mutex<ClipInner>>, seq: u64) {
    let inner = match inner.upgrade() {
        Some(inner) => inner,
        None => return,
    };
    let mut inner = inner.lock().unwrap();
    if inner.voice_seq != seq {
        return;
    }
    let mut voice = match inner.voice.take() {
        Some(voice) => voice,
        None => return,
    };
    voice.stop();
    inner.start_time = f64::NAN;
    inner.paused_time = f64::NAN;
    inner.status = ClipStatus::Stopped;
    inner.play_epoch = inner.play_epoch.wrapping_add(1);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::mock::MockBackend;
    use crate::backend::SharedBackend;
    use crate::test_data;

    struct Rig {
        mock: MockBackend,
        ticker: Ticker,
        clock: Clock,
        channel: Arc<Channel>,
        clip: Clip,
    }

    /// Channel wired straight to the output, a two second mono source, and
    /// a ticker that is only advanced by hand.
    fn rig() -> Rig {
        let mock = MockBackend::new();
        let backend: SharedBackend = Arc::new(mock.clone());
        let ticker = Ticker::new();
        let clock = Clock::new(backend.clone());
        let out = backend.create_node();
        backend.connect_to_output(out);
        let channel = Channel::create(backend, ticker.clone(), out);
        let clip = Clip::from_parts(
            Arc::new(test_data::silence(1, 100, 2.0)),
            clock.clone(),
            ticker.clone(),
        );
        clip.set_channel(Some(&channel));
        Rig {
            mock,
            ticker,
            clock,
            channel,
            clip,
        }
    }

    fn set_time(clock: &Clock, seconds: f64) {
        clock.observe(seconds, seconds);
    }

    #[test]
    fn play_requires_channel() {
        let r = rig();
        let orphan = Clip::from_parts(r.clip.source().clone(), r.clock.clone(), r.ticker.clone());
        let err = orphan.play().unwrap_err();
        assert!(matches!(err, AudioError::InvalidState(_)));
    }

    #[test]
    fn play_errors_after_channel_dropped() {
        let r = rig();
        drop(r.channel);
        assert!(r.clip.play().is_err());
    }

    #[test]
    fn play_starts_voice_on_next_frame() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        assert_eq!(r.mock.voice_count(), 0);
        assert_eq!(r.clip.status(), ClipStatus::Stopped);

        r.ticker.tick();
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert_eq!(r.mock.voice_count(), 1);
        let voice = r.mock.last_voice().unwrap();
        assert_eq!(voice.offset_seconds, 0.0);
        assert_eq!(voice.speed, 1.0);
        assert!(!voice.looped);
        assert_eq!(voice.node, r.channel.node());
        assert!((r.clip.current_time() - 0.0).abs() < 1e-9);
    }

    #[test]
    fn double_play_starts_single_voice() {
        let r = rig();
        r.clip.play().unwrap();
        r.clip.play().unwrap();
        r.ticker.tick();
        r.ticker.tick();
        assert_eq!(r.mock.voice_count(), 1);
    }

    #[test]
    fn play_while_playing_is_noop() {
        let r = rig();
        r.clip.play().unwrap();
        r.ticker.tick();
        r.clip.play().unwrap();
        r.ticker.tick();
        assert_eq!(r.mock.voice_count(), 1);
    }

    #[test]
    fn pause_cancels_queued_start() {
        let r = rig();
        r.clip.play().unwrap();
        r.clip.pause();
        r.ticker.tick();
        assert_eq!(r.mock.voice_count(), 0);
        assert_eq!(r.clip.status(), ClipStatus::Stopped);
    }

    #[test]
    fn stop_cancels_queued_start() {
        let r = rig();
        r.clip.play().unwrap();
        r.clip.stop();
        r.ticker.tick();
        assert_eq!(r.mock.voice_count(), 0);
    }

    #[test]
    fn pause_resume_keeps_position() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();

        set_time(&r.clock, 14.0);
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);

        r.clip.pause();
        assert_eq!(r.clip.status(), ClipStatus::Paused);
        assert_eq!(r.mock.active_voice_count(), 0);
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);

        set_time(&r.clock, 20.0);
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);

        r.clip.play().unwrap();
        r.ticker.tick();
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);
        let voice = r.mock.last_voice().unwrap();
        assert!((voice.offset_seconds - 4.0).abs() < 1e-9);

        set_time(&r.clock, 21.0);
        assert!((r.clip.current_time() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn stop_resets_position() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 12.0);

        r.clip.stop();
        assert_eq!(r.clip.status(), ClipStatus::Stopped);
        assert_eq!(r.clip.current_time(), 0.0);
        assert_eq!(r.mock.active_voice_count(), 0);

        r.clip.play().unwrap();
        r.ticker.tick();
        let voice = r.mock.last_voice().unwrap();
        assert_eq!(voice.offset_seconds, 0.0);
    }

    #[test]
    fn seek_while_paused_moves_position() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 12.0);
        r.clip.pause();

        r.clip.seek(0.5);
        assert_eq!(r.clip.status(), ClipStatus::Paused);
        assert!((r.clip.current_time() - 0.5).abs() < 1e-9);

        r.clip.play().unwrap();
        r.ticker.tick();
        let voice = r.mock.last_voice().unwrap();
        assert!((voice.offset_seconds - 0.5).abs() < 1e-9);
    }

    #[test]
    fn seek_while_playing_keeps_playing() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 12.0);

        r.clip.seek(1.5);
        assert!((r.clip.current_time() - 1.5).abs() < 1e-9);
        r.ticker.tick();
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert!((r.clip.current_time() - 1.5).abs() < 1e-9);
        assert_eq!(r.mock.voice_count(), 2);
    }

    #[test]
    fn seek_before_start_clamps_to_zero() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 12.0);

        r.clip.seek(-3.0);
        assert_eq!(r.clip.current_time(), 0.0);
    }

    #[test]
    fn seek_while_stopped_is_ignored() {
        let r = rig();
        r.clip.seek(1.0);
        assert_eq!(r.clip.status(), ClipStatus::Stopped);
        assert_eq!(r.clip.current_time(), 0.0);
        assert_eq!(r.mock.voice_count(), 0);
    }

    #[test]
    fn set_speed_rejects_bad_rates() {
        let r = rig();
        assert!(r.clip.set_speed(0.0).is_err());
        assert!(r.clip.set_speed(-1.0).is_err());
        assert!(r.clip.set_speed(f64::NAN).is_err());
        assert!(r.clip.set_speed(f64::INFINITY).is_err());
        assert_eq!(r.clip.speed(), 1.0);
    }

    #[test]
    fn set_speed_keeps_position_while_playing() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 14.0);
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);

        r.clip.set_speed(2.0).unwrap();
        assert!((r.clip.current_time() - 4.0).abs() < 1e-9);
        assert_eq!(r.mock.active_voice_speed(), Some(2.0));

        set_time(&r.clock, 15.0);
        assert!((r.clip.current_time() - 6.0).abs() < 1e-9);
    }

    #[test]
    fn set_speed_keeps_position_while_paused() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 12.0);
        r.clip.pause();

        r.clip.set_speed(4.0).unwrap();
        assert!((r.clip.current_time() - 2.0).abs() < 1e-9);

        r.clip.play().unwrap();
        r.ticker.tick();
        let voice = r.mock.last_voice().unwrap();
        assert!((voice.offset_seconds - 2.0).abs() < 1e-9);
        assert_eq!(voice.speed, 4.0);
    }

    #[test]
    fn set_speed_while_stopped_applies_to_next_play() {
        let r = rig();
        r.clip.set_speed(2.0).unwrap();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        assert_eq!(r.mock.last_voice().unwrap().speed, 2.0);

        set_time(&r.clock, 11.0);
        assert!((r.clip.current_time() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn loop_change_rejected_while_voice_is_live() {
        let r = rig();
        r.clip.play().unwrap();
        r.ticker.tick();
        assert!(!r.clip.set_loop(true));
        assert!(!r.clip.is_looping());

        r.clip.pause();
        assert!(r.clip.set_loop(true));
        assert!(r.clip.is_looping());
    }

    #[test]
    fn looping_clip_restarts_from_beginning_and_reads_zero() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        set_time(&r.clock, 11.0);
        r.clip.pause();
        assert!(r.clip.set_loop(true));

        r.clip.play().unwrap();
        r.ticker.tick();
        let voice = r.mock.last_voice().unwrap();
        assert!(voice.looped);
        assert_eq!(voice.offset_seconds, 0.0);
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert_eq!(r.clip.current_time(), 0.0);

        // Looping voices never end on their own.
        r.mock.advance(60.0);
        assert_eq!(r.clip.status(), ClipStatus::Playing);
    }

    #[test]
    fn natural_end_stops_the_clip() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();

        r.mock.advance(2.5);
        assert_eq!(r.clip.status(), ClipStatus::Stopped);
        assert_eq!(r.clip.current_time(), 0.0);
        assert_eq!(r.mock.active_voice_count(), 0);

        // The clip can be played again from the top.
        r.clip.play().unwrap();
        r.ticker.tick();
        assert_eq!(r.mock.last_voice().unwrap().offset_seconds, 0.0);
        assert_eq!(r.clip.status(), ClipStatus::Playing);
    }

    #[test]
    fn stale_end_after_pause_keeps_the_pause() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        let seq = r.clip.inner.lock().unwrap().voice_seq;

        set_time(&r.clock, 11.5);
        r.clip.pause();
        assert_eq!(r.clip.status(), ClipStatus::Paused);

        // The source drained in the same instant: the voice's notification
        // was already in flight when pause took the voice, and lands only
        // now. It must not undo the pause.
        finish_from_voice(&Arc::downgrade(&r.clip.inner), seq);

        assert_eq!(r.clip.status(), ClipStatus::Paused);
        assert!((r.clip.current_time() - 1.5).abs() < 1e-9);

        r.clip.play().unwrap();
        r.ticker.tick();
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert!((r.mock.last_voice().unwrap().offset_seconds - 1.5).abs() < 1e-9);
    }

    #[test]
    fn stale_end_does_not_cancel_a_queued_resume() {
        let r = rig();
        set_time(&r.clock, 10.0);
        r.clip.play().unwrap();
        r.ticker.tick();
        let seq = r.clip.inner.lock().unwrap().voice_seq;

        set_time(&r.clock, 11.0);
        r.clip.pause();
        r.clip.play().unwrap();
        finish_from_voice(&Arc::downgrade(&r.clip.inner), seq);

        r.ticker.tick();
        assert_eq!(r.clip.status(), ClipStatus::Playing);
        assert!((r.clip.current_time() - 1.0).abs() < 1e-9);
        assert!((r.mock.last_voice().unwrap().offset_seconds - 1.0).abs() < 1e-9);
    }

    #[test]
    fn destroy_stops_and_detaches() {
        let r = rig();
        r.clip.play().unwrap();
        r.ticker.tick();

        r.clip.destroy();
        assert_eq!(r.clip.status(), ClipStatus::Stopped);
        assert_eq!(r.mock.active_voice_count(), 0);
        assert!(r.clip.channel().is_none());
        assert!(r.clip.play().is_err());

        r.clip.set_channel(Some(&r.channel));
        assert!(r.clip.play().is_ok());
    }

    #[test]
    fn destroy_without_channel_is_noop() {
        let r = rig();
        let orphan = Clip::from_parts(r.clip.source().clone(), r.clock.clone(), r.ticker.clone());
        orphan.destroy();
        assert_eq!(orphan.status(), ClipStatus::Stopped);
    }

    #[test]
    fn destroy_cancels_queued_start() {
        let r = rig();
        r.clip.play().unwrap();
        r.clip.destroy();
        r.ticker.tick();
        assert_eq!(r.mock.voice_count(), 0);
    }
}
