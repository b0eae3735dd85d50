//! Full-stack playback tests over the mock backend.

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use clipbus_lib::backend::mock::MockBackend;
use clipbus_lib::bus::Bus;
use clipbus_lib::clip::{Clip, ClipStatus};
use clipbus_lib::system::AudioSystem;
use clipbus_lib::test_data;

struct Stack {
    mock: MockBackend,
    system: AudioSystem,
    bus: Bus,
}

/// System over a mock backend with the frame thread halted, so tests
/// control frames through `system.ticker().tick()`.
fn manual_stack() -> Stack {
    let mock = MockBackend::new();
    let system = AudioSystem::new(Arc::new(mock.clone()));
    system.shutdown();
    let bus = Bus::new(&system);
    Stack { mock, system, bus }
}

fn two_second_clip(stack: &Stack) -> Clip {
    Clip::new(
        Arc::new(test_data::sine(2, 44_100, 440.0, 2.0)),
        &stack.system,
    )
}

#[test]
fn play_pause_resume_through_the_stack() {
    let stack = manual_stack();
    let channel = stack.bus.create_channel("music");
    let clip = two_second_clip(&stack);
    clip.set_channel(Some(&channel));

    clip.play().unwrap();
    assert_eq!(clip.status(), ClipStatus::Stopped);
    stack.system.ticker().tick();
    assert_eq!(clip.status(), ClipStatus::Playing);
    assert_eq!(stack.mock.voice_count(), 1);

    clip.pause();
    assert_eq!(clip.status(), ClipStatus::Paused);
    assert_eq!(stack.mock.active_voice_count(), 0);
    let position = clip.current_time();
    assert!(position >= 0.0 && position < 0.5, "position = {}", position);

    clip.play().unwrap();
    stack.system.ticker().tick();
    assert_eq!(clip.status(), ClipStatus::Playing);
    assert_eq!(stack.mock.voice_count(), 2);
    let resumed = stack.mock.last_voice().unwrap();
    assert!((resumed.offset_seconds - position).abs() < 0.25);

    clip.stop();
    assert_eq!(clip.status(), ClipStatus::Stopped);
    assert_eq!(clip.current_time(), 0.0);
}

#[test]
fn deferred_play_fires_via_frame_thread() {
    let mock = MockBackend::new();
    let system = AudioSystem::new(Arc::new(mock.clone()));
    let bus = Bus::new(&system);
    let channel = bus.create_channel("music");
    let clip = Clip::new(Arc::new(test_data::silence(1, 8_000, 1.0)), &system);
    clip.set_channel(Some(&channel));

    clip.play().unwrap();
    let deadline = Instant::now() + Duration::from_secs(2);
    while clip.status() != ClipStatus::Playing && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(clip.status(), ClipStatus::Playing);
    assert_eq!(mock.voice_count(), 1);
    system.shutdown();
}

#[test]
fn one_shot_queue_drains_through_the_stack() {
    let stack = manual_stack();
    let channel = stack.bus.create_channel("sfx");
    let clip = two_second_clip(&stack);

    channel.start_tick();
    channel.push_clip_to_queue(&clip);
    channel.push_clip_to_queue(&clip);
    channel.push_to_queue(Arc::new(test_data::silence(1, 8_000, 0.25)));
    assert_eq!(stack.mock.one_shot_count(), 0);

    stack.system.ticker().tick();
    assert_eq!(stack.mock.one_shot_count(), 3);
    assert_eq!(stack.mock.active_voice_count(), 3);

    stack.mock.advance(10.0);
    assert_eq!(stack.mock.active_voice_count(), 0);
}

#[test]
fn clip_ends_and_can_replay() {
    let stack = manual_stack();
    let channel = stack.bus.create_channel("music");
    let clip = two_second_clip(&stack);
    clip.set_channel(Some(&channel));

    clip.play().unwrap();
    stack.system.ticker().tick();
    stack.mock.advance(2.5);
    assert_eq!(clip.status(), ClipStatus::Stopped);

    clip.play().unwrap();
    stack.system.ticker().tick();
    assert_eq!(clip.status(), ClipStatus::Playing);
    assert_eq!(stack.mock.last_voice().unwrap().offset_seconds, 0.0);
}

#[test]
fn removing_a_channel_orphans_its_clips() {
    let stack = manual_stack();
    let channel = stack.bus.create_channel("music");
    let clip = two_second_clip(&stack);
    clip.set_channel(Some(&channel));
    drop(channel);

    assert!(stack.bus.remove_channel("music"));
    assert!(clip.play().is_err());
}

#[test]
fn volumes_multiply_down_the_graph() {
    let stack = manual_stack();
    let channel = stack.bus.create_channel("music");
    let clip = two_second_clip(&stack);
    clip.set_channel(Some(&channel));

    stack.bus.set_volume(0.5);
    channel.set_volume(0.5);
    clip.play().unwrap();
    stack.system.ticker().tick();

    let node = stack.mock.last_voice().unwrap().node;
    assert!((stack.mock.effective_gain(node) - 0.25).abs() < 1e-6);

    stack.bus.set_volume(1.0);
    assert!((stack.mock.effective_gain(node) - 0.5).abs() < 1e-6);
}
