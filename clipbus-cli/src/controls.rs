use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use log::warn;

use clipbus_lib::clip::ClipStatus;

use crate::runner::Session;

pub struct StatusArgs {
    pub time: f64,
    pub duration: f64,
    pub status: ClipStatus,
    pub speed: f64,
    pub volume: f32,
    pub looping: bool,
}

pub fn status_text(args: StatusArgs) -> String {
    let state = match args.status {
        ClipStatus::Playing => "▶ Playing",
        ClipStatus::Paused => "⏸ Paused",
        ClipStatus::Stopped => "⏹ Stopped",
    };
    let current = format_time(args.time * 1000.0);
    let total = format_time(args.duration * 1000.0);
    let percent = if args.duration > 0.0 {
        (args.time / args.duration * 100.0).min(100.0)
    } else {
        0.0
    };
    let looping = if args.looping { "on" } else { "off" };

    format!(
        "{}   {} / {}   ({:>5.1}%)   speed {:.2}x   vol {:>3.0}%   loop {}",
        state,
        current,
        total,
        percent,
        args.speed,
        args.volume * 100.0,
        looping
    )
}

pub fn handle_key_event(session: &mut Session) -> bool {
    if event::poll(Duration::from_millis(100)).unwrap_or(false) {
        if let Ok(Event::Key(key)) = event::read() {
            if key.kind != KeyEventKind::Press {
                return true;
            }
            match key.code {
                KeyCode::Char('q') => {
                    session.clip.stop();
                    return false;
                }
                KeyCode::Char(' ') => {
                    if session.clip.status() == ClipStatus::Playing {
                        session.clip.pause();
                    } else if session.clip.play().is_ok() {
                        session.user_stopped = false;
                        session.pending_play = true;
                    }
                }
                KeyCode::Char('s') | KeyCode::Char('S') => {
                    session.clip.stop();
                    session.user_stopped = true;
                    session.pending_play = false;
                }
                KeyCode::Left => {
                    let current = session.clip.current_time();
                    session.clip.seek((current - 5.0).max(0.0));
                }
                KeyCode::Right => {
                    let current = session.clip.current_time();
                    let duration = session.clip.duration();
                    session.clip.seek((current + 5.0).min(duration));
                }
                KeyCode::Char('l') | KeyCode::Char('L') => {
                    let looping = session.clip.is_looping();
                    session.clip.set_loop(!looping);
                }
                KeyCode::Char('-') => {
                    let next = (session.clip.speed() - 0.25).max(0.25);
                    if let Err(err) = session.clip.set_speed(next) {
                        warn!("{}", err);
                    }
                }
                KeyCode::Char('=') | KeyCode::Char('+') => {
                    let next = (session.clip.speed() + 0.25).min(4.0);
                    if let Err(err) = session.clip.set_speed(next) {
                        warn!("{}", err);
                    }
                }
                KeyCode::Up => {
                    let next = (session.music.volume() + 0.05).min(1.0);
                    session.music.set_volume(next);
                }
                KeyCode::Down => {
                    let next = (session.music.volume() - 0.05).max(0.0);
                    session.music.set_volume(next);
                }
                KeyCode::Char('o') | KeyCode::Char('O') => {
                    session.sfx.push_clip_to_queue(&session.clip);
                }
                _ => {}
            }
        }
    }

    true
}

fn format_time(time: f64) -> String {
    let seconds = (time / 1000.0).ceil() as u32;
    let minutes = seconds / 60;
    let seconds = seconds % 60;
    let hours = minutes / 60;
    let minutes = minutes % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}
