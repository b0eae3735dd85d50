use std::io::{self, Write};
use std::sync::Arc;
use std::thread::sleep;
use std::time::{Duration, Instant};

use clap::ArgMatches;
use crossterm::{
    cursor, execute,
    terminal::{self, Clear, ClearType},
};
use log::{info, warn};

use clipbus_lib::backend::rodio::RodioBackend;
use clipbus_lib::bus::Bus;
use clipbus_lib::channel::Channel;
use clipbus_lib::clip::{Clip, ClipStatus};
use clipbus_lib::decode;
use clipbus_lib::error::AudioError;
use clipbus_lib::system::AudioSystem;

use crate::controls;

pub struct Session {
    pub clip: Clip,
    pub music: Arc<Channel>,
    pub sfx: Arc<Channel>,
    pub user_stopped: bool,
    pub pending_play: bool,
}

pub fn run(args: &ArgMatches) -> Result<i32, AudioError> {
    info!("Starting clipbus");

    let file_path = args.get_one::<String>("INPUT").unwrap().clone();
    let volume = args
        .get_one::<String>("volume")
        .unwrap()
        .parse::<f32>()
        .unwrap();
    let speed = args
        .get_one::<String>("speed")
        .unwrap()
        .parse::<f64>()
        .unwrap();
    let seek = args
        .get_one::<String>("seek")
        .map(|value| value.parse::<f64>().unwrap());
    let looped = args.get_flag("loop");
    let quiet = args.get_flag("quiet");

    // Decode up front so a bad input fails before the output device opens.
    let source = Arc::new(decode::decode_file(&file_path)?);
    info!(
        "Decoded {}: {} channels at {} Hz, {:.2}s",
        file_path,
        source.channels(),
        source.sample_rate(),
        source.duration_seconds()
    );

    let backend = RodioBackend::new();
    let system = AudioSystem::new(Arc::new(backend.clone()));
    let bus = Bus::new(&system);
    let music = bus.create_channel("music");
    let sfx = bus.create_channel("sfx");
    sfx.start_tick();
    music.set_volume((volume / 100.0).clamp(0.0, 1.0));

    let clip = Clip::new(source, &system);
    clip.set_channel(Some(&music));
    if looped {
        clip.set_loop(true);
    }
    if speed != 1.0 {
        clip.set_speed(speed)?;
    }

    clip.play()?;

    // The start lands on the next frame; wait for it before seeking.
    let start_deadline = Instant::now() + Duration::from_secs(2);
    while clip.status() != ClipStatus::Playing && Instant::now() < start_deadline {
        sleep(Duration::from_millis(10));
    }
    if clip.status() != ClipStatus::Playing {
        warn!("playback did not start within 2s");
    }
    if let Some(position) = seek {
        clip.seek(position);
    }

    let _raw_mode = RawModeGuard::enable().ok();

    let mut session = Session {
        clip,
        music,
        sfx,
        user_stopped: false,
        pending_play: true,
    };
    let mut started = false;

    // UI / input loop.
    loop {
        let status = session.clip.status();
        if status == ClipStatus::Playing {
            started = true;
            session.pending_play = false;
        }
        if started
            && status == ClipStatus::Stopped
            && !session.user_stopped
            && !session.pending_play
        {
            break;
        }

        if !quiet {
            let line = controls::status_text(controls::StatusArgs {
                time: session.clip.current_time(),
                duration: session.clip.duration(),
                status,
                speed: session.clip.speed(),
                volume: session.music.volume(),
                looping: session.clip.is_looping(),
            });
            draw_status(&line);
        }

        if !controls::handle_key_event(&mut session) {
            break;
        }

        sleep(Duration::from_millis(50));
    }

    // Restore the terminal state before exiting.
    if !quiet {
        let mut stdout = io::stdout();
        let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
    }

    session.clip.destroy();
    system.shutdown();
    backend.close();

    Ok(0)
}

fn draw_status(line: &str) {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine));
    print!("{}", line);
    let _ = stdout.flush();
}

struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}
