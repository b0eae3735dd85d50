//! CLI argument definitions for `clipbus-cli`.

use clap::{Arg, ArgAction, Command};

/// Build the CLI argument parser and command definitions.
pub fn build_cli() -> Command {
    // Build the CLI definition in one place to keep main.rs slim.
    Command::new("Clipbus")
        .version("1.0")
        .about("Play audio clips over the clipbus engine")
        .arg_required_else_help(true)
        .arg(
            Arg::new("volume")
                .long("volume")
                .value_name("PERCENT")
                .default_value("70")
                .help("Channel volume as a percentage (0-100)"),
        )
        .arg(
            Arg::new("speed")
                .long("speed")
                .value_name("RATE")
                .default_value("1.0")
                .help("Playback rate multiplier"),
        )
        .arg(
            Arg::new("seek")
                .long("seek")
                .short('s')
                .value_name("SECONDS")
                .help("Start playback from the given source position"),
        )
        .arg(
            Arg::new("loop")
                .long("loop")
                .short('l')
                .action(ArgAction::SetTrue)
                .help("Loop the clip until stopped"),
        )
        .arg(
            Arg::new("quiet")
                .long("quiet")
                .short('q')
                .action(ArgAction::SetTrue)
                .help("Suppress the status line"),
        )
        .arg(
            Arg::new("INPUT")
                .help("The input audio file path")
                .required(true)
                .index(1),
        )
}
