//! # Clipbus
//!
//! A command-line audio player built on the clipbus engine.

use log::error;

mod cli;
mod controls;
mod logging;
mod runner;

fn main() {
    dotenv::dotenv().ok();
    logging::init();

    let args = cli::args::build_cli().get_matches();

    let code = match runner::run(&args) {
        Ok(code) => code,
        Err(err) => {
            error!("{}", err);
            -1
        }
    };

    std::process::exit(code)
}
