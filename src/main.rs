mod action;
mod app;
mod chat;
mod config;
mod input;
mod minigame;
mod model;
mod orchestrator;
mod render;
mod sim;
mod timers;

use anyhow::{Context, Result};
use clap::Parser;
use std::fs::OpenOptions;

/// A virtual pet that lives in your terminal.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub(crate) struct Args {
    /// RNG seed; overrides the settings file. 0 means random.
    #[arg(long)]
    seed: Option<u64>,

    /// Log level written to the log file (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = clap::value_parser!(log::LevelFilter))]
    log_level: log::LevelFilter,

    /// Draw without colors
    #[arg(long)]
    mono: bool,

    /// Frame rate cap; overrides the settings file
    #[arg(long)]
    fps: Option<u32>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let paths = config::project_paths()?;

    // stdout belongs to the terminal UI, so logs go to a file
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&paths.log_path)
        .with_context(|| format!("opening {}", paths.log_path.display()))?;
    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp(None)
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    app::run(&args, paths)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_level_typos_are_rejected() {
        let args = Args::try_parse_from(["pocketpet", "--log-level", "debug"]).unwrap();
        assert_eq!(args.log_level, log::LevelFilter::Debug);
        assert_eq!(
            Args::try_parse_from(["pocketpet"]).unwrap().log_level,
            log::LevelFilter::Info
        );
        assert!(Args::try_parse_from(["pocketpet", "--log-level", "loud"]).is_err());
    }
}
