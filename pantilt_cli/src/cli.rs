//! CLI argument definitions and shared statics.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::OnceLock;

pub static FILE_GUARD: OnceLock<tracing_appender::non_blocking::WorkerGuard> = OnceLock::new();
/// Whether the user asked for JSON output (controls structured error output).
pub static JSON_MODE: OnceLock<bool> = OnceLock::new();

#[derive(Parser, Debug)]
#[command(name = "pantilt", version, about = "Pan-tilt motion tracker")]
pub struct Cli {
    /// Path to config TOML (typed)
    #[arg(long, value_name = "FILE", default_value = "etc/pantilt.toml")]
    pub config: PathBuf,

    /// Emit JSON lines (frames, summary, errors, logs) instead of text
    #[arg(long, action = ArgAction::SetTrue)]
    pub json: bool,

    /// Console log level (error|warn|info|debug|trace); overrides [logging].level
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Replay a detection script through the tracking loop
    Track {
        /// CSV with header `frame,x,y,width,height`; one row per moving region
        #[arg(long, value_name = "FILE")]
        script: PathBuf,
        /// Stop after this many frames (overrides runner.max_frames)
        #[arg(long, value_name = "N")]
        frames: Option<u64>,
        /// Override settle.settle_ms
        #[arg(long = "settle-ms", value_name = "MS")]
        settle_ms: Option<u64>,
        /// Override runner.frame_rate_hz
        #[arg(long = "frame-rate", value_name = "HZ")]
        frame_rate: Option<u32>,
        /// Do not command the home position before the first frame
        #[arg(long = "no-home", action = ArgAction::SetTrue)]
        no_home: bool,
    },
    /// Quick health check: the simulated loop must chase a target and settle
    SelfCheck,
}
