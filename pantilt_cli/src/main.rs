mod cli;
mod error_fmt;
mod logging;
mod script;
mod track;

use clap::Parser;
use cli::{Cli, Commands, JSON_MODE};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    if let Err(err) = run(cli) {
        let json = JSON_MODE.get().copied().unwrap_or(false);
        tracing::error!(error = %format!("{err:#}"), "pantilt failed");
        if json {
            eprintln!("{}", error_fmt::format_error_json(&err));
        } else {
            eprintln!("{}", error_fmt::humanize(&err));
        }
        std::process::exit(error_fmt::exit_code_for_error(&err));
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    // Config failures map to the config exit code.
    let cfg = pantilt_config::load_file(&cli.config).map_err(|e| {
        eyre::Report::new(pantilt_core::TrackerError::Config(format!("{e:#}")))
    })?;
    logging::init_tracing(cli.json, cli.log_level.as_deref(), &cfg.logging);
    tracing::debug!(config = %cli.config.display(), "config loaded");

    let shutdown = Arc::new(AtomicBool::new(false));
    {
        let flag = shutdown.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            flag.store(true, Ordering::Relaxed);
        }) {
            tracing::warn!(error = %e, "failed to install Ctrl-C handler");
        }
    }

    match cli.cmd {
        Commands::Track {
            script,
            frames,
            settle_ms,
            frame_rate,
            no_home,
        } => {
            let overrides = track::TrackOverrides {
                frames,
                settle_ms,
                frame_rate,
            };
            track::run_track(&cfg, &script, overrides, !no_home, cli.json, &shutdown)?;
        }
        Commands::SelfCheck => track::self_check(&cfg, cli.json)?,
    }
    Ok(())
}
