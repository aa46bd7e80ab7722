//! Tracing setup: console on stderr, optional JSON file sink.

use crate::cli::FILE_GUARD;
use pantilt_config::Logging;
use std::path::Path;
use tracing_subscriber::{EnvFilter, Layer, fmt, prelude::*};

/// Console level precedence: `RUST_LOG`, then `--log-level`, then `[logging].level`, then `info`.
pub fn init_tracing(json: bool, cli_level: Option<&str>, logging: &Logging) {
    let level = cli_level
        .or(logging.level.as_deref())
        .unwrap_or("info")
        .to_string();
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&level));

    // stdout is reserved for frame output.
    let console = if json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(false)
            .boxed()
    };

    let file = logging.file.as_deref().map(|path| {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "pantilt.log".into());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .boxed()
    });

    if tracing_subscriber::registry()
        .with(filter)
        .with(console)
        .with(file)
        .try_init()
        .is_err()
    {
        eprintln!("tracing already initialized; keeping existing subscriber");
    }
}
