//! Stock `Screen` sinks.

use pantilt_traits::Screen;

/// Forwards diagnostics to `tracing` at info level under the `screen` target.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingScreen;

impl Screen for TracingScreen {
    fn begin_repaint(&self) {
        tracing::trace!(target: "screen", "begin repaint");
    }

    fn write_line(&self, line: &str) {
        tracing::info!(target: "screen", "{line}");
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScreen;

impl Screen for NullScreen {
    fn begin_repaint(&self) {}
    fn write_line(&self, _line: &str) {}
}
