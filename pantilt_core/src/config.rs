//! Runtime configuration types for the tracker.
//!
//! These are what `TrackerCore` consumes. They are separate from the
//! TOML-deserialized config in `pantilt_config`.

use std::time::Duration;

/// Settle/debounce configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettleCfg {
    /// Quiet period after a move before perception is trusted again.
    pub settle: Duration,
    /// While settling, report detections but keep aiming at the objective.
    pub hold_while_settling: bool,
}

impl Default for SettleCfg {
    fn default() -> Self {
        Self {
            settle: Duration::from_millis(1000),
            hold_while_settling: false,
        }
    }
}

/// Frame loop pacing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerCfg {
    pub frame_rate_hz: u32,
    /// 0 = no cap
    pub max_frames: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            frame_rate_hz: 15,
            max_frames: 0,
        }
    }
}
