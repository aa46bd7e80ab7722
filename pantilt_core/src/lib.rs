#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Core pan-tilt tracking logic (hardware-agnostic).
//!
//! All device interaction goes through `pantilt_traits::MotionDetector` and
//! `pantilt_traits::PanTiltMechanism`; diagnostics go to an injected `Screen`.
//!
//! ## Architecture
//!
//! - **Calibration**: linear pixel-offset to deflection fit (`calibration`)
//! - **Strategy**: dead zone, resolution scaling and clamping (`strategy`)
//! - **Settle**: Idle/InMotion state machine with a background countdown (`settle`)
//! - **Control**: per-frame sense, decide, act (`TrackerCore`)
//! - **Runner**: paced frame loop with cooperative shutdown (`runner`)
//!
//! Positions are percentages of servo travel in `[0, 100]`; pixel offsets are
//! scaled into the calibration's reference resolution before the fit applies.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mocks;
pub mod runner;
pub mod screen;
pub mod settle;
pub mod status;
pub mod strategy;
pub mod target;
pub mod tracker;
pub mod util;

pub use builder::{DynTracker, Missing, TrackerBuilder, TrackerParts, build_tracker};
pub use calibration::{AxisFit, Calibration};
pub use config::{RunnerCfg, SettleCfg};
pub use error::{BuildError, Report, Result, TrackerError};
pub use runner::{RunSummary, run_frames};
pub use screen::{NullScreen, TracingScreen};
pub use settle::{SettleCore, SettleMonitor, SettleState};
pub use status::FrameResult;
pub use strategy::{CalibratedMoveStrategy, MovePlan, MoveStrategy};
pub use target::{BiggestMotion, TargetSelector};
pub use tracker::TrackerCore;

pub use pantilt_traits::{
    CaptureGeometry, DetectSettings, DetectionResult, MotionRegion, PanTiltSetting, Point, Rect,
};
