//! Type-state builder for `TrackerCore` and the generic `build_tracker` constructor.
//!
//! The builder enforces at compile time that a detector and a mechanism are
//! provided before `build()` is available. Everything else has a default
//! except the capture geometry, which is checked at build time.

use std::sync::Arc;

use pantilt_traits::{
    CaptureGeometry, DetectSettings, MotionDetector, PanTiltMechanism, PanTiltSetting, Screen,
};

use crate::calibration::Calibration;
use crate::config::SettleCfg;
use crate::error::{BuildError, Result};
use crate::screen::TracingScreen;
use crate::settle::SettleMonitor;
use crate::strategy::{CalibratedMoveStrategy, MoveStrategy};
use crate::target::{BiggestMotion, TargetSelector};
use crate::tracker::TrackerCore;

/// Dynamically dispatched tracker over any detector producing frames of type `F`.
pub type DynTracker<F> = TrackerCore<
    Box<dyn MotionDetector<Frame = F> + Send>,
    Box<dyn PanTiltMechanism + Send>,
>;

// ── Type-state markers ───────────────────────────────────────────────────────

/// Placeholder for a collaborator that has not been supplied yet.
#[derive(Debug, Default, Clone, Copy)]
pub struct Missing;

/// Optional pieces shared by the builder and `build_tracker`.
pub struct TrackerParts {
    pub capture: Option<CaptureGeometry>,
    pub calibration: Calibration,
    pub settle: SettleCfg,
    pub detect: DetectSettings,
    pub initial: PanTiltSetting,
    pub screen: Option<Arc<dyn Screen>>,
    pub selector: Option<Box<dyn TargetSelector + Send>>,
    pub strategy: Option<Box<dyn MoveStrategy + Send>>,
}

impl Default for TrackerParts {
    fn default() -> Self {
        Self {
            capture: None,
            calibration: Calibration::default(),
            settle: SettleCfg::default(),
            detect: DetectSettings::default(),
            initial: PanTiltSetting::centered(),
            screen: None,
            selector: None,
            strategy: None,
        }
    }
}

/// Builder for `TrackerCore`. `D` and `M` start as [`Missing`].
pub struct TrackerBuilder<D = Missing, M = Missing> {
    detector: D,
    mechanism: M,
    parts: TrackerParts,
}

impl Default for TrackerBuilder<Missing, Missing> {
    fn default() -> Self {
        Self {
            detector: Missing,
            mechanism: Missing,
            parts: TrackerParts::default(),
        }
    }
}

impl TrackerBuilder<Missing, Missing> {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Validate the parts and construct a `TrackerCore`.
///
/// Single source of truth for validation, used by both
/// `TrackerBuilder::build()` and `build_tracker()`.
fn validate_and_build<D: MotionDetector, M: PanTiltMechanism>(
    detector: D,
    mechanism: M,
    parts: TrackerParts,
) -> Result<TrackerCore<D, M>> {
    // ── Validation ───────────────────────────────────────────────────────────
    let capture = parts
        .capture
        .ok_or_else(|| eyre::Report::new(BuildError::MissingCapture))?;
    if capture.width == 0 || capture.height == 0 {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "capture dimensions must be > 0",
        )));
    }
    if parts.settle.settle.is_zero() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "settle time must be > 0",
        )));
    }
    if !parts.calibration.is_valid() {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "calibration must be finite with a positive reference size",
        )));
    }
    if parts.detect.max_region_area != 0
        && parts.detect.max_region_area < parts.detect.min_region_area
    {
        return Err(eyre::Report::new(BuildError::InvalidConfig(
            "max_region_area must be 0 or >= min_region_area",
        )));
    }

    // ── Assemble ─────────────────────────────────────────────────────────────
    let screen: Arc<dyn Screen> = parts.screen.unwrap_or_else(|| Arc::new(TracingScreen));
    let strategy = parts
        .strategy
        .unwrap_or_else(|| Box::new(CalibratedMoveStrategy::new(parts.calibration, capture)));
    let selector = parts.selector.unwrap_or_else(|| Box::new(BiggestMotion));
    let settle = SettleMonitor::spawn(parts.settle.settle, screen.clone());

    tracing::debug!(
        %capture,
        settle_ms = parts.settle.settle.as_millis() as u64,
        hold_while_settling = parts.settle.hold_while_settling,
        home = %parts.initial,
        "tracker built"
    );

    Ok(TrackerCore {
        detector,
        mechanism,
        strategy,
        selector,
        screen,
        settle,
        capture,
        objective: capture.center(),
        settings: parts.detect,
        hold_while_settling: parts.settle.hold_while_settling,
        home: parts.initial,
        position: parts.initial,
        last_target: None,
        moves: 0,
        frames: 0,
    })
}

/// Chainable setters that do not affect type-state.
impl<D, M> TrackerBuilder<D, M> {
    pub fn with_capture(mut self, capture: CaptureGeometry) -> Self {
        self.parts.capture = Some(capture);
        self
    }
    pub fn with_calibration(mut self, calibration: Calibration) -> Self {
        self.parts.calibration = calibration;
        self
    }
    pub fn with_settle(mut self, settle: SettleCfg) -> Self {
        self.parts.settle = settle;
        self
    }
    pub fn with_detect_settings(mut self, detect: DetectSettings) -> Self {
        self.parts.detect = detect;
        self
    }
    /// Position the mount is assumed to hold at startup; also the `home()` target.
    pub fn with_initial_position(mut self, initial: PanTiltSetting) -> Self {
        self.parts.initial = initial;
        self
    }
    /// Diagnostics sink; defaults to [`TracingScreen`].
    pub fn with_screen(mut self, screen: Arc<dyn Screen>) -> Self {
        self.parts.screen = Some(screen);
        self
    }
    pub fn with_selector(mut self, selector: impl TargetSelector + Send + 'static) -> Self {
        self.parts.selector = Some(Box::new(selector));
        self
    }
    /// Replace the calibrated strategy. The calibration set on the builder is then unused.
    pub fn with_strategy(mut self, strategy: impl MoveStrategy + Send + 'static) -> Self {
        self.parts.strategy = Some(Box::new(strategy));
        self
    }
}

// Setters that advance type-state
impl<M> TrackerBuilder<Missing, M> {
    pub fn with_detector<D: MotionDetector>(self, detector: D) -> TrackerBuilder<D, M> {
        TrackerBuilder {
            detector,
            mechanism: self.mechanism,
            parts: self.parts,
        }
    }
}

impl<D> TrackerBuilder<D, Missing> {
    pub fn with_mechanism<M: PanTiltMechanism>(self, mechanism: M) -> TrackerBuilder<D, M> {
        TrackerBuilder {
            detector: self.detector,
            mechanism,
            parts: self.parts,
        }
    }
}

impl<D: MotionDetector, M: PanTiltMechanism> TrackerBuilder<D, M> {
    /// Validate and build. Only available once a detector and a mechanism are set.
    pub fn build(self) -> Result<TrackerCore<D, M>> {
        validate_and_build(self.detector, self.mechanism, self.parts)
    }
}

/// Build a statically-dispatched tracker from concrete collaborators.
///
/// Delegates to the same validation as the builder.
pub fn build_tracker<D, M>(
    detector: D,
    mechanism: M,
    parts: TrackerParts,
) -> Result<TrackerCore<D, M>>
where
    D: MotionDetector,
    M: PanTiltMechanism,
{
    validate_and_build(detector, mechanism, parts)
}
