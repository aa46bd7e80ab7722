//! The motion-tracking control loop (`TrackerCore`).
//!
//! One call to [`TrackerCore::process_frame`] runs detection, picks a target,
//! asks the move strategy for the next mount position, commands the mount when
//! that position actually differs, and drives the settle state machine.

use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use pantilt_traits::{
    CaptureGeometry, DetectSettings, MotionDetector, MotionRegion, PanTiltMechanism,
    PanTiltSetting, Point, Screen,
};

use crate::error::{Result, TrackerError};
use crate::hw_error::{Collaborator, map_hw_error};
use crate::settle::{SettleMonitor, SettleState};
use crate::status::FrameResult;
use crate::strategy::{MovePlan, MoveStrategy};
use crate::target::TargetSelector;

pub struct TrackerCore<D: MotionDetector, M: PanTiltMechanism> {
    pub(crate) detector: D,
    pub(crate) mechanism: M,
    pub(crate) strategy: Box<dyn MoveStrategy + Send>,
    pub(crate) selector: Box<dyn TargetSelector + Send>,
    pub(crate) screen: Arc<dyn Screen>,
    pub(crate) settle: SettleMonitor,
    pub(crate) capture: CaptureGeometry,
    pub(crate) objective: Point,
    pub(crate) settings: DetectSettings,
    pub(crate) hold_while_settling: bool,
    pub(crate) home: PanTiltSetting,
    pub(crate) position: PanTiltSetting,
    // Last region actually aimed at; used for diagnostics on frames with no detection.
    pub(crate) last_target: Option<MotionRegion>,
    pub(crate) moves: u64,
    pub(crate) frames: u64,
}

impl<D: MotionDetector, M: PanTiltMechanism> core::fmt::Debug for TrackerCore<D, M> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("TrackerCore")
            .field("capture", &self.capture)
            .field("position", &self.position)
            .field("settle", &self.settle)
            .field("frames", &self.frames)
            .field("moves", &self.moves)
            .finish()
    }
}

impl<D: MotionDetector, M: PanTiltMechanism> TrackerCore<D, M> {
    /// Current mount position as last commanded.
    #[inline]
    pub fn position(&self) -> PanTiltSetting {
        self.position
    }

    #[inline]
    pub fn capture(&self) -> CaptureGeometry {
        self.capture
    }

    #[inline]
    pub fn objective(&self) -> Point {
        self.objective
    }

    pub fn in_motion(&self) -> bool {
        self.settle.in_motion()
    }

    pub fn settle_state(&self) -> SettleState {
        self.settle.state()
    }

    pub fn settle_time(&self) -> Duration {
        self.settle.settle_time()
    }

    /// Number of completed settle countdowns.
    pub fn settle_count(&self) -> u64 {
        self.settle.settled_count()
    }

    /// Number of actual mount moves commanded by the loop.
    #[inline]
    pub fn move_count(&self) -> u64 {
        self.moves
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frames
    }

    pub fn detect_settings(&self) -> &DetectSettings {
        &self.settings
    }

    pub fn set_detect_settings(&mut self, settings: DetectSettings) {
        tracing::debug!(?settings, "detect settings updated");
        self.settings = settings;
    }

    /// Change the quiet period after a move. Takes effect on the running countdown.
    pub fn set_settle_time(&mut self, settle: Duration) -> Result<()> {
        if settle.is_zero() {
            return Err(eyre::Report::new(TrackerError::Config(
                "settle time must be > 0".into(),
            )));
        }
        self.settle.set_settle_time(settle);
        Ok(())
    }

    /// Block until the mount has settled or `timeout` elapses. Returns whether it settled.
    pub fn wait_settled(&self, timeout: Duration) -> bool {
        self.settle.wait_idle(timeout)
    }

    pub fn mechanism(&self) -> &M {
        &self.mechanism
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    /// Command the mount to its home position.
    ///
    /// Always issues the command since the physical position is unknown at
    /// startup; only a change of position arms the settle countdown.
    pub fn home(&mut self) -> Result<()> {
        let target = self.home;
        self.mechanism
            .move_to(target)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e, Collaborator::Mechanism)))
            .wrap_err("homing mount")?;
        let changed = self.position != target;
        self.position = target;
        tracing::info!(%target, changed, "mount homed");
        if changed {
            self.moves += 1;
            self.after_move();
        }
        Ok(())
    }

    /// Run one frame of sense -> decide -> act.
    pub fn process_frame(&mut self, frame: &D::Frame) -> Result<FrameResult> {
        self.frames += 1;
        let detection = self
            .detector
            .detect(frame, &self.settings)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e, Collaborator::Detector)))
            .wrap_err("detecting motion")?;

        let holding = self.hold_while_settling && self.settle.in_motion();
        let chosen = if holding {
            None
        } else {
            self.selector.select(&detection)
        };

        if detection.is_detected() {
            self.screen.begin_repaint();
        }

        let target = chosen.map_or(self.objective, |r| r.center());
        let plan = self.strategy.plan(self.position, target, self.objective);
        tracing::debug!(
            frame = self.frames,
            regions = detection.regions().len(),
            holding,
            target_x = target.x,
            target_y = target.y,
            pan_deflection = plan.pan_deflection,
            tilt_deflection = plan.tilt_deflection,
            "frame decision"
        );

        let moved = plan.moves();
        if moved {
            self.apply(&plan)?;
        }

        let in_motion = self.settle.in_motion();
        if in_motion {
            // Never assume a region exists: fall back to the last target, or omit the size.
            match chosen.or(self.last_target) {
                Some(r) => self.screen.write_fmt_line(format_args!(
                    "Reacting to target {target}, size {}",
                    r.area()
                )),
                None => self
                    .screen
                    .write_fmt_line(format_args!("Reacting to target {target}")),
            }
        }
        if chosen.is_some() {
            self.last_target = chosen;
        }

        Ok(FrameResult {
            regions: detection.into_regions(),
            targeted: chosen,
            moved,
            in_motion,
            position: self.position,
        })
    }

    fn apply(&mut self, plan: &MovePlan) -> Result<()> {
        self.screen.write_fmt_line(format_args!(
            "Target={}, Objective={}",
            plan.target, plan.objective
        ));
        self.screen
            .write_fmt_line(format_args!("Moving {} -> {}", plan.from, plan.to));

        self.mechanism
            .move_to(plan.to)
            .map_err(|e| eyre::Report::new(map_hw_error(&*e, Collaborator::Mechanism)))
            .wrap_err("moving mount")?;
        self.position = plan.to;
        self.moves += 1;
        tracing::info!(from = %plan.from, to = %plan.to, "mount moved");
        self.after_move();
        Ok(())
    }

    fn after_move(&mut self) {
        let entered = self.settle.notify_moved();
        self.screen.write_line("Servo moved, awaiting motion settle");
        if entered {
            // Only the Idle -> InMotion edge re-baselines the detector.
            self.detector.reset();
            tracing::debug!("detector baseline reset");
        }
    }
}
