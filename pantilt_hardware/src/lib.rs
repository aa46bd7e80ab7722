pub mod error;
#[cfg(feature = "hardware")]
pub mod servo;
pub mod util;

use pantilt_traits::{
    CaptureGeometry, DetectSettings, DetectionResult, MotionDetector, MotionRegion,
    PanTiltMechanism, PanTiltSetting, Rect,
};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::error::HwError;

#[derive(Debug)]
struct SimMount {
    position: PanTiltSetting,
    moves: u64,
    redundant: u64,
}

/// Simulated pan-tilt mount. Records where it was told to go.
///
/// Cloning yields a second handle onto the same mount, so a test can keep one
/// while the controller owns the other.
#[derive(Debug, Clone)]
pub struct SimulatedPanTilt {
    state: Arc<Mutex<SimMount>>,
}

impl SimulatedPanTilt {
    pub fn new(initial: PanTiltSetting) -> Self {
        Self {
            state: Arc::new(Mutex::new(SimMount {
                position: initial,
                moves: 0,
                redundant: 0,
            })),
        }
    }

    pub fn position(&self) -> PanTiltSetting {
        self.state
            .lock()
            .map(|s| s.position)
            .unwrap_or_else(|p| p.into_inner().position)
    }

    /// Number of commands that changed the position.
    pub fn moves(&self) -> u64 {
        self.state.lock().map(|s| s.moves).unwrap_or(0)
    }

    /// Number of commands to the position the mount was already at.
    pub fn redundant_commands(&self) -> u64 {
        self.state.lock().map(|s| s.redundant).unwrap_or(0)
    }
}

impl Default for SimulatedPanTilt {
    fn default() -> Self {
        Self::new(PanTiltSetting::centered())
    }
}

impl PanTiltMechanism for SimulatedPanTilt {
    fn move_to(
        &mut self,
        setting: PanTiltSetting,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut s = self
            .state
            .lock()
            .map_err(|_| HwError::Gpio("simulated mount poisoned".into()))?;
        if s.position == setting {
            s.redundant += 1;
            tracing::trace!(%setting, "simulated mount already in position");
            return Ok(());
        }
        tracing::debug!(from = %s.position, to = %setting, "simulated mount move");
        s.position = setting;
        s.moves += 1;
        Ok(())
    }
}

/// A frame for the simulated detector: the regions that are "moving" in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimFrame {
    pub regions: Vec<Rect>,
}

impl SimFrame {
    pub fn still() -> Self {
        Self::default()
    }

    pub fn with_regions(regions: impl Into<Vec<Rect>>) -> Self {
        Self {
            regions: regions.into(),
        }
    }
}

/// Replays the regions carried by each [`SimFrame`].
///
/// Models background subtraction closely enough for the control loop: after
/// `reset()` the detector has no baseline and reports nothing for
/// `relearn_frames` frames. Regions are filtered by the detect settings and
/// must lie inside the capture, otherwise the frame is rejected.
#[derive(Debug)]
pub struct SimulatedMotionDetector {
    capture: CaptureGeometry,
    relearn_frames: u32,
    relearn_left: u32,
    resets: Arc<AtomicU64>,
}

impl SimulatedMotionDetector {
    pub fn new(capture: CaptureGeometry) -> Self {
        Self {
            capture,
            relearn_frames: 1,
            relearn_left: 0,
            resets: Arc::new(AtomicU64::new(0)),
        }
    }

    #[must_use]
    pub fn with_relearn_frames(mut self, frames: u32) -> Self {
        self.relearn_frames = frames;
        self
    }

    /// Shared counter of `reset()` calls, readable after the detector is moved.
    pub fn reset_counter(&self) -> Arc<AtomicU64> {
        self.resets.clone()
    }

    fn inside_capture(&self, r: &Rect) -> bool {
        let right = i64::from(r.x) + i64::from(r.width);
        let bottom = i64::from(r.y) + i64::from(r.height);
        r.x >= 0
            && r.y >= 0
            && right <= i64::from(self.capture.width)
            && bottom <= i64::from(self.capture.height)
    }
}

impl MotionDetector for SimulatedMotionDetector {
    type Frame = SimFrame;

    fn detect(
        &mut self,
        frame: &SimFrame,
        settings: &DetectSettings,
    ) -> Result<DetectionResult, Box<dyn std::error::Error + Send + Sync>> {
        if let Some(bad) = frame.regions.iter().find(|r| !self.inside_capture(r)) {
            return Err(Box::new(HwError::Detector(format!(
                "region {bad:?} outside {} capture",
                self.capture
            ))));
        }
        if self.relearn_left > 0 {
            self.relearn_left -= 1;
            tracing::trace!(left = self.relearn_left, "simulated detector relearning baseline");
            return Ok(DetectionResult::empty());
        }
        Ok(frame
            .regions
            .iter()
            .copied()
            .map(MotionRegion::new)
            .filter(|m| settings.accepts(m))
            .collect())
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
        self.relearn_left = self.relearn_frames;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_mount_tolerates_redundant_commands() {
        let mut mount = SimulatedPanTilt::default();
        let probe = mount.clone();
        mount.move_to(PanTiltSetting::new(60.0, 40.0)).unwrap();
        mount.move_to(PanTiltSetting::new(60.0, 40.0)).unwrap();
        assert_eq!(probe.position(), PanTiltSetting::new(60.0, 40.0));
        assert_eq!(probe.moves(), 1);
        assert_eq!(probe.redundant_commands(), 1);
    }

    #[test]
    fn detector_goes_blind_after_reset() {
        let mut det = SimulatedMotionDetector::new(CaptureGeometry::new(320, 240));
        let resets = det.reset_counter();
        let frame = SimFrame::with_regions([Rect::new(10, 10, 20, 20)]);
        let settings = DetectSettings::default();

        assert!(det.detect(&frame, &settings).unwrap().is_detected());
        det.reset();
        assert!(!det.detect(&frame, &settings).unwrap().is_detected());
        assert!(det.detect(&frame, &settings).unwrap().is_detected());
        assert_eq!(resets.load(Ordering::Relaxed), 1);
    }
}
