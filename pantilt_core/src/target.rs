//! Target selection, injected into the tracker.

use pantilt_traits::{DetectionResult, MotionRegion};

/// Picks which detected region to aim at. `None` means aim at the objective.
pub trait TargetSelector {
    fn select(&self, detection: &DetectionResult) -> Option<MotionRegion>;
}

/// Default policy: the largest region, first one wins on ties.
#[derive(Debug, Default, Clone, Copy)]
pub struct BiggestMotion;

impl TargetSelector for BiggestMotion {
    fn select(&self, detection: &DetectionResult) -> Option<MotionRegion> {
        if !detection.is_detected() {
            return None;
        }
        detection.biggest().copied()
    }
}

impl<F> TargetSelector for F
where
    F: Fn(&DetectionResult) -> Option<MotionRegion>,
{
    fn select(&self, detection: &DetectionResult) -> Option<MotionRegion> {
        self(detection)
    }
}
