//! Per-frame output of the tracking loop.

use pantilt_traits::{MotionRegion, PanTiltSetting};

#[derive(Debug, Clone, PartialEq)]
pub struct FrameResult {
    /// Every region the detector reported, in detector order.
    pub regions: Vec<MotionRegion>,
    /// The region the tracker aimed at this frame, if any.
    pub targeted: Option<MotionRegion>,
    /// Whether the mount was commanded this frame.
    pub moved: bool,
    /// Settle state observed at the end of the frame.
    pub in_motion: bool,
    /// Mount position after this frame.
    pub position: PanTiltSetting,
}

impl FrameResult {
    #[inline]
    pub fn is_detected(&self) -> bool {
        !self.regions.is_empty()
    }
}
