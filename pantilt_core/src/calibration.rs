//! Linear pixel-offset to deflection calibration.

use pantilt_traits::CaptureGeometry;

/// One axis of the fit: `deflection_percent = slope * offset_px + intercept`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisFit {
    pub slope: f64,
    pub intercept: f64,
}

impl AxisFit {
    #[inline]
    pub fn apply(&self, offset_px: f64) -> f64 {
        self.slope * offset_px + self.intercept
    }
}

/// Coefficients measured once at a reference resolution.
///
/// Offsets are scaled from the live capture into `reference` pixels before
/// the fit is applied, and anything within `dead_zone_px` of the objective
/// (after scaling) produces no deflection on that axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub pan: AxisFit,
    pub tilt: AxisFit,
    pub dead_zone_px: f64,
    pub reference: CaptureGeometry,
}

impl Calibration {
    pub const REFERENCE: CaptureGeometry = CaptureGeometry::new(320, 240);
    pub const DEAD_ZONE_PX: f64 = 10.0;

    pub fn is_valid(&self) -> bool {
        [
            self.pan.slope,
            self.pan.intercept,
            self.tilt.slope,
            self.tilt.intercept,
        ]
        .iter()
        .all(|v| v.is_finite())
            && self.dead_zone_px.is_finite()
            && self.dead_zone_px >= 0.0
            && self.reference.width > 0
            && self.reference.height > 0
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            pan: AxisFit {
                slope: 0.0933,
                intercept: 0.0864,
            },
            tilt: AxisFit {
                slope: 0.0812,
                intercept: 0.2091,
            },
            dead_zone_px: Self::DEAD_ZONE_PX,
            reference: Self::REFERENCE,
        }
    }
}
