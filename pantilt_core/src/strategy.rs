//! Move strategies: turn a target/objective pixel pair into the next mount position.

use pantilt_traits::{CaptureGeometry, PanTiltSetting, Point};

use crate::calibration::Calibration;

/// Outcome of one strategy evaluation. Pure data; nothing has been commanded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovePlan {
    pub from: PanTiltSetting,
    pub to: PanTiltSetting,
    pub target: Point,
    pub objective: Point,
    /// Target minus objective, in calibration reference pixels.
    pub scaled_offset: (f64, f64),
    pub pan_deflection: f64,
    pub tilt_deflection: f64,
}

impl MovePlan {
    /// True when the clamped result differs from where the mount already is.
    #[inline]
    pub fn moves(&self) -> bool {
        self.to != self.from
    }
}

pub trait MoveStrategy {
    fn plan(&self, current: PanTiltSetting, target: Point, objective: Point) -> MovePlan;
}

/// Proportional correction from a linear calibration fit.
#[derive(Debug, Clone, Copy)]
pub struct CalibratedMoveStrategy {
    calibration: Calibration,
    x_scale: f64,
    y_scale: f64,
}

impl CalibratedMoveStrategy {
    /// Scale factors are fixed here from the capture geometry; the geometry
    /// never changes for the lifetime of a tracker.
    pub fn new(calibration: Calibration, capture: CaptureGeometry) -> Self {
        let x_scale = f64::from(capture.width) / f64::from(calibration.reference.width.max(1));
        let y_scale = f64::from(capture.height) / f64::from(calibration.reference.height.max(1));
        Self {
            calibration,
            x_scale,
            y_scale,
        }
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.x_scale, self.y_scale)
    }

    #[inline]
    fn deflect(&self, scaled: f64, fit: crate::calibration::AxisFit) -> f64 {
        if scaled.abs() <= self.calibration.dead_zone_px {
            0.0
        } else {
            fit.apply(scaled)
        }
    }
}

impl MoveStrategy for CalibratedMoveStrategy {
    fn plan(&self, current: PanTiltSetting, target: Point, objective: Point) -> MovePlan {
        let (dx, dy) = target.offset_from(objective);
        let scaled_dx = dx * self.x_scale;
        let scaled_dy = dy * self.y_scale;

        let pan_deflection = self.deflect(scaled_dx, self.calibration.pan);
        let tilt_deflection = self.deflect(scaled_dy, self.calibration.tilt);

        // Inside the dead zone on both axes the current value is returned as-is.
        let to = if pan_deflection == 0.0 && tilt_deflection == 0.0 {
            current
        } else {
            current.offset_by(pan_deflection, tilt_deflection)
        };

        MovePlan {
            from: current,
            to,
            target,
            objective,
            scaled_offset: (scaled_dx, scaled_dy),
            pan_deflection,
            tilt_deflection,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strategy(w: u32, h: u32) -> CalibratedMoveStrategy {
        CalibratedMoveStrategy::new(Calibration::default(), CaptureGeometry::new(w, h))
    }

    #[test]
    fn centered_target_does_not_move() {
        let s = strategy(320, 240);
        let current = PanTiltSetting::new(30.0, 70.0);
        let p = s.plan(current, Point::new(160.0, 120.0), Point::new(160.0, 120.0));
        assert_eq!(p.pan_deflection, 0.0);
        assert_eq!(p.tilt_deflection, 0.0);
        assert_eq!(p.to, current);
        assert!(!p.moves());
    }

    #[test]
    fn offset_scales_with_capture() {
        let s = strategy(640, 480);
        assert_eq!(s.scale(), (2.0, 2.0));
        let p = s.plan(
            PanTiltSetting::centered(),
            Point::new(340.0, 240.0),
            Point::new(320.0, 240.0),
        );
        assert_eq!(p.scaled_offset, (40.0, 0.0));
        let expected = 0.0933 * 40.0 + 0.0864;
        assert!((p.pan_deflection - expected).abs() < 1e-12);
        assert_eq!(p.tilt_deflection, 0.0);
        assert!((p.to.pan() - (50.0 + expected)).abs() < 1e-12);
        assert_eq!(p.to.tilt(), 50.0);
    }

    #[test]
    fn dead_zone_boundary_is_inclusive() {
        let s = strategy(320, 240);
        let o = Point::new(160.0, 120.0);
        let at_edge = s.plan(PanTiltSetting::centered(), Point::new(170.0, 110.0), o);
        assert_eq!((at_edge.pan_deflection, at_edge.tilt_deflection), (0.0, 0.0));
        let past = s.plan(PanTiltSetting::centered(), Point::new(170.5, 120.0), o);
        assert!(past.pan_deflection > 0.0);
    }

    #[test]
    fn negative_offsets_deflect_the_other_way() {
        let s = strategy(320, 240);
        let p = s.plan(
            PanTiltSetting::centered(),
            Point::new(60.0, 20.0),
            Point::new(160.0, 120.0),
        );
        assert!((p.pan_deflection - (0.0933 * -100.0 + 0.0864)).abs() < 1e-12);
        assert!((p.tilt_deflection - (0.0812 * -100.0 + 0.2091)).abs() < 1e-12);
        assert!(p.to.pan() < 50.0 && p.to.tilt() < 50.0);
    }

    #[test]
    fn clamped_at_travel_limit_is_not_a_move() {
        let s = strategy(320, 240);
        let p = s.plan(
            PanTiltSetting::new(100.0, 50.0),
            Point::new(300.0, 120.0),
            Point::new(160.0, 120.0),
        );
        assert!(p.pan_deflection > 0.0);
        assert_eq!(p.to, p.from);
        assert!(!p.moves());
    }
}
