use pantilt_core::{
    Calibration, CalibratedMoveStrategy, CaptureGeometry, MoveStrategy, PanTiltSetting, Point,
};
use proptest::prelude::*;

prop_compose! {
    fn setting_strategy()(pan in 0.0f64..=100.0, tilt in 0.0f64..=100.0) -> PanTiltSetting {
        PanTiltSetting::new(pan, tilt)
    }
}

prop_compose! {
    fn capture_strategy()(w in 16u32..4096, h in 16u32..4096) -> CaptureGeometry {
        CaptureGeometry::new(w, h)
    }
}

proptest! {
    #[test]
    fn result_always_within_travel(
        current in setting_strategy(),
        capture in capture_strategy(),
        tx in -10_000.0f64..10_000.0,
        ty in -10_000.0f64..10_000.0,
    ) {
        let s = CalibratedMoveStrategy::new(Calibration::default(), capture);
        let p = s.plan(current, Point::new(tx, ty), capture.center());
        prop_assert!((0.0..=100.0).contains(&p.to.pan()));
        prop_assert!((0.0..=100.0).contains(&p.to.tilt()));
    }

    #[test]
    fn target_on_objective_is_stable(
        current in setting_strategy(),
        capture in capture_strategy(),
    ) {
        let s = CalibratedMoveStrategy::new(Calibration::default(), capture);
        let o = capture.center();
        let p = s.plan(current, o, o);
        prop_assert_eq!(p.to, current);
        prop_assert!(!p.moves());
    }

    #[test]
    fn scaled_offset_inside_dead_zone_gives_zero_deflection(
        current in setting_strategy(),
        capture in capture_strategy(),
        sx in -10.0f64..=10.0,
        sy in -10.0f64..=10.0,
    ) {
        let s = CalibratedMoveStrategy::new(Calibration::default(), capture);
        let (kx, ky) = s.scale();
        let o = capture.center();
        // Back out a raw offset whose scaled magnitude is at most 10.
        let target = Point::new(o.x + sx / kx, o.y + sy / ky);
        let p = s.plan(current, target, o);
        prop_assume!(p.scaled_offset.0.abs() <= 10.0 && p.scaled_offset.1.abs() <= 10.0);
        prop_assert_eq!(p.pan_deflection, 0.0);
        prop_assert_eq!(p.tilt_deflection, 0.0);
        prop_assert_eq!(p.to, current);
    }

    #[test]
    fn doubling_resolution_doubles_scaled_offset(
        w in 16u32..2048,
        h in 16u32..2048,
        dx in -200.0f64..200.0,
        dy in -200.0f64..200.0,
    ) {
        let base = CalibratedMoveStrategy::new(Calibration::default(), CaptureGeometry::new(w, h));
        let double =
            CalibratedMoveStrategy::new(Calibration::default(), CaptureGeometry::new(w * 2, h * 2));
        let o = Point::new(0.0, 0.0);
        let t = Point::new(dx, dy);
        let a = base.plan(PanTiltSetting::centered(), t, o).scaled_offset;
        let b = double.plan(PanTiltSetting::centered(), t, o).scaled_offset;
        prop_assert!((b.0 - 2.0 * a.0).abs() < 1e-9);
        prop_assert!((b.1 - 2.0 * a.1).abs() < 1e-9);
    }

    #[test]
    fn planning_is_deterministic(
        current in setting_strategy(),
        tx in 0.0f64..640.0,
        ty in 0.0f64..480.0,
    ) {
        let capture = CaptureGeometry::new(640, 480);
        let s = CalibratedMoveStrategy::new(Calibration::default(), capture);
        let t = Point::new(tx, ty);
        prop_assert_eq!(s.plan(current, t, capture.center()), s.plan(current, t, capture.center()));
    }
}
