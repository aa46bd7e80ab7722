#![no_main]
use libfuzzer_sys::arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pantilt_core::strategy::{CalibratedMoveStrategy, MoveStrategy};
use pantilt_core::{Calibration, CaptureGeometry, PanTiltSetting, Point};

#[derive(Debug, Arbitrary)]
struct Input {
    width: u16,
    height: u16,
    pan: f64,
    tilt: f64,
    target_x: f64,
    target_y: f64,
}

fuzz_target!(|input: Input| {
    let capture = CaptureGeometry::new(
        u32::from(input.width).max(1),
        u32::from(input.height).max(1),
    );
    let strategy = CalibratedMoveStrategy::new(Calibration::default(), capture);
    let current = PanTiltSetting::new(input.pan, input.tilt);
    let plan = strategy.plan(current, Point::new(input.target_x, input.target_y), capture.center());
    // Mount positions never leave the travel range, even for non-finite input.
    assert!((0.0..=100.0).contains(&plan.to.pan()));
    assert!((0.0..=100.0).contains(&plan.to.tilt()));
});
