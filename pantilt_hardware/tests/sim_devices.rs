use pantilt_hardware::error::HwError;
use pantilt_hardware::{SimFrame, SimulatedMotionDetector};
use pantilt_traits::{CaptureGeometry, DetectSettings, MotionDetector, Rect};
use rstest::rstest;

#[rstest]
#[case(0, 0, 3)]
#[case(100, 0, 2)]
#[case(100, 500, 1)]
#[case(10_000, 0, 0)]
fn detector_applies_area_bounds(#[case] min: u64, #[case] max: u64, #[case] expected: usize) {
    let mut det = SimulatedMotionDetector::new(CaptureGeometry::new(320, 240));
    let frame = SimFrame::with_regions([
        Rect::new(0, 0, 5, 5),     // 25
        Rect::new(10, 10, 20, 20), // 400
        Rect::new(50, 50, 40, 40), // 1600
    ]);
    let settings = DetectSettings {
        min_region_area: min,
        max_region_area: max,
    };
    let result = det.detect(&frame, &settings).expect("detect");
    assert_eq!(result.regions().len(), expected);
}

#[test]
fn detector_rejects_regions_outside_capture() {
    let mut det = SimulatedMotionDetector::new(CaptureGeometry::new(320, 240));
    let frame = SimFrame::with_regions([Rect::new(300, 200, 40, 10)]);
    let err = det
        .detect(&frame, &DetectSettings::default())
        .expect_err("out of bounds");
    let hw = err.downcast_ref::<HwError>().expect("typed HwError");
    assert!(matches!(hw, HwError::Detector(_)), "unexpected: {hw:?}");
}

#[test]
fn relearn_window_is_configurable() {
    let mut det =
        SimulatedMotionDetector::new(CaptureGeometry::new(320, 240)).with_relearn_frames(3);
    let frame = SimFrame::with_regions([Rect::new(10, 10, 10, 10)]);
    let settings = DetectSettings::default();
    det.reset();
    for _ in 0..3 {
        assert!(!det.detect(&frame, &settings).unwrap().is_detected());
    }
    assert!(det.detect(&frame, &settings).unwrap().is_detected());
}

#[test]
fn still_frame_reports_nothing() {
    let mut det = SimulatedMotionDetector::new(CaptureGeometry::new(64, 48));
    let result = det
        .detect(&SimFrame::still(), &DetectSettings::default())
        .unwrap();
    assert!(!result.is_detected());
    assert!(result.biggest().is_none());
}
