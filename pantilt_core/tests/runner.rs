use std::sync::atomic::AtomicBool;
use std::time::Duration;

use pantilt_core::mocks::RecordingScreen;
use pantilt_core::{CaptureGeometry, Rect, RunnerCfg, SettleCfg, TrackerBuilder, run_frames};
use pantilt_hardware::{SimFrame, SimulatedMotionDetector, SimulatedPanTilt};
use pantilt_traits::ManualClock;
use rstest::rstest;

fn sim_tracker(
    mount: SimulatedPanTilt,
) -> pantilt_core::TrackerCore<SimulatedMotionDetector, SimulatedPanTilt> {
    sim_tracker_settling(mount, Duration::from_secs(10))
}

fn sim_tracker_settling(
    mount: SimulatedPanTilt,
    settle: Duration,
) -> pantilt_core::TrackerCore<SimulatedMotionDetector, SimulatedPanTilt> {
    let capture = CaptureGeometry::new(320, 240);
    TrackerBuilder::new()
        .with_detector(SimulatedMotionDetector::new(capture))
        .with_mechanism(mount)
        .with_capture(capture)
        .with_settle(SettleCfg {
            settle,
            hold_while_settling: false,
        })
        .with_screen(RecordingScreen::new())
        .build()
        .unwrap()
}

fn still_frames(n: usize) -> Vec<SimFrame> {
    vec![SimFrame::still(); n]
}

#[rstest]
#[case(10, 100_000)]
#[case(15, 66_666)]
#[case(1, 1_000_000)]
fn paces_each_frame_to_the_configured_rate(#[case] hz: u32, #[case] period_us: u64) {
    let mut t = sim_tracker(SimulatedPanTilt::default());
    let clock = ManualClock::new();
    let cfg = RunnerCfg {
        frame_rate_hz: hz,
        max_frames: 0,
    };
    let summary = run_frames(
        &mut t,
        still_frames(3),
        &cfg,
        &clock,
        &AtomicBool::new(false),
        |_, _| {},
    )
    .unwrap();
    assert_eq!(summary.frames, 3);
    assert_eq!(clock.sleeps(), vec![Duration::from_micros(period_us); 3]);
}

#[test]
fn max_frames_caps_the_run() {
    let mut t = sim_tracker(SimulatedPanTilt::default());
    let cfg = RunnerCfg {
        frame_rate_hz: 30,
        max_frames: 4,
    };
    let mut seen = Vec::new();
    let summary = run_frames(
        &mut t,
        still_frames(10),
        &cfg,
        &ManualClock::new(),
        &AtomicBool::new(false),
        |n, _| seen.push(n),
    )
    .unwrap();
    assert_eq!(summary.frames, 4);
    assert_eq!(seen, vec![1, 2, 3, 4]);
    assert!(!summary.stopped_early);
}

#[test]
fn shutdown_flag_stops_before_next_frame() {
    let mut t = sim_tracker(SimulatedPanTilt::default());
    let stop = AtomicBool::new(true);
    let summary = run_frames(
        &mut t,
        still_frames(5),
        &RunnerCfg::default(),
        &ManualClock::new(),
        &stop,
        |_, _| panic!("no frame should run"),
    )
    .unwrap();
    assert_eq!(summary.frames, 0);
    assert!(summary.stopped_early);
}

#[test]
fn summary_counts_detections_and_moves() {
    let mount = SimulatedPanTilt::default();
    let probe = mount.clone();
    let mut t = sim_tracker(mount);
    let frames = vec![
        SimFrame::with_regions([Rect::new(280, 100, 20, 20)]),
        // Detector relearns after the move and reports nothing.
        SimFrame::with_regions([Rect::new(280, 100, 20, 20)]),
        SimFrame::still(),
        SimFrame::with_regions([Rect::new(150, 110, 20, 20)]),
    ];
    let summary = run_frames(
        &mut t,
        frames,
        &RunnerCfg::default(),
        &ManualClock::new(),
        &AtomicBool::new(false),
        |_, _| {},
    )
    .unwrap();
    assert_eq!(summary.frames, 4);
    assert_eq!(summary.detections, 2);
    assert_eq!(summary.moves, 1);
    assert_eq!(summary.final_position, probe.position());
    assert!(summary.final_position.pan() > 50.0);
}

#[test]
fn summaries_only_count_their_own_run() {
    let mut t = sim_tracker_settling(SimulatedPanTilt::default(), Duration::from_millis(30));
    let stop = AtomicBool::new(false);
    let first = run_frames(
        &mut t,
        vec![SimFrame::with_regions([Rect::new(280, 100, 20, 20)])],
        &RunnerCfg::default(),
        &ManualClock::new(),
        &stop,
        |_, _| {},
    )
    .unwrap();
    assert_eq!(first.moves, 1);
    // The countdown armed by the first run completes between the two runs.
    assert!(t.wait_settled(Duration::from_secs(2)));
    assert_eq!(t.settle_count(), 1);

    let second = run_frames(
        &mut t,
        still_frames(2),
        &RunnerCfg::default(),
        &ManualClock::new(),
        &stop,
        |_, _| {},
    )
    .unwrap();
    assert_eq!(second.frames, 2);
    assert_eq!(second.moves, 0);
    assert_eq!(second.settles, 0);
}

#[test]
fn detector_error_aborts_with_frame_context() {
    let mut t = sim_tracker(SimulatedPanTilt::default());
    let frames = vec![
        SimFrame::still(),
        SimFrame::with_regions([Rect::new(-5, 0, 10, 10)]),
        SimFrame::still(),
    ];
    let mut ran = 0;
    let err = run_frames(
        &mut t,
        frames,
        &RunnerCfg::default(),
        &ManualClock::new(),
        &AtomicBool::new(false),
        |_, _| ran += 1,
    )
    .expect_err("bad frame");
    assert_eq!(ran, 1);
    assert!(format!("{err:#}").contains("frame 2"));
    assert!(matches!(
        err.downcast_ref::<pantilt_core::TrackerError>(),
        Some(pantilt_core::TrackerError::Detector(_))
    ));
}
