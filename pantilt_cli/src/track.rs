//! Tracker assembly from config, script replay and the self-check.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use eyre::WrapErr;
use pantilt_core::error::Result as CoreResult;
use pantilt_core::{DynTracker, FrameResult, RunSummary, RunnerCfg, SettleCfg, TrackerBuilder};
use pantilt_hardware::{SimFrame, SimulatedMotionDetector, SimulatedPanTilt};
use pantilt_traits::clock::MonotonicClock;
use pantilt_traits::{CaptureGeometry, PanTiltMechanism, PanTiltSetting, Rect, Screen};

/// Diagnostics straight to stderr, one line each.
#[derive(Debug, Default)]
pub struct ConsoleScreen;

impl Screen for ConsoleScreen {
    fn begin_repaint(&self) {}

    fn write_line(&self, line: &str) {
        let _ = writeln!(std::io::stderr().lock(), "  | {line}");
    }
}

/// Command-line overrides layered on top of the config file.
#[derive(Debug, Default, Clone, Copy)]
pub struct TrackOverrides {
    pub frames: Option<u64>,
    pub settle_ms: Option<u64>,
    pub frame_rate: Option<u32>,
}

fn make_mechanism(cfg: &pantilt_config::Config) -> CoreResult<Box<dyn PanTiltMechanism + Send>> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        use pantilt_hardware::servo::{ServoPanTilt, ServoPins};
        let m = &cfg.mechanism;
        let servo = ServoPanTilt::new(ServoPins {
            pan: m.pan_pin,
            tilt: m.tilt_pin,
            pulse_min_us: m.pulse_min_us,
            pulse_max_us: m.pulse_max_us,
            period: Duration::from_millis(m.pwm_period_ms),
        })
        .map_err(|e| {
            eyre::Report::new(pantilt_core::hw_error::map_hw_error(
                &e,
                pantilt_core::hw_error::Collaborator::Mechanism,
            ))
        })
        .wrap_err("open servo pins")?;
        tracing::info!(pan_pin = m.pan_pin, tilt_pin = m.tilt_pin, "servo mount ready");
        Ok(Box::new(servo))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let initial: PanTiltSetting = (&cfg.mechanism).into();
        tracing::info!(%initial, "using simulated mount");
        Ok(Box::new(SimulatedPanTilt::new(initial)))
    }
}

fn build(
    cfg: &pantilt_config::Config,
    settle: SettleCfg,
    mechanism: Box<dyn PanTiltMechanism + Send>,
    screen: Arc<dyn Screen>,
) -> CoreResult<DynTracker<SimFrame>> {
    let capture: CaptureGeometry = (&cfg.capture).into();
    TrackerBuilder::new()
        .with_detector(Box::new(SimulatedMotionDetector::new(capture))
            as Box<dyn pantilt_traits::MotionDetector<Frame = SimFrame> + Send>)
        .with_mechanism(mechanism)
        .with_capture(capture)
        .with_calibration((&cfg.calibration).into())
        .with_settle(settle)
        .with_detect_settings((&cfg.detection).into())
        .with_initial_position((&cfg.mechanism).into())
        .with_screen(screen)
        .build()
}

fn screen_for(json: bool) -> Arc<dyn Screen> {
    if json {
        Arc::new(pantilt_core::TracingScreen)
    } else {
        Arc::new(ConsoleScreen)
    }
}

fn frame_line(n: u64, r: &FrameResult, json: bool) -> String {
    if json {
        let regions: Vec<_> = r
            .regions
            .iter()
            .map(|m| {
                serde_json::json!({
                    "x": m.region.x,
                    "y": m.region.y,
                    "width": m.region.width,
                    "height": m.region.height,
                    "area": m.area(),
                })
            })
            .collect();
        let target = r.targeted.map(|m| {
            let c = m.center();
            serde_json::json!({ "x": c.x, "y": c.y, "area": m.area() })
        });
        serde_json::json!({
            "event": "frame",
            "frame": n,
            "regions": regions,
            "target": target,
            "moved": r.moved,
            "in_motion": r.in_motion,
            "pan": r.position.pan(),
            "tilt": r.position.tilt(),
        })
        .to_string()
    } else {
        let target = r
            .targeted
            .map_or_else(|| "-".to_string(), |m| m.center().to_string());
        format!(
            "frame {n}: regions={} target={target} moved={} in_motion={} {}",
            r.regions.len(),
            if r.moved { "yes" } else { "no" },
            if r.in_motion { "yes" } else { "no" },
            r.position,
        )
    }
}

fn summary_line(s: &RunSummary, settles: u64, json: bool) -> String {
    if json {
        serde_json::json!({
            "event": "summary",
            "frames": s.frames,
            "detections": s.detections,
            "moves": s.moves,
            "settles": settles,
            "pan": s.final_position.pan(),
            "tilt": s.final_position.tilt(),
            "stopped_early": s.stopped_early,
        })
        .to_string()
    } else {
        format!(
            "tracking complete: frames={} detections={} moves={} settles={settles} final {}{}",
            s.frames,
            s.detections,
            s.moves,
            s.final_position,
            if s.stopped_early { " (interrupted)" } else { "" },
        )
    }
}

/// Replay `script` through a tracker built from `cfg`; prints per-frame lines and a summary.
pub fn run_track(
    cfg: &pantilt_config::Config,
    script: &Path,
    overrides: TrackOverrides,
    home: bool,
    json: bool,
    shutdown: &AtomicBool,
) -> CoreResult<RunSummary> {
    let frames = crate::script::load_script(script)?;
    tracing::info!(frames = frames.len(), script = %script.display(), "detection script loaded");

    let mut settle: SettleCfg = (&cfg.settle).into();
    if let Some(ms) = overrides.settle_ms {
        settle.settle = Duration::from_millis(ms);
    }
    let mut runner: RunnerCfg = (&cfg.runner).into();
    if let Some(n) = overrides.frames {
        runner.max_frames = n;
    }
    if let Some(hz) = overrides.frame_rate {
        runner.frame_rate_hz = hz;
    }

    let mechanism = make_mechanism(cfg)?;
    let mut tracker = build(cfg, settle, mechanism, screen_for(json))?;
    if home {
        tracker.home()?;
    }

    let stdout = std::io::stdout();
    let summary = pantilt_core::run_frames(
        &mut tracker,
        frames,
        &runner,
        &MonotonicClock::new(),
        shutdown,
        |n, r| {
            let _ = writeln!(stdout.lock(), "{}", frame_line(n, r, json));
        },
    )?;

    // Let the last countdown finish so the summary reflects it.
    if tracker.in_motion() && !tracker.wait_settled(tracker.settle_time() * 2) {
        tracing::warn!("mount still settling at exit");
    }
    let _ = writeln!(
        stdout.lock(),
        "{}",
        summary_line(&summary, tracker.settle_count(), json)
    );
    Ok(summary)
}

fn to_i32(v: u32) -> i32 {
    i32::try_from(v).unwrap_or(i32::MAX)
}

/// Drive the simulated loop toward an off-center target and require it to settle.
pub fn self_check(cfg: &pantilt_config::Config, json: bool) -> CoreResult<()> {
    let capture: CaptureGeometry = (&cfg.capture).into();
    let settle: SettleCfg = (&cfg.settle).into();
    let start: PanTiltSetting = (&cfg.mechanism).into();
    let mount = SimulatedPanTilt::new(start);
    let probe = mount.clone();
    let mut tracker = build(cfg, settle, Box::new(mount), screen_for(json))?;

    // Subject in the right-hand quarter, a tenth of the frame wide.
    let side = (capture.width / 10).max(4);
    let subject = Rect::new(
        to_i32(capture.width * 3 / 4) - to_i32(side / 2),
        to_i32(capture.height / 2) - to_i32(side / 2),
        side,
        side,
    );
    let r = tracker
        .process_frame(&SimFrame::with_regions([subject]))
        .wrap_err("self-check frame")?;
    if !r.moved || probe.position() == start {
        return Err(eyre::Report::new(pantilt_core::TrackerError::State(format!(
            "mount did not chase the target (position {})",
            probe.position()
        ))));
    }
    let wait = settle.settle + Duration::from_secs(1);
    if !tracker.wait_settled(wait) {
        return Err(eyre::Report::new(pantilt_core::TrackerError::State(format!(
            "mount did not settle within {}",
            pantilt_core::util::human_duration(wait)
        ))));
    }
    let line = if json {
        serde_json::json!({
            "event": "self_check",
            "ok": true,
            "pan": probe.position().pan(),
            "tilt": probe.position().tilt(),
        })
        .to_string()
    } else {
        format!("self-check ok: mount moved to {}", probe.position())
    };
    println!("{line}");
    Ok(())
}
