use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use eyre::WrapErr;
use pantilt_traits::clock::Clock;
use pantilt_traits::{MotionDetector, PanTiltMechanism, PanTiltSetting};

use crate::config::RunnerCfg;
use crate::error::Result as CoreResult;
use crate::status::FrameResult;
use crate::tracker::TrackerCore;

/// Totals for one `run_frames` call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub frames: u64,
    /// Frames where the detector reported at least one region.
    pub detections: u64,
    pub moves: u64,
    /// Settle countdowns completed during the run, including ones armed before it.
    pub settles: u64,
    pub final_position: PanTiltSetting,
    /// The shutdown flag ended the run before the source was exhausted.
    pub stopped_early: bool,
}

/// Frame budget for a run: the remainder of `period` after `spent`, if any.
#[inline]
fn remaining(period: Duration, spent: Duration) -> Option<Duration> {
    period.checked_sub(spent).filter(|d| !d.is_zero())
}

/// Drive the tracker over `frames` at `cfg.frame_rate_hz`.
///
/// Stops when the source is exhausted, after `cfg.max_frames` frames (0 = no
/// cap), or when `shutdown` is observed between frames. `on_frame` sees every
/// result with its 1-based frame number. The first error aborts the run.
pub fn run_frames<D, M, C, I, F>(
    tracker: &mut TrackerCore<D, M>,
    frames: I,
    cfg: &RunnerCfg,
    clock: &C,
    shutdown: &AtomicBool,
    mut on_frame: F,
) -> CoreResult<RunSummary>
where
    D: MotionDetector,
    M: PanTiltMechanism,
    C: Clock + ?Sized,
    I: IntoIterator<Item = D::Frame>,
    F: FnMut(u64, &FrameResult),
{
    let period = Duration::from_micros(crate::util::period_us(cfg.frame_rate_hz));
    let limit = if cfg.max_frames == 0 {
        usize::MAX
    } else {
        usize::try_from(cfg.max_frames).unwrap_or(usize::MAX)
    };
    let moves_before = tracker.move_count();
    let settles_before = tracker.settle_count();
    let epoch = clock.now();

    tracing::info!(
        frame_rate_hz = cfg.frame_rate_hz,
        max_frames = cfg.max_frames,
        settle = %crate::util::human_duration(tracker.settle_time()),
        "tracking start"
    );

    let mut n: u64 = 0;
    let mut detections: u64 = 0;
    let mut stopped_early = false;
    for frame in frames.into_iter().take(limit) {
        if shutdown.load(Ordering::Relaxed) {
            tracing::warn!(frames = n, "shutdown requested; stopping");
            stopped_early = true;
            break;
        }
        let started = clock.now();
        n += 1;
        let result = tracker
            .process_frame(&frame)
            .wrap_err_with(|| format!("frame {n}"))?;
        if result.is_detected() {
            detections += 1;
        }
        on_frame(n, &result);

        let spent = clock.now().saturating_duration_since(started);
        if let Some(rest) = remaining(period, spent) {
            clock.sleep(rest);
        }
    }

    let summary = RunSummary {
        frames: n,
        detections,
        moves: tracker.move_count() - moves_before,
        settles: tracker.settle_count() - settles_before,
        final_position: tracker.position(),
        stopped_early,
    };
    tracing::info!(
        frames = summary.frames,
        detections = summary.detections,
        moves = summary.moves,
        elapsed_ms = clock.ms_since(epoch),
        position = %summary.final_position,
        "tracking finished"
    );
    Ok(summary)
}
