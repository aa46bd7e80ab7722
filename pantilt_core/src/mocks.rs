//! Test and helper doubles for pantilt_core.
//!
//! Shared by unit tests, integration tests and the CLI self-check. Each double
//! hands out a probe (via `Clone` or `Arc`) so assertions can be made after
//! the double has been moved into a tracker.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use pantilt_traits::{
    DetectSettings, DetectionResult, MotionDetector, PanTiltMechanism, PanTiltSetting, Rect,
    Screen,
};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Captures every diagnostic line.
#[derive(Debug, Default)]
pub struct RecordingScreen {
    lines: Mutex<Vec<String>>,
    repaints: AtomicU64,
}

impl RecordingScreen {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded lines equal to `line`.
    pub fn count(&self, line: &str) -> usize {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|l| l.as_str() == line)
            .count()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|l| l.contains(needle))
    }

    pub fn repaints(&self) -> u64 {
        self.repaints.load(Ordering::Relaxed)
    }
}

impl Screen for RecordingScreen {
    fn begin_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::Relaxed);
    }

    fn write_line(&self, line: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(line.to_owned());
    }
}

/// Frame type for [`ScriptedDetector`]; the detector ignores the contents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tick;

/// Replays a queue of canned detection outcomes, one per `detect` call.
///
/// An exhausted script reports no motion.
#[derive(Debug, Default)]
pub struct ScriptedDetector {
    script: VecDeque<Result<Vec<Rect>, String>>,
    resets: Arc<AtomicU64>,
    last_settings: Arc<Mutex<Option<DetectSettings>>>,
}

impl ScriptedDetector {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn then_regions(mut self, regions: impl Into<Vec<Rect>>) -> Self {
        self.script.push_back(Ok(regions.into()));
        self
    }

    #[must_use]
    pub fn then_nothing(mut self) -> Self {
        self.script.push_back(Ok(Vec::new()));
        self
    }

    #[must_use]
    pub fn then_error(mut self, msg: impl Into<String>) -> Self {
        self.script.push_back(Err(msg.into()));
        self
    }

    pub fn reset_counter(&self) -> Arc<AtomicU64> {
        self.resets.clone()
    }

    /// Settings passed to the most recent `detect` call.
    pub fn settings_probe(&self) -> Arc<Mutex<Option<DetectSettings>>> {
        self.last_settings.clone()
    }
}

impl MotionDetector for ScriptedDetector {
    type Frame = Tick;

    fn detect(
        &mut self,
        _frame: &Tick,
        settings: &DetectSettings,
    ) -> Result<DetectionResult, BoxError> {
        *self
            .last_settings
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(*settings);
        match self.script.pop_front() {
            Some(Ok(regions)) => Ok(regions.into_iter().map(Into::into).collect()),
            Some(Err(msg)) => Err(msg.into()),
            None => Ok(DetectionResult::empty()),
        }
    }

    fn reset(&mut self) {
        self.resets.fetch_add(1, Ordering::Relaxed);
    }
}

#[derive(Debug, Default)]
struct SpyState {
    commands: Vec<PanTiltSetting>,
    fail_with: Option<String>,
}

/// Records every command; can be told to fail.
#[derive(Debug, Clone, Default)]
pub struct SpyMechanism {
    state: Arc<Mutex<SpyState>>,
}

impl SpyMechanism {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent `move_to` fails with `msg`.
    pub fn fail_with(&self, msg: impl Into<String>) {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .fail_with = Some(msg.into());
    }

    pub fn commands(&self) -> Vec<PanTiltSetting> {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .commands
            .clone()
    }
}

impl PanTiltMechanism for SpyMechanism {
    fn move_to(&mut self, setting: PanTiltSetting) -> Result<(), BoxError> {
        let mut s = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(msg) = &s.fail_with {
            return Err(msg.clone().into());
        }
        s.commands.push(setting);
        Ok(())
    }
}
