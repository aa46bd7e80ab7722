pub mod clock;
pub mod detection;
pub mod geometry;

pub use clock::{Clock, ManualClock, MonotonicClock};
pub use detection::{DetectSettings, DetectionResult, MotionRegion};
pub use geometry::{CaptureGeometry, PanTiltSetting, Point, Rect};

/// Finds moving regions in captured frames.
pub trait MotionDetector {
    type Frame;

    fn detect(
        &mut self,
        frame: &Self::Frame,
        settings: &DetectSettings,
    ) -> Result<DetectionResult, Box<dyn std::error::Error + Send + Sync>>;

    /// Discard temporal/background state so the next frames build a fresh baseline.
    fn reset(&mut self);
}

/// Two-axis camera mount. Moves are synchronous.
pub trait PanTiltMechanism {
    fn move_to(
        &mut self,
        setting: PanTiltSetting,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Line-oriented diagnostics sink. Purely observational.
///
/// Shared between the frame flow and the settle timer thread, hence `&self`
/// and `Send + Sync`.
pub trait Screen: Send + Sync {
    /// Start a new frame's worth of output.
    fn begin_repaint(&self);
    fn write_line(&self, line: &str);

    fn write_fmt_line(&self, args: std::fmt::Arguments<'_>) {
        match args.as_str() {
            Some(s) => self.write_line(s),
            None => self.write_line(&args.to_string()),
        }
    }
}

impl<T: MotionDetector + ?Sized> MotionDetector for Box<T> {
    type Frame = T::Frame;

    fn detect(
        &mut self,
        frame: &Self::Frame,
        settings: &DetectSettings,
    ) -> Result<DetectionResult, Box<dyn std::error::Error + Send + Sync>> {
        (**self).detect(frame, settings)
    }

    fn reset(&mut self) {
        (**self).reset();
    }
}

impl<T: PanTiltMechanism + ?Sized> PanTiltMechanism for Box<T> {
    fn move_to(
        &mut self,
        setting: PanTiltSetting,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        (**self).move_to(setting)
    }
}
