//! Pixel and actuator value types shared across the stack.

use std::fmt;

/// A point in frame pixel coordinates. Fractional so region centers keep
/// their half-pixel.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise `self - other`.
    #[inline]
    pub fn offset_from(self, other: Point) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.1}, {:.1})", self.x, self.y)
    }
}

/// Axis-aligned bounding box in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub fn area(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    pub fn center(&self) -> Point {
        Point::new(
            f64::from(self.x) + f64::from(self.width) / 2.0,
            f64::from(self.y) + f64::from(self.height) / 2.0,
        )
    }
}

/// Pixel dimensions of the live capture. Fixed for the controller's lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureGeometry {
    pub width: u32,
    pub height: u32,
}

impl CaptureGeometry {
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Geometric center of the frame; the default objective point.
    pub fn center(&self) -> Point {
        Point::new(f64::from(self.width) / 2.0, f64::from(self.height) / 2.0)
    }
}

impl fmt::Display for CaptureGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Pan/tilt position as a percentage of mechanical travel per axis.
///
/// Immutable: every constructor clamps to `[0, 100]` and a corrected position
/// is always derived with [`PanTiltSetting::offset_by`]. Non-finite inputs
/// collapse to the neutral 50%.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanTiltSetting {
    pan: f64,
    tilt: f64,
}

impl PanTiltSetting {
    pub const MIN_PERCENT: f64 = 0.0;
    pub const MAX_PERCENT: f64 = 100.0;
    pub const NEUTRAL_PERCENT: f64 = 50.0;

    pub fn new(pan: f64, tilt: f64) -> Self {
        Self {
            pan: clamp_percent(pan),
            tilt: clamp_percent(tilt),
        }
    }

    pub const fn centered() -> Self {
        Self {
            pan: Self::NEUTRAL_PERCENT,
            tilt: Self::NEUTRAL_PERCENT,
        }
    }

    #[inline]
    pub fn pan(&self) -> f64 {
        self.pan
    }

    #[inline]
    pub fn tilt(&self) -> f64 {
        self.tilt
    }

    #[must_use]
    pub fn offset_by(&self, pan_delta: f64, tilt_delta: f64) -> Self {
        Self::new(self.pan + pan_delta, self.tilt + tilt_delta)
    }
}

impl Default for PanTiltSetting {
    fn default() -> Self {
        Self::centered()
    }
}

impl fmt::Display for PanTiltSetting {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "pan={:.2}% tilt={:.2}%", self.pan, self.tilt)
    }
}

#[inline]
fn clamp_percent(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(PanTiltSetting::MIN_PERCENT, PanTiltSetting::MAX_PERCENT)
    } else {
        PanTiltSetting::NEUTRAL_PERCENT
    }
}
