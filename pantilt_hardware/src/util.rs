use std::time::Duration;

use crate::error::{HwError, Result};

/// Map a travel percentage onto a servo pulse width, linearly between
/// `min_us` (0%) and `max_us` (100%). The percentage is clamped first.
pub fn pulse_width_for(percent: f64, min_us: u64, max_us: u64) -> Result<Duration> {
    if min_us >= max_us {
        return Err(HwError::PulseOutOfRange(min_us));
    }
    let p = if percent.is_finite() {
        percent.clamp(0.0, 100.0)
    } else {
        50.0
    };
    let span = (max_us - min_us) as f64;
    let us = min_us + (span * p / 100.0).round() as u64;
    Ok(Duration::from_micros(us))
}
