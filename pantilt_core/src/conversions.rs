//! `From` implementations bridging `pantilt_config` types to `pantilt_core` types.
//!
//! Mappings onto `pantilt_traits` value types live in `pantilt_config` itself.

use std::time::Duration;

use pantilt_traits::CaptureGeometry;

use crate::calibration::{AxisFit, Calibration};
use crate::config::{RunnerCfg, SettleCfg};

// ── Calibration ──────────────────────────────────────────────────────────────

impl From<&pantilt_config::CalibrationCfg> for Calibration {
    fn from(c: &pantilt_config::CalibrationCfg) -> Self {
        Self {
            pan: AxisFit {
                slope: c.pan_slope,
                intercept: c.pan_intercept,
            },
            tilt: AxisFit {
                slope: c.tilt_slope,
                intercept: c.tilt_intercept,
            },
            dead_zone_px: c.dead_zone_px,
            reference: CaptureGeometry::new(c.reference_width, c.reference_height),
        }
    }
}

// ── SettleCfg ────────────────────────────────────────────────────────────────

impl From<&pantilt_config::SettleCfg> for SettleCfg {
    fn from(c: &pantilt_config::SettleCfg) -> Self {
        Self {
            settle: Duration::from_millis(c.settle_ms),
            hold_while_settling: c.hold_while_settling,
        }
    }
}

// ── RunnerCfg ────────────────────────────────────────────────────────────────

impl From<&pantilt_config::RunnerCfg> for RunnerCfg {
    fn from(c: &pantilt_config::RunnerCfg) -> Self {
        Self {
            frame_rate_hz: c.frame_rate_hz,
            max_frames: c.max_frames,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantilt_traits::{DetectSettings, PanTiltSetting};

    #[test]
    fn default_sections_map_to_runtime_defaults() {
        let cfg = pantilt_config::load_toml("[capture]\nwidth = 640\nheight = 480\n").unwrap();
        assert_eq!(Calibration::from(&cfg.calibration), Calibration::default());
        assert_eq!(SettleCfg::from(&cfg.settle), SettleCfg::default());
        assert_eq!(RunnerCfg::from(&cfg.runner), RunnerCfg::default());
        assert_eq!(PanTiltSetting::from(&cfg.mechanism), PanTiltSetting::centered());
        assert_eq!(CaptureGeometry::from(&cfg.capture), CaptureGeometry::new(640, 480));
    }

    #[test]
    fn explicit_values_carry_over() {
        let cfg = pantilt_config::load_toml(
            r#"
            [capture]
            width = 320
            height = 240
            [settle]
            settle_ms = 250
            hold_while_settling = true
            [detection]
            min_region_area = 50
            max_region_area = 5000
            [mechanism]
            initial_pan = 20.0
            initial_tilt = 80.0
            "#,
        )
        .unwrap();
        let settle = SettleCfg::from(&cfg.settle);
        assert_eq!(settle.settle, Duration::from_millis(250));
        assert!(settle.hold_while_settling);
        let detect = DetectSettings::from(&cfg.detection);
        assert_eq!((detect.min_region_area, detect.max_region_area), (50, 5000));
        assert_eq!(
            PanTiltSetting::from(&cfg.mechanism),
            PanTiltSetting::new(20.0, 80.0)
        );
    }
}
