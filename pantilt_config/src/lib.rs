#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema for the pan-tilt tracker.
//!
//! - `Config` and its sections are deserialized from TOML and validated.
//! - Calibration coefficients live here so a re-fit never touches the
//!   control code; defaults are the values fitted at 320x240.
use pantilt_traits::{CaptureGeometry, DetectSettings, PanTiltSetting};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct CaptureCfg {
    pub width: u32,
    pub height: u32,
}

/// Linear pixel-offset to percent-deflection fit, one line per axis:
/// `deflection = slope * scaled_offset + intercept`.
#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct CalibrationCfg {
    pub pan_slope: f64,
    pub pan_intercept: f64,
    pub tilt_slope: f64,
    pub tilt_intercept: f64,
    /// Scaled offsets with magnitude <= this produce no correction.
    pub dead_zone_px: f64,
    /// Resolution the fit was measured at.
    pub reference_width: u32,
    pub reference_height: u32,
}

impl Default for CalibrationCfg {
    fn default() -> Self {
        Self {
            pan_slope: 0.0933,
            pan_intercept: 0.0864,
            tilt_slope: 0.0812,
            tilt_intercept: 0.2091,
            dead_zone_px: 10.0,
            reference_width: 320,
            reference_height: 240,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct SettleCfg {
    /// Quiet period after a move before detections are trusted again.
    pub settle_ms: u64,
    /// Keep reporting detections while settling but do not chase them.
    pub hold_while_settling: bool,
}

impl Default for SettleCfg {
    fn default() -> Self {
        Self {
            settle_ms: 1000,
            hold_while_settling: false,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy, Default)]
#[serde(default)]
pub struct DetectionCfg {
    pub min_region_area: u64,
    /// 0 = unlimited
    pub max_region_area: u64,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct MechanismCfg {
    pub initial_pan: f64,
    pub initial_tilt: f64,
    /// BCM pin driving the pan servo (hardware backend only)
    pub pan_pin: u8,
    pub tilt_pin: u8,
    /// Pulse width at 0% travel
    pub pulse_min_us: u64,
    /// Pulse width at 100% travel
    pub pulse_max_us: u64,
    pub pwm_period_ms: u64,
}

impl Default for MechanismCfg {
    fn default() -> Self {
        Self {
            initial_pan: 50.0,
            initial_tilt: 50.0,
            pan_pin: 12,
            tilt_pin: 13,
            pulse_min_us: 500,
            pulse_max_us: 2500,
            pwm_period_ms: 20,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default)]
pub struct RunnerCfg {
    pub frame_rate_hz: u32,
    /// Stop after this many frames; 0 runs until the source is exhausted.
    pub max_frames: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            frame_rate_hz: 15,
            max_frames: 0,
        }
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct Logging {
    pub file: Option<String>,  // path to .log (JSON lines)
    pub level: Option<String>, // "info","debug"
    /// Log rotation policy: "never" | "daily" | "hourly" (default: never)
    pub rotation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Config {
    pub capture: CaptureCfg,
    #[serde(default)]
    pub calibration: CalibrationCfg,
    #[serde(default)]
    pub settle: SettleCfg,
    #[serde(default)]
    pub detection: DetectionCfg,
    #[serde(default)]
    pub mechanism: MechanismCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub logging: Logging,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

/// Read, parse and validate a config file.
pub fn load_file(path: &Path) -> eyre::Result<Config> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| eyre::eyre!("read config {}: {}", path.display(), e))?;
    let cfg = load_toml(&text).map_err(|e| eyre::eyre!("parse config {}: {}", path.display(), e))?;
    cfg.validate()?;
    Ok(cfg)
}

fn is_percent(v: f64) -> bool {
    v.is_finite() && (0.0..=100.0).contains(&v)
}

impl Config {
    pub fn validate(&self) -> eyre::Result<()> {
        // Capture
        if self.capture.width == 0 {
            eyre::bail!("capture.width must be > 0");
        }
        if self.capture.height == 0 {
            eyre::bail!("capture.height must be > 0");
        }

        // Calibration
        let c = &self.calibration;
        for (name, v) in [
            ("pan_slope", c.pan_slope),
            ("pan_intercept", c.pan_intercept),
            ("tilt_slope", c.tilt_slope),
            ("tilt_intercept", c.tilt_intercept),
        ] {
            if !v.is_finite() {
                eyre::bail!("calibration.{name} must be finite");
            }
        }
        if !c.dead_zone_px.is_finite() || c.dead_zone_px < 0.0 {
            eyre::bail!("calibration.dead_zone_px must be >= 0");
        }
        if c.reference_width == 0 || c.reference_height == 0 {
            eyre::bail!("calibration.reference_width/height must be > 0");
        }

        // Settle
        if self.settle.settle_ms == 0 {
            eyre::bail!("settle.settle_ms must be >= 1");
        }
        if self.settle.settle_ms > 60 * 1000 {
            eyre::bail!("settle.settle_ms is unreasonably large (>60s)");
        }

        // Detection
        if self.detection.max_region_area != 0
            && self.detection.max_region_area < self.detection.min_region_area
        {
            eyre::bail!("detection.max_region_area must be 0 or >= min_region_area");
        }

        // Mechanism
        if !is_percent(self.mechanism.initial_pan) || !is_percent(self.mechanism.initial_tilt) {
            eyre::bail!("mechanism.initial_pan/initial_tilt must be in [0, 100]");
        }
        if self.mechanism.pulse_min_us >= self.mechanism.pulse_max_us {
            eyre::bail!("mechanism.pulse_min_us must be < pulse_max_us");
        }
        if self.mechanism.pwm_period_ms == 0
            || self.mechanism.pulse_max_us > self.mechanism.pwm_period_ms * 1000
        {
            eyre::bail!("mechanism.pwm_period_ms must be >= 1 and cover pulse_max_us");
        }

        // Runner
        if self.runner.frame_rate_hz == 0 {
            eyre::bail!("runner.frame_rate_hz must be > 0");
        }
        if self.runner.frame_rate_hz > 1000 {
            eyre::bail!("runner.frame_rate_hz is unreasonably large (>1000)");
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never|daily|hourly");
        }

        Ok(())
    }
}

impl From<&CaptureCfg> for CaptureGeometry {
    fn from(c: &CaptureCfg) -> Self {
        Self::new(c.width, c.height)
    }
}

impl From<&DetectionCfg> for DetectSettings {
    fn from(c: &DetectionCfg) -> Self {
        Self {
            min_region_area: c.min_region_area,
            max_region_area: c.max_region_area,
        }
    }
}

/// Startup (and home) position of the mount.
impl From<&MechanismCfg> for PanTiltSetting {
    fn from(c: &MechanismCfg) -> Self {
        Self::new(c.initial_pan, c.initial_tilt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let cfg = load_toml("[capture]\nwidth = 640\nheight = 480\n").expect("parse");
        cfg.validate().expect("valid");
        assert_eq!(cfg.settle.settle_ms, 1000);
        assert!(!cfg.settle.hold_while_settling);
        assert_eq!(cfg.calibration.reference_width, 320);
        assert_eq!(cfg.calibration.reference_height, 240);
        assert!((cfg.calibration.pan_slope - 0.0933).abs() < 1e-12);
        assert_eq!(cfg.runner.frame_rate_hz, 15);
    }

    #[test]
    fn capture_section_is_required() {
        assert!(load_toml("[settle]\nsettle_ms = 10\n").is_err());
    }

    #[test]
    fn sections_map_onto_value_types() {
        let cfg = load_toml(
            "[capture]\nwidth = 640\nheight = 480\n\
             [detection]\nmin_region_area = 25\n\
             [mechanism]\ninitial_pan = 120.0\ninitial_tilt = 30.0\n",
        )
        .expect("parse");
        assert_eq!(CaptureGeometry::from(&cfg.capture), CaptureGeometry::new(640, 480));
        let detect = DetectSettings::from(&cfg.detection);
        assert_eq!((detect.min_region_area, detect.max_region_area), (25, 0));
        // Out-of-range initial pan clamps like any other position.
        assert_eq!(PanTiltSetting::from(&cfg.mechanism), PanTiltSetting::new(100.0, 30.0));
    }
}
