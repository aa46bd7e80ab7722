//! Two hobby servos on Raspberry Pi GPIO, driven by rppal software PWM.

use pantilt_traits::{PanTiltMechanism, PanTiltSetting};
use rppal::gpio::{Gpio, OutputPin};
use std::time::Duration;

use crate::error::{HwError, Result};
use crate::util::pulse_width_for;

#[derive(Debug, Clone, Copy)]
pub struct ServoPins {
    pub pan: u8,
    pub tilt: u8,
    pub pulse_min_us: u64,
    pub pulse_max_us: u64,
    pub period: Duration,
}

pub struct ServoPanTilt {
    pan: OutputPin,
    tilt: OutputPin,
    pins: ServoPins,
    last: Option<PanTiltSetting>,
}

impl ServoPanTilt {
    pub fn new(pins: ServoPins) -> Result<Self> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(e.to_string()))?;
        let pan = gpio
            .get(pins.pan)
            .map_err(|e| HwError::Gpio(format!("open pan pin {}: {e}", pins.pan)))?
            .into_output();
        let tilt = gpio
            .get(pins.tilt)
            .map_err(|e| HwError::Gpio(format!("open tilt pin {}: {e}", pins.tilt)))?
            .into_output();
        Ok(Self {
            pan,
            tilt,
            pins,
            last: None,
        })
    }

    fn drive(pin: &mut OutputPin, percent: f64, pins: &ServoPins) -> Result<()> {
        let pulse = pulse_width_for(percent, pins.pulse_min_us, pins.pulse_max_us)?;
        pin.set_pwm(pins.period, pulse)
            .map_err(|e| HwError::Gpio(format!("set pwm on pin {}: {e}", pin.pin())))
    }
}

impl PanTiltMechanism for ServoPanTilt {
    fn move_to(
        &mut self,
        setting: PanTiltSetting,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>> {
        if self.last == Some(setting) {
            return Ok(());
        }
        Self::drive(&mut self.pan, setting.pan(), &self.pins)?;
        Self::drive(&mut self.tilt, setting.tilt(), &self.pins)?;
        tracing::debug!(%setting, "servo pulse updated");
        self.last = Some(setting);
        Ok(())
    }
}
