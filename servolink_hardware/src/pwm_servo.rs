//! Servos driven by software PWM on Raspberry Pi GPIO pins.

use std::time::Duration;

use rppal::gpio::{Gpio, OutputPin};
use servolink_traits::{Actuator, ActuatorDriver, BoxError};

use crate::error::HwError;
use crate::pulse::{PulseRange, degrees_to_pulse_us};

pub struct PwmServoDriver {
    gpio: Gpio,
    range: PulseRange,
}

impl PwmServoDriver {
    pub fn new(range: PulseRange) -> Result<Self, HwError> {
        let gpio = Gpio::new().map_err(|e| HwError::Gpio(format!("open gpio: {e}")))?;
        Ok(Self { gpio, range })
    }
}

impl ActuatorDriver for PwmServoDriver {
    type Actuator = PwmServo;

    fn attach(&mut self, channel: u8) -> Result<Self::Actuator, BoxError> {
        let pin = self
            .gpio
            .get(channel)
            .map_err(|e| HwError::Gpio(format!("open pin {channel}: {e}")))?
            .into_output_low();
        tracing::info!(pin = channel, "servo attached");
        Ok(PwmServo {
            pin,
            channel,
            range: self.range,
        })
    }
}

/// One servo signal pin. Dropping it stops the PWM output.
pub struct PwmServo {
    pin: OutputPin,
    channel: u8,
    range: PulseRange,
}

impl Actuator for PwmServo {
    fn write(&mut self, value: i32) -> Result<(), BoxError> {
        let pulse_us = degrees_to_pulse_us(value, self.range);
        self.pin
            .set_pwm(
                Duration::from_micros(u64::from(self.range.frame_us)),
                Duration::from_micros(u64::from(pulse_us)),
            )
            .map_err(|e| HwError::Gpio(format!("pin {}: {e}", self.channel)))?;
        tracing::debug!(pin = self.channel, degrees = value, pulse_us, "servo pulse");
        Ok(())
    }
}
