//! Hardware assembly: pick input and driver backends and build the registry.

use std::path::Path;

use servolink_config::Config;
use servolink_core::error::RegistryError;
use servolink_core::{Registry, conversions};
use servolink_hardware::pulse::PulseRange;
use servolink_hardware::ReplayInput;
use servolink_traits::AnalogInput;

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub type Driver = servolink_hardware::PwmServoDriver;
#[cfg(not(all(feature = "hardware", target_os = "linux")))]
pub type Driver = servolink_hardware::SimulatedDriver;

pub type Servos = Registry<Box<dyn AnalogInput>, Driver>;

pub fn config_error(msg: impl Into<String>) -> eyre::Report {
    eyre::Report::new(RegistryError::Config(msg.into()))
}

fn pulse_range(cfg: &Config) -> PulseRange {
    PulseRange::with_frequency(
        cfg.hardware.min_pulse_us,
        cfg.hardware.max_pulse_us,
        cfg.hardware.pwm_frequency_hz,
    )
}

/// Replay input from a sample trace, or the live input of this build.
fn make_input(cfg: &Config, trace: Option<&Path>) -> eyre::Result<Box<dyn AnalogInput>> {
    if let Some(path) = trace {
        let rows = servolink_config::load_sample_trace(path).map_err(|e| config_error(e.to_string()))?;
        tracing::info!(path = %path.display(), samples = rows.len(), "replaying sample trace");
        return Ok(Box::new(ReplayInput::new(
            rows.iter().map(|r| (r.channel, r.raw)),
        )));
    }

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        let adc = servolink_hardware::Mcp3008Input::new(cfg.hardware.spi_clock_hz)
            .map_err(|e| eyre::Report::new(servolink_core::hw_error::map_hw_error(&e)))?;
        tracing::info!(spi_clock_hz = cfg.hardware.spi_clock_hz, "mcp3008 input ready");
        Ok(Box::new(adc))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        let _ = cfg;
        tracing::info!("using simulated analog input");
        Ok(Box::new(servolink_hardware::SimulatedInput::default()))
    }
}

fn make_driver(cfg: &Config) -> eyre::Result<Driver> {
    #[cfg(all(feature = "hardware", target_os = "linux"))]
    {
        servolink_hardware::PwmServoDriver::new(pulse_range(cfg))
            .map_err(|e| eyre::Report::new(servolink_core::hw_error::map_hw_error(&e)))
    }
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    {
        Ok(servolink_hardware::SimulatedDriver::new(pulse_range(cfg)))
    }
}

/// Build a registry with every `[[pairs]]` entry linked.
pub fn build_registry(cfg: &Config, trace: Option<&Path>) -> eyre::Result<Servos> {
    let input = make_input(cfg, trace)?;
    let driver = make_driver(cfg)?;
    Registry::builder()
        .with_input(input)
        .with_driver(driver)
        .with_capacity(cfg.capacity())
        .with_pairs(conversions::pair_cfgs(cfg))
        .try_build()
}
