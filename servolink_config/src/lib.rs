#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
//! Config schema and sample-trace parsing for servolink.
//!
//! - `Config` and sub-structs are deserialized from TOML and validated.
//! - Sample-trace CSV loader enforces headers; traces replay recorded sensor
//!   readings through the registry without hardware.
use std::collections::HashSet;
use std::ops::RangeInclusive;

use serde::Deserialize;

pub use servolink_traits::SERVO_MAX_DEGREES;

/// Converter resolutions accepted in `[adc]`.
pub const ADC_RESOLUTION_BITS: RangeInclusive<u8> = 1..=24;

/// Initial `observed_min` for an uncalibrated pair: the converter's full
/// scale plus `margin`, so the first samples always lower it.
pub const fn uncalibrated_min(resolution_bits: u8, margin: i32) -> i32 {
    let bits = if resolution_bits > 30 { 30 } else { resolution_bits };
    ((1i32 << bits) - 1).saturating_add(margin)
}

/// One recorded sensor reading.
///
/// Expected headers:
/// channel,raw
///
/// Example:
/// channel,raw
/// 0,512
/// 1,87
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct SampleRow {
    pub channel: u8,
    pub raw: i32,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Adc {
    /// Converter resolution in bits; 10 for a 0..=1023 ADC.
    pub resolution_bits: u8,
    /// Counts above full scale used to seed an uncalibrated span.
    pub margin: i32,
}

impl Default for Adc {
    fn default() -> Self {
        Self {
            resolution_bits: 10,
            margin: 4,
        }
    }
}

impl Adc {
    /// Initial `observed_min` for pairs without an override.
    pub fn uncalibrated_min(&self) -> i32 {
        uncalibrated_min(self.resolution_bits, self.margin)
    }
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct RegistryCfg {
    /// Slot count. Defaults to the number of `[[pairs]]`.
    pub capacity: Option<usize>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RunnerCfg {
    /// Target sweep period in milliseconds.
    pub period_ms: u64,
    /// Pause after each pair within a sweep.
    pub inter_pair_delay_ms: u64,
}

impl Default for RunnerCfg {
    fn default() -> Self {
        Self {
            period_ms: 20,
            inter_pair_delay_ms: 0,
        }
    }
}

/// Values applied to every pair that does not override them.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub output_min: i32,
    pub output_max: i32,
    pub hysteresis: u32,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output_min: 0,
            output_max: SERVO_MAX_DEGREES,
            hysteresis: 0,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Copy)]
pub struct PairEntry {
    /// Analog input channel.
    pub sensor: u8,
    /// Actuator output channel (GPIO number on hardware builds).
    pub actuator: u8,
    pub observed_min: Option<i32>,
    pub observed_max: Option<i32>,
    pub output_min: Option<i32>,
    pub output_max: Option<i32>,
    pub hysteresis: Option<u32>,
}

/// A `[[pairs]]` entry with defaults and ADC seeding applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedPair {
    pub sensor: u8,
    pub actuator: u8,
    pub observed_min: i32,
    pub observed_max: i32,
    pub output_min: i32,
    pub output_max: i32,
    pub hysteresis: u32,
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
#[serde(default)]
pub struct Hardware {
    /// SPI clock for the MCP3008 converter.
    pub spi_clock_hz: u32,
    /// Servo PWM frame rate.
    pub pwm_frequency_hz: u32,
    /// Pulse width at the low end of the servo sweep.
    pub min_pulse_us: u32,
    /// Pulse width at the high end of the servo sweep.
    pub max_pulse_us: u32,
}

impl Default for Hardware {
    fn default() -> Self {
        Self {
            spi_clock_hz: 1_000_000,
            pwm_frequency_hz: 50,
            min_pulse_us: 500,
            max_pulse_us: 2500,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub adc: Adc,
    #[serde(default)]
    pub registry: RegistryCfg,
    #[serde(default)]
    pub runner: RunnerCfg,
    #[serde(default)]
    pub defaults: Defaults,
    #[serde(default)]
    pub pairs: Vec<PairEntry>,
    #[serde(default)]
    pub logging: Logging,
    #[serde(default)]
    pub hardware: Hardware,
}

pub fn load_toml(s: &str) -> Result<Config, toml::de::Error> {
    toml::from_str::<Config>(s)
}

impl Config {
    /// Effective slot count.
    pub fn capacity(&self) -> usize {
        self.registry.capacity.unwrap_or(self.pairs.len())
    }

    /// Pairs in declaration order with defaults filled in.
    pub fn resolved_pairs(&self) -> Vec<ResolvedPair> {
        let seed_min = self.adc.uncalibrated_min();
        self.pairs
            .iter()
            .map(|p| ResolvedPair {
                sensor: p.sensor,
                actuator: p.actuator,
                observed_min: p.observed_min.unwrap_or(seed_min),
                observed_max: p.observed_max.unwrap_or(0),
                output_min: p.output_min.unwrap_or(self.defaults.output_min),
                output_max: p.output_max.unwrap_or(self.defaults.output_max),
                hysteresis: p.hysteresis.unwrap_or(self.defaults.hysteresis),
            })
            .collect()
    }

    pub fn validate(&self) -> eyre::Result<()> {
        // ADC
        if !ADC_RESOLUTION_BITS.contains(&self.adc.resolution_bits) {
            eyre::bail!(
                "adc.resolution_bits must be in [{}, {}]",
                ADC_RESOLUTION_BITS.start(),
                ADC_RESOLUTION_BITS.end()
            );
        }
        if self.adc.margin < 0 {
            eyre::bail!("adc.margin must be >= 0");
        }

        // Registry
        if self.pairs.is_empty() {
            eyre::bail!("at least one [[pairs]] entry is required");
        }
        if let Some(cap) = self.registry.capacity {
            if cap == 0 {
                eyre::bail!("registry.capacity must be >= 1");
            }
            if cap < self.pairs.len() {
                eyre::bail!(
                    "registry.capacity ({cap}) is smaller than the number of pairs ({})",
                    self.pairs.len()
                );
            }
        }

        // Runner
        if self.runner.period_ms == 0 {
            eyre::bail!("runner.period_ms must be >= 1");
        }
        if self.runner.inter_pair_delay_ms > 60 * 1000 {
            eyre::bail!("runner.inter_pair_delay_ms is unreasonably large (>60s)");
        }

        // Pairs
        let mut sensors = HashSet::new();
        for (idx, p) in self.resolved_pairs().iter().enumerate() {
            if !sensors.insert(p.sensor) {
                eyre::bail!(
                    "pairs[{idx}]: sensor channel {} is already linked",
                    p.sensor
                );
            }
            for (name, v) in [("output_min", p.output_min), ("output_max", p.output_max)] {
                if !(0..=SERVO_MAX_DEGREES).contains(&v) {
                    eyre::bail!("pairs[{idx}]: {name} must be in [0, {SERVO_MAX_DEGREES}]");
                }
            }
            if p.output_min == p.output_max {
                eyre::bail!("pairs[{idx}]: output_min and output_max must differ");
            }
        }

        // Logging
        if let Some(rot) = self.logging.rotation.as_deref()
            && !matches!(rot, "never" | "daily" | "hourly")
        {
            eyre::bail!("logging.rotation must be one of never, daily, hourly");
        }

        // Hardware
        if self.hardware.spi_clock_hz == 0 {
            eyre::bail!("hardware.spi_clock_hz must be > 0");
        }
        if self.hardware.pwm_frequency_hz == 0 {
            eyre::bail!("hardware.pwm_frequency_hz must be > 0");
        }
        if self.hardware.min_pulse_us >= self.hardware.max_pulse_us {
            eyre::bail!("hardware.min_pulse_us must be < hardware.max_pulse_us");
        }
        let frame_us = 1_000_000 / self.hardware.pwm_frequency_hz;
        if self.hardware.max_pulse_us >= frame_us {
            eyre::bail!("hardware.max_pulse_us must fit inside one PWM frame ({frame_us} us)");
        }

        Ok(())
    }
}

/// Load a recorded sample trace. Rows keep file order.
pub fn load_sample_trace(path: &std::path::Path) -> eyre::Result<Vec<SampleRow>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| eyre::eyre!("open sample trace {:?}: {}", path, e))?;

    // Enforce exact headers
    let headers = rdr
        .headers()
        .map_err(|e| eyre::eyre!("read CSV headers {:?}: {}", path, e))?
        .clone();
    let expected = ["channel", "raw"];
    let actual: Vec<String> = headers.iter().map(|s| s.to_string()).collect();
    if actual != expected {
        eyre::bail!(
            "sample trace CSV must have headers 'channel,raw', got: {}",
            actual.join(",")
        );
    }

    let mut rows = Vec::new();
    for (idx, rec) in rdr.deserialize::<SampleRow>().enumerate() {
        match rec {
            Ok(row) => rows.push(row),
            Err(e) => {
                eyre::bail!("invalid CSV row {}: {}", idx + 2, e);
            }
        }
    }
    if rows.is_empty() {
        eyre::bail!("sample trace {:?} has no rows", path);
    }
    Ok(rows)
}
