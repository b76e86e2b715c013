//! Runtime configuration types for the pair registry.
//!
//! These are the structs consumed by `Registry`. They are separate from the
//! TOML-deserialized config in `servolink_config`; see `conversions`.

pub use servolink_traits::{SERVO_MAX_DEGREES as SERVO_MAX, SERVO_MIN_DEGREES as SERVO_MIN};

/// ADC description used to seed uncalibrated spans.
///
/// A fresh pair starts with an inverted span: `observed_min` sits above any
/// reading the converter can produce and `observed_max` at 0, so the first
/// real samples always widen it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdcCfg {
    /// Converter resolution in bits (10 for the classic 0..=1023 ADC).
    pub resolution_bits: u8,
    /// Counts added above full scale for the initial `observed_min`.
    pub margin: i32,
}

impl AdcCfg {
    pub const fn new(resolution_bits: u8, margin: i32) -> Self {
        Self {
            resolution_bits,
            margin,
        }
    }

    /// Largest raw count the converter can report.
    pub const fn full_scale(&self) -> i32 {
        servolink_config::uncalibrated_min(self.resolution_bits, 0)
    }

    /// Initial `observed_min` for a pair that has not seen a sample yet.
    pub const fn uncalibrated_min(&self) -> i32 {
        servolink_config::uncalibrated_min(self.resolution_bits, self.margin)
    }
}

impl Default for AdcCfg {
    fn default() -> Self {
        Self::new(10, 4)
    }
}

/// Initial `observed_min` for a 10-bit converter: 1023 + 4.
pub const DEFAULT_OBSERVED_MIN: i32 = AdcCfg::new(10, 4).uncalibrated_min();
/// Initial `observed_max` for every converter.
pub const DEFAULT_OBSERVED_MAX: i32 = 0;

/// Everything `Registry::link` needs to create one pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairCfg {
    pub sensor_channel: u8,
    pub actuator_channel: u8,
    pub observed_min: i32,
    pub observed_max: i32,
    pub output_min: i32,
    pub output_max: i32,
    /// Minimum output change before the actuator is commanded again.
    pub hysteresis: u32,
}

impl PairCfg {
    /// Link with the default uncalibrated span, full servo sweep, no hysteresis.
    pub fn new(sensor_channel: u8, actuator_channel: u8) -> Self {
        Self {
            sensor_channel,
            actuator_channel,
            observed_min: DEFAULT_OBSERVED_MIN,
            observed_max: DEFAULT_OBSERVED_MAX,
            output_min: SERVO_MIN,
            output_max: SERVO_MAX,
            hysteresis: 0,
        }
    }

    /// Seed the uncalibrated span from a specific converter.
    pub fn for_adc(mut self, adc: AdcCfg) -> Self {
        self.observed_min = adc.uncalibrated_min();
        self.observed_max = DEFAULT_OBSERVED_MAX;
        self
    }

    /// Start from a known sensor range instead of self-seeding.
    pub fn with_observed_range(mut self, min: i32, max: i32) -> Self {
        self.observed_min = min;
        self.observed_max = max;
        self
    }

    pub fn with_output_range(mut self, min: i32, max: i32) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    pub fn with_hysteresis(mut self, threshold: u32) -> Self {
        self.hysteresis = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ten_bit_default_matches_legacy_constant() {
        assert_eq!(DEFAULT_OBSERVED_MIN, 1027);
        assert_eq!(AdcCfg::default().full_scale(), 1023);
    }

    #[test]
    fn twelve_bit_adc_moves_uncalibrated_min() {
        let cfg = PairCfg::new(1, 2).for_adc(AdcCfg::new(12, 4));
        assert_eq!(cfg.observed_min, 4099);
        assert_eq!(cfg.observed_max, 0);
    }

    #[test]
    fn config_defaults_share_the_servo_sweep() {
        let defaults = servolink_config::Defaults::default();
        assert_eq!((defaults.output_min, defaults.output_max), (SERVO_MIN, SERVO_MAX));
    }

    #[test]
    fn new_uses_full_servo_sweep() {
        let cfg = PairCfg::new(5, 9);
        assert_eq!((cfg.output_min, cfg.output_max), (SERVO_MIN, SERVO_MAX));
        assert_eq!(cfg.hysteresis, 0);
    }
}
