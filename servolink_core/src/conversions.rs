//! `From` implementations bridging `servolink_config` types to core types.

use std::time::Duration;

use crate::config::{AdcCfg, PairCfg};
use crate::runner::RunParams;

// ── AdcCfg ───────────────────────────────────────────────────────────────────

impl From<&servolink_config::Adc> for AdcCfg {
    fn from(c: &servolink_config::Adc) -> Self {
        Self {
            resolution_bits: c.resolution_bits,
            margin: c.margin,
        }
    }
}

// ── PairCfg ──────────────────────────────────────────────────────────────────

impl From<&servolink_config::ResolvedPair> for PairCfg {
    fn from(p: &servolink_config::ResolvedPair) -> Self {
        Self {
            sensor_channel: p.sensor,
            actuator_channel: p.actuator,
            observed_min: p.observed_min,
            observed_max: p.observed_max,
            output_min: p.output_min,
            output_max: p.output_max,
            hysteresis: p.hysteresis,
        }
    }
}

/// Every `[[pairs]]` entry as a core `PairCfg`, in declaration order.
pub fn pair_cfgs(cfg: &servolink_config::Config) -> Vec<PairCfg> {
    cfg.resolved_pairs().iter().map(PairCfg::from).collect()
}

// ── RunParams ────────────────────────────────────────────────────────────────

impl From<&servolink_config::RunnerCfg> for RunParams {
    fn from(c: &servolink_config::RunnerCfg) -> Self {
        Self {
            period: Duration::from_millis(c.period_ms),
            inter_pair_delay: Duration::from_millis(c.inter_pair_delay_ms),
            max_sweeps: None,
        }
    }
}
