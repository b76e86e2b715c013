//! Results returned from processing pairs.

use std::fmt;

/// Outcome of `Registry::process` for one sensor channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProcessOutcome {
    /// A pair was found and stepped.
    Processed(PairReport),
    /// No linked pair reads from this channel; nothing changed.
    NotFound,
}

impl ProcessOutcome {
    pub fn report(&self) -> Option<&PairReport> {
        match self {
            ProcessOutcome::Processed(r) => Some(r),
            ProcessOutcome::NotFound => None,
        }
    }
}

/// One processed sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairReport {
    pub sensor_channel: u8,
    pub actuator_channel: u8,
    pub raw: i32,
    /// Freshly mapped output for `raw`.
    pub degree: i32,
    /// Whether `degree` was sent to the actuator.
    pub committed: bool,
    /// Output the actuator holds after this step.
    pub held: i32,
}

impl fmt::Display for PairReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "analog channel {} = {} -> actuator channel {} = {}",
            self.sensor_channel, self.raw, self.actuator_channel, self.degree
        )?;
        if self.committed {
            f.write_str(" (written)")
        } else {
            write!(f, " (held at {})", self.held)
        }
    }
}

/// Snapshot of a pair's calibration and output state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStatus {
    pub sensor_channel: u8,
    pub actuator_channel: u8,
    pub observed_min: i32,
    pub observed_max: i32,
    pub output_min: i32,
    pub output_max: i32,
    pub last_written: i32,
    pub hysteresis: u32,
    pub commits: u64,
    pub suppressed: u64,
}

impl PairStatus {
    /// True once the span can produce a non-degenerate mapping.
    pub fn is_calibrated(&self) -> bool {
        self.observed_max > self.observed_min
    }
}
