use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use servolink_traits::{ActuatorDriver, AnalogInput};

use crate::error::Result as CoreResult;
use crate::registry::Registry;

/// Pacing for the periodic control loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunParams {
    /// Target time from the start of one sweep to the start of the next.
    pub period: Duration,
    /// Pause after each pair within a sweep.
    pub inter_pair_delay: Duration,
    /// Stop after this many sweeps; `None` runs until shutdown.
    pub max_sweeps: Option<u64>,
}

impl Default for RunParams {
    fn default() -> Self {
        Self {
            period: Duration::from_millis(20),
            inter_pair_delay: Duration::ZERO,
            max_sweeps: None,
        }
    }
}

/// Counters collected over one `run`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub sweeps: u64,
    pub commits: u64,
    pub suppressed: u64,
    /// Sweeps in which at least one pair failed.
    pub failed_sweeps: u64,
    /// Sweeps that took longer than the configured period.
    pub overruns: u64,
}

/// Time left in the current period, or zero once it has been used up.
#[inline]
fn remaining_in_period(period_ms: u64, elapsed_ms: u64) -> u64 {
    period_ms.saturating_sub(elapsed_ms)
}

fn totals<I, D: ActuatorDriver>(registry: &Registry<I, D>) -> (u64, u64) {
    registry
        .pairs()
        .iter()
        .map(|p| p.status())
        .fold((0, 0), |(c, s), st| (c + st.commits, s + st.suppressed))
}

/// Drive `process_all` periodically until `max_sweeps` is reached or
/// `shutdown` is set.
///
/// Hardware errors inside a sweep are logged and counted; the loop keeps
/// going so one bad channel does not freeze every other actuator.
pub fn run<I, D>(
    registry: &mut Registry<I, D>,
    params: RunParams,
    shutdown: &AtomicBool,
) -> CoreResult<RunStats>
where
    I: AnalogInput,
    D: ActuatorDriver,
{
    let clock = std::sync::Arc::clone(registry.clock());
    let period_ms = u64::try_from(params.period.as_millis()).unwrap_or(u64::MAX);
    let (commits_before, suppressed_before) = totals(registry);
    let mut stats = RunStats::default();

    tracing::info!(
        pairs = registry.len(),
        period_ms,
        inter_pair_delay_ms = u64::try_from(params.inter_pair_delay.as_millis()).unwrap_or(u64::MAX),
        max_sweeps = ?params.max_sweeps,
        "control loop start"
    );

    loop {
        if shutdown.load(Ordering::Relaxed) {
            tracing::info!("shutdown requested");
            break;
        }
        if params.max_sweeps.is_some_and(|max| stats.sweeps >= max) {
            break;
        }

        let sweep_start = clock.now();
        if let Err(e) = registry.process_all(params.inter_pair_delay) {
            stats.failed_sweeps += 1;
            tracing::warn!(sweep = stats.sweeps, error = %e, "sweep had failures");
        }
        stats.sweeps += 1;

        let elapsed_ms = clock.ms_since(sweep_start);
        if elapsed_ms > period_ms {
            stats.overruns += 1;
            tracing::debug!(elapsed_ms, period_ms, "sweep overran period");
        }
        clock.sleep(Duration::from_millis(remaining_in_period(
            period_ms, elapsed_ms,
        )));
    }

    let (commits_after, suppressed_after) = totals(registry);
    stats.commits = commits_after - commits_before;
    stats.suppressed = suppressed_after - suppressed_before;
    tracing::info!(
        sweeps = stats.sweeps,
        commits = stats.commits,
        suppressed = stats.suppressed,
        failed_sweeps = stats.failed_sweeps,
        "control loop stop"
    );
    Ok(stats)
}
