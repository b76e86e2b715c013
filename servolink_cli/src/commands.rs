//! Subcommand execution and result printing.

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use serde_json::json;
use servolink_config::Config;
use servolink_core::runner::{self, RunParams, RunStats};
use servolink_core::{PairReport, PairStatus, ProcessOutcome};

use crate::backend::{build_registry, config_error};

pub struct RunOpts<'a> {
    pub sweeps: Option<u64>,
    pub period_ms: Option<u64>,
    pub delay_ms: Option<u64>,
    pub trace: Option<&'a Path>,
    pub stats: bool,
}

fn status_line(s: &PairStatus) -> String {
    let span = if s.is_calibrated() {
        format!("{}..{}", s.observed_min, s.observed_max)
    } else {
        "uncalibrated".to_string()
    };
    format!(
        "analog channel {} -> actuator channel {}: span {span}, output {}..{}, holding {}, {} written, {} held",
        s.sensor_channel,
        s.actuator_channel,
        s.output_min,
        s.output_max,
        s.last_written,
        s.commits,
        s.suppressed
    )
}

fn status_json(s: &PairStatus) -> serde_json::Value {
    json!({
        "sensor": s.sensor_channel,
        "actuator": s.actuator_channel,
        "observed_min": s.observed_min,
        "observed_max": s.observed_max,
        "output_min": s.output_min,
        "output_max": s.output_max,
        "last_written": s.last_written,
        "hysteresis": s.hysteresis,
        "commits": s.commits,
        "suppressed": s.suppressed,
    })
}

fn report_json(r: &PairReport) -> serde_json::Value {
    json!({
        "sensor": r.sensor_channel,
        "actuator": r.actuator_channel,
        "raw": r.raw,
        "degree": r.degree,
        "committed": r.committed,
        "held": r.held,
    })
}

fn stats_json(s: &RunStats) -> serde_json::Value {
    json!({
        "sweeps": s.sweeps,
        "commits": s.commits,
        "suppressed": s.suppressed,
        "failed_sweeps": s.failed_sweeps,
        "overruns": s.overruns,
    })
}

pub fn run(cfg: &Config, opts: &RunOpts<'_>, json: bool, shutdown: &AtomicBool) -> eyre::Result<()> {
    let mut registry = build_registry(cfg, opts.trace)?;

    let mut params = RunParams::from(&cfg.runner);
    if let Some(ms) = opts.period_ms {
        if ms == 0 {
            return Err(config_error("--period-ms must be >= 1"));
        }
        params.period = Duration::from_millis(ms);
    }
    if let Some(ms) = opts.delay_ms {
        params.inter_pair_delay = Duration::from_millis(ms);
    }
    params.max_sweeps = opts.sweeps;

    let stats = runner::run(&mut registry, params, shutdown)?;

    if json {
        let pairs: Vec<_> = registry.status().iter().map(status_json).collect();
        println!(
            "{}",
            json!({ "command": "run", "stats": stats_json(&stats), "pairs": pairs })
        );
        return Ok(());
    }

    println!(
        "run complete: {} sweeps, {} written, {} held",
        stats.sweeps, stats.commits, stats.suppressed
    );
    if opts.stats {
        println!(
            "stats: failed_sweeps={} overruns={} period_ms={} delay_ms={}",
            stats.failed_sweeps,
            stats.overruns,
            params.period.as_millis(),
            params.inter_pair_delay.as_millis()
        );
        for s in registry.status() {
            println!("{}", status_line(&s));
        }
    }
    Ok(())
}

pub fn probe(
    cfg: &Config,
    channel: u8,
    samples: u32,
    trace: Option<&Path>,
    json: bool,
) -> eyre::Result<()> {
    let mut registry = build_registry(cfg, trace)?;
    let period = Duration::from_millis(cfg.runner.period_ms);

    for i in 0..samples {
        let report = match registry.process(channel)? {
            ProcessOutcome::Processed(r) => r,
            ProcessOutcome::NotFound => {
                return Err(config_error(format!("no pair reads analog channel {channel}")));
            }
        };
        if json {
            println!("{}", report_json(&report));
        } else {
            println!("{report}");
        }
        if i + 1 < samples {
            registry.clock().sleep(period);
        }
    }
    Ok(())
}

pub fn self_check(cfg: &Config, json: bool) -> eyre::Result<()> {
    let mut registry = build_registry(cfg, None)?;
    registry.process_all(Duration::ZERO)?;

    let status = registry.status();
    if json {
        let pairs: Vec<_> = status.iter().map(status_json).collect();
        println!(
            "{}",
            json!({ "command": "self-check", "ok": true, "capacity": registry.capacity(), "pairs": pairs })
        );
    } else {
        for s in &status {
            println!("{}", status_line(s));
        }
        println!("self-check ok: {} of {} slots linked", registry.len(), registry.capacity());
    }
    Ok(())
}
