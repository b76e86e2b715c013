use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use servolink_core::mocks::{RecordingDriver, ScriptedInput};
use servolink_core::runner::{RunParams, run};
use servolink_core::{PairCfg, Registry};
use servolink_traits::clock::test_clock::TestClock;

fn two_pairs(clock: &TestClock) -> (Registry<ScriptedInput, RecordingDriver>, ScriptedInput) {
    let input = ScriptedInput::new();
    let reg = Registry::builder()
        .with_input(input.clone())
        .with_driver(RecordingDriver::new())
        .with_clock(Box::new(clock.clone()))
        .with_pairs([
            PairCfg::new(0, 10)
                .with_observed_range(0, 1000)
                .with_hysteresis(2),
            PairCfg::new(1, 11).with_observed_range(0, 1000),
        ])
        .build()
        .unwrap();
    (reg, input)
}

#[test]
fn stops_after_max_sweeps_and_counts_commits() {
    let clock = TestClock::new();
    let (mut reg, input) = two_pairs(&clock);
    input.set(0, 500);
    input.set(1, 250);

    let params = RunParams {
        period: Duration::from_millis(20),
        inter_pair_delay: Duration::ZERO,
        max_sweeps: Some(3),
    };
    let stats = run(&mut reg, params, &AtomicBool::new(false)).unwrap();

    assert_eq!(stats.sweeps, 3);
    // pair 0: one commit then two suppressed; pair 1: threshold 0 writes every time
    assert_eq!(stats.commits, 4);
    assert_eq!(stats.suppressed, 2);
    assert_eq!(stats.failed_sweeps, 0);
    // each sweep takes no virtual time, so the full period is slept
    assert_eq!(clock.elapsed(), Duration::from_millis(60));
}

#[test]
fn shutdown_flag_stops_before_first_sweep() {
    let clock = TestClock::new();
    let (mut reg, input) = two_pairs(&clock);
    input.set(0, 1);
    input.set(1, 1);
    let stop = AtomicBool::new(true);

    let stats = run(&mut reg, RunParams::default(), &stop).unwrap();

    assert_eq!(stats.sweeps, 0);
    assert!(input.reads().is_empty());
    assert!(stop.load(Ordering::Relaxed));
}

#[test]
fn hardware_failures_are_counted_not_fatal() {
    let clock = TestClock::new();
    let (mut reg, input) = two_pairs(&clock);
    input.set(0, 100);
    input.fail(1);

    let params = RunParams {
        max_sweeps: Some(2),
        ..RunParams::default()
    };
    let stats = run(&mut reg, params, &AtomicBool::new(false)).unwrap();

    assert_eq!(stats.sweeps, 2);
    assert_eq!(stats.failed_sweeps, 2);
}

#[test]
fn slow_sweeps_count_as_overruns() {
    let clock = TestClock::new();
    let (mut reg, input) = two_pairs(&clock);
    input.set(0, 1);
    input.set(1, 1);

    let params = RunParams {
        period: Duration::from_millis(5),
        inter_pair_delay: Duration::from_millis(4),
        max_sweeps: Some(2),
    };
    let stats = run(&mut reg, params, &AtomicBool::new(false)).unwrap();

    assert_eq!(stats.overruns, 2);
    // 8 ms of inter-pair delay per sweep and no extra period sleep
    assert_eq!(clock.elapsed(), Duration::from_millis(16));
}
