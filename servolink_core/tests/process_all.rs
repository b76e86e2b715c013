use std::time::Duration;

use rstest::rstest;
use servolink_core::mocks::{RecordingDriver, ScriptedInput};
use servolink_core::{PairCfg, Registry};
use servolink_traits::clock::test_clock::TestClock;

fn three_pairs(clock: &TestClock) -> (Registry<ScriptedInput, RecordingDriver>, ScriptedInput, RecordingDriver) {
    let input = ScriptedInput::new();
    let driver = RecordingDriver::new();
    let reg = Registry::builder()
        .with_input(input.clone())
        .with_driver(driver.clone())
        .with_clock(Box::new(clock.clone()))
        .with_capacity(4)
        .with_pairs([
            PairCfg::new(7, 17).with_observed_range(0, 100),
            PairCfg::new(3, 13).with_observed_range(0, 100),
            PairCfg::new(5, 15).with_observed_range(0, 100),
        ])
        .build()
        .unwrap();
    input.set(7, 10);
    input.set(3, 50);
    input.set(5, 100);
    (reg, input, driver)
}

#[rstest]
#[case(Duration::ZERO)]
#[case(Duration::from_millis(1))]
#[case(Duration::from_millis(250))]
fn visits_every_pair_once_in_slot_order(#[case] delay: Duration) {
    let clock = TestClock::new();
    let (mut reg, input, driver) = three_pairs(&clock);

    reg.process_all(delay).unwrap();

    assert_eq!(input.reads(), vec![7, 3, 5]);
    assert_eq!(driver.writes(), vec![(17, 18), (13, 90), (15, 180)]);
}

#[test]
fn delay_is_applied_after_each_pair() {
    let clock = TestClock::new();
    let (mut reg, _, _) = three_pairs(&clock);

    reg.process_all(Duration::from_millis(4)).unwrap();
    assert_eq!(clock.sleeps(), 3);
    assert_eq!(clock.elapsed(), Duration::from_millis(12));

    reg.process_all(Duration::ZERO).unwrap();
    assert_eq!(clock.sleeps(), 3);
}

#[test]
fn empty_registry_sweep_is_a_noop() {
    let clock = TestClock::new();
    let mut reg = Registry::builder()
        .with_input(ScriptedInput::new())
        .with_driver(RecordingDriver::new())
        .with_clock(Box::new(clock.clone()))
        .with_capacity(2)
        .build()
        .unwrap();
    reg.process_all(Duration::from_millis(5)).unwrap();
    assert_eq!(clock.sleeps(), 0);
}

#[test]
fn failing_pair_does_not_stop_the_sweep() {
    let clock = TestClock::new();
    let (mut reg, input, driver) = three_pairs(&clock);
    input.fail(3);

    let err = reg.process_all(Duration::ZERO).expect_err("channel 3 fails");

    assert!(format!("{err:#}").contains("read analog channel 3"));
    assert_eq!(input.reads(), vec![7, 3, 5]);
    assert_eq!(driver.writes(), vec![(17, 18), (15, 180)]);
}

#[test]
fn sweep_and_single_process_share_state() {
    let clock = TestClock::new();
    let (mut reg, input, driver) = three_pairs(&clock);
    reg.process_all(Duration::ZERO).unwrap();
    input.set(3, 60);
    reg.process(3).unwrap();
    assert_eq!(driver.writes_to(13), vec![90, 108]);
    assert_eq!(reg.pair(3).unwrap().last_written(), 108);
}
