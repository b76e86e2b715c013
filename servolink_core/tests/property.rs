use proptest::prelude::*;
use servolink_core::mapping::map_range;
use servolink_core::mocks::{RecordingDriver, ScriptedInput};
use servolink_core::{PairCfg, Registry};

fn one_pair(cfg: PairCfg) -> (Registry<ScriptedInput, RecordingDriver>, ScriptedInput) {
    let input = ScriptedInput::new();
    let mut reg = Registry::new(input.clone(), RecordingDriver::new(), 1);
    reg.link(cfg).unwrap();
    (reg, input)
}

prop_compose! {
    fn increasing()(start in 0i32..512, steps in prop::collection::vec(1i32..20, 1..60)) -> Vec<i32> {
        steps.iter().scan(start, |acc, d| { *acc += d; Some(*acc) }).collect()
    }
}

proptest! {
    #[test]
    fn observed_max_never_decreases_on_rising_input(samples in increasing()) {
        let (mut reg, input) = one_pair(PairCfg::new(0, 1));
        input.push(0, samples.clone());
        let mut prev_max = reg.pair(0).unwrap().observed_max();
        for _ in &samples {
            reg.process(0).unwrap();
            let max = reg.pair(0).unwrap().observed_max();
            prop_assert!(max >= prev_max);
            prev_max = max;
        }
        prop_assert_eq!(prev_max, *samples.last().unwrap());
    }

    #[test]
    fn observed_min_never_increases_on_falling_input(samples in increasing()) {
        let falling: Vec<i32> = samples.iter().rev().copied().collect();
        let (mut reg, input) = one_pair(PairCfg::new(0, 1));
        input.push(0, falling.clone());
        let mut prev_min = reg.pair(0).unwrap().observed_min();
        for _ in &falling {
            reg.process(0).unwrap();
            let min = reg.pair(0).unwrap().observed_min();
            prop_assert!(min <= prev_min);
            prev_min = min;
        }
    }

    #[test]
    fn mapped_output_stays_inside_output_range(
        samples in prop::collection::vec(0i32..1024, 1..100),
        lo in 0i32..90,
        hi in 91i32..=180,
        hysteresis in 0u32..10,
    ) {
        let (mut reg, input) = one_pair(
            PairCfg::new(0, 1).with_output_range(lo, hi).with_hysteresis(hysteresis),
        );
        input.push(0, samples.clone());
        for _ in &samples {
            let r = reg.process(0).unwrap().report().copied().unwrap();
            prop_assert!((lo..=hi).contains(&r.degree), "degree {} outside {}..={}", r.degree, lo, hi);
        }
    }

    #[test]
    fn map_range_is_monotonic_in_raw(
        in_min in -1000i32..1000,
        width in 1i32..5000,
        a in 0i32..5000,
        b in 0i32..5000,
    ) {
        let in_max = in_min + width;
        let (x, y) = (in_min + a.min(width), in_min + b.min(width));
        let (lo, hi) = if x <= y { (x, y) } else { (y, x) };
        prop_assert!(map_range(lo, in_min, in_max, 0, 180) <= map_range(hi, in_min, in_max, 0, 180));
    }
}
