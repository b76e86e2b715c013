#![no_main]
use libfuzzer_sys::fuzz_target;
use servolink_core::mapping::map_range;

fuzz_target!(|input: (i32, i32, i32, u8, u8)| {
    let (raw, a, b, out_lo, out_hi) = input;
    let (out_min, out_max) = (i32::from(out_lo.min(180)), i32::from(out_hi.min(180)));
    let span_min = a.min(b);
    let span_max = a.max(b);
    // A calibrated span always contains the sample it was widened by.
    let raw = raw.clamp(span_min, span_max);
    let degree = map_range(raw, span_min, span_max, out_min, out_max);
    assert!(degree >= out_min.min(out_max) && degree <= out_min.max(out_max));
});
