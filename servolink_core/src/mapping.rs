//! Linear rescaling and the hysteresis gate.

/// Rescale `raw` from `[in_min, in_max]` onto `[out_min, out_max]`.
///
/// Integer arithmetic in `i64`, truncating toward zero. A zero-width or
/// inverted input span maps to `out_min`. The result saturates to `i32`.
pub fn map_range(raw: i32, in_min: i32, in_max: i32, out_min: i32, out_max: i32) -> i32 {
    let in_span = i64::from(in_max) - i64::from(in_min);
    if in_span <= 0 {
        return out_min;
    }
    let out_span = i64::from(out_max) - i64::from(out_min);
    let offset = i64::from(raw) - i64::from(in_min);
    let scaled = i128::from(offset) * i128::from(out_span) / i128::from(in_span);
    let value = i128::from(out_min) + scaled;
    i32::try_from(value).unwrap_or(if value < 0 { i32::MIN } else { i32::MAX })
}

/// True when `degree` is at least `threshold` away from `last`.
///
/// A threshold of 0 always passes.
#[inline]
pub fn exceeds_hysteresis(degree: i32, last: i32, threshold: u32) -> bool {
    let degree = i64::from(degree);
    let last = i64::from(last);
    let t = i64::from(threshold);
    degree >= last + t || degree <= last - t
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0, 1023, 0, 180, 0)]
    #[case(1023, 0, 1023, 0, 180, 180)]
    #[case(512, 0, 1023, 0, 180, 90)]
    #[case(600, 500, 700, 0, 180, 90)]
    #[case(300, 200, 400, 10, 20, 15)]
    // reversed output range
    #[case(0, 0, 100, 180, 0, 180)]
    #[case(100, 0, 100, 180, 0, 0)]
    #[case(25, 0, 100, 180, 0, 135)]
    fn maps_linearly(
        #[case] raw: i32,
        #[case] in_min: i32,
        #[case] in_max: i32,
        #[case] out_min: i32,
        #[case] out_max: i32,
        #[case] expected: i32,
    ) {
        assert_eq!(map_range(raw, in_min, in_max, out_min, out_max), expected);
    }

    #[test]
    fn truncates_toward_zero() {
        // 1 * 180 / 7 = 25.7
        assert_eq!(map_range(1, 0, 7, 0, 180), 25);
        // negative offsets truncate toward zero as well
        assert_eq!(map_range(0, 1, 8, 0, 180), -25);
    }

    #[rstest]
    #[case(500, 500)]
    #[case(1027, 500)]
    fn degenerate_span_yields_out_min(#[case] in_min: i32, #[case] in_max: i32) {
        assert_eq!(map_range(500, in_min, in_max, 7, 180), 7);
    }

    #[test]
    fn extreme_inputs_saturate() {
        assert_eq!(map_range(i32::MAX, 0, 1, 0, i32::MAX), i32::MAX);
        assert_eq!(map_range(i32::MIN, 0, 1, 0, i32::MAX), i32::MIN);
    }

    #[rstest]
    #[case(93, 90, 5, false)]
    #[case(87, 90, 5, false)]
    #[case(95, 90, 5, true)]
    #[case(96, 90, 5, true)]
    #[case(85, 90, 5, true)]
    #[case(90, 90, 0, true)]
    #[case(0, 0, 1, false)]
    fn hysteresis_gate(
        #[case] degree: i32,
        #[case] last: i32,
        #[case] threshold: u32,
        #[case] commit: bool,
    ) {
        assert_eq!(exceeds_hysteresis(degree, last, threshold), commit);
    }
}
