//! Servo pulse-width math.

use servolink_traits::{SERVO_MAX_DEGREES, SERVO_MIN_DEGREES};

/// Pulse widths bounding a standard servo sweep, plus the PWM frame length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseRange {
    pub min_us: u32,
    pub max_us: u32,
    pub frame_us: u32,
}

impl PulseRange {
    /// Frame length for a PWM frequency, clamped to at least 1 Hz.
    pub fn with_frequency(min_us: u32, max_us: u32, frequency_hz: u32) -> Self {
        Self {
            min_us,
            max_us,
            frame_us: 1_000_000 / frequency_hz.max(1),
        }
    }
}

impl Default for PulseRange {
    /// SG90-style 500..2500 us at 50 Hz.
    fn default() -> Self {
        Self::with_frequency(500, 2500, 50)
    }
}

/// Pulse width for a position in degrees; positions outside 0..=180 clamp.
pub fn degrees_to_pulse_us(degrees: i32, range: PulseRange) -> u32 {
    let deg = u64::from(degrees.clamp(SERVO_MIN_DEGREES, SERVO_MAX_DEGREES).unsigned_abs());
    let span = u64::from(range.max_us.saturating_sub(range.min_us));
    let offset = deg * span / u64::from(SERVO_MAX_DEGREES.unsigned_abs());
    // offset <= span, and min_us + span == max_us fits in u32
    range
        .min_us
        .saturating_add(u32::try_from(offset).unwrap_or(u32::MAX))
}
