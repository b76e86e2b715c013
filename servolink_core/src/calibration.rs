//! Auto-calibrating sensor span.

/// Which bound, if any, a sample moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanUpdate {
    RaisedMax,
    LoweredMin,
    Unchanged,
}

/// Running `[min, max]` of raw samples seen for one pair.
///
/// The span may start inverted (`min > max`); it is usable for mapping only
/// once `max > min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationSpan {
    pub min: i32,
    pub max: i32,
}

impl CalibrationSpan {
    pub fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }

    /// Widen the span to include `raw`.
    ///
    /// At most one bound moves per sample, and the max check wins, so an
    /// inverted span needs two samples before it can become non-degenerate.
    pub fn observe(&mut self, raw: i32) -> SpanUpdate {
        if raw > self.max {
            self.max = raw;
            SpanUpdate::RaisedMax
        } else if raw < self.min {
            self.min = raw;
            SpanUpdate::LoweredMin
        } else {
            SpanUpdate::Unchanged
        }
    }

    /// `max - min`, negative while the span is still inverted.
    pub fn width(&self) -> i64 {
        i64::from(self.max) - i64::from(self.min)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width() <= 0
    }
}
