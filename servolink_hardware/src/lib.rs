//! Hardware backends for servolink.
//!
//! Simulated and replayed backends are always available. Raspberry Pi
//! backends (MCP3008 ADC, GPIO software-PWM servos) need feature `hardware`.
pub mod error;
pub mod mcp3008;
pub mod pulse;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub mod pwm_servo;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use servolink_traits::{Actuator, ActuatorDriver, AnalogInput, BoxError};

use crate::error::HwError;
use crate::pulse::{PulseRange, degrees_to_pulse_us};

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use mcp3008::Mcp3008Input;
#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use pwm_servo::{PwmServo, PwmServoDriver};

/// Simulated potentiometers: every channel sweeps a triangle wave between
/// `lo` and `hi`, advancing `step` counts per read. Channels start at
/// different phases so pairs do not move in lockstep.
#[derive(Debug, Clone)]
pub struct SimulatedInput {
    lo: i32,
    hi: i32,
    step: i32,
    state: HashMap<u8, (i32, i32)>,
}

impl SimulatedInput {
    pub fn new(lo: i32, hi: i32, step: i32) -> Self {
        let (lo, hi) = if lo <= hi { (lo, hi) } else { (hi, lo) };
        Self {
            lo,
            hi,
            step: step.max(1),
            state: HashMap::new(),
        }
    }
}

impl Default for SimulatedInput {
    /// Full 10-bit range, 16 counts per read.
    fn default() -> Self {
        Self::new(0, 1023, 16)
    }
}

impl AnalogInput for SimulatedInput {
    fn read(&mut self, channel: u8) -> Result<i32, BoxError> {
        let (lo, hi, step) = (self.lo, self.hi, self.step);
        let span = hi - lo;
        let (value, dir) = self.state.entry(channel).or_insert_with(|| {
            let phase = if span == 0 {
                0
            } else {
                (i32::from(channel) * 97) % (span + 1)
            };
            (lo + phase, step)
        });
        let sample = *value;
        let next = *value + *dir;
        if next > hi || next < lo {
            *dir = -*dir;
        }
        *value = (*value + *dir).clamp(lo, hi);
        tracing::trace!(channel, raw = sample, "simulated sample");
        Ok(sample)
    }
}

/// Replays recorded `(channel, raw)` samples.
///
/// Each channel consumes its own samples in file order; once exhausted it
/// keeps returning its last sample. Channels that never appeared fail.
#[derive(Debug, Clone, Default)]
pub struct ReplayInput {
    queued: HashMap<u8, VecDeque<i32>>,
    last: HashMap<u8, i32>,
}

impl ReplayInput {
    pub fn new(samples: impl IntoIterator<Item = (u8, i32)>) -> Self {
        let mut queued: HashMap<u8, VecDeque<i32>> = HashMap::new();
        for (channel, raw) in samples {
            queued.entry(channel).or_default().push_back(raw);
        }
        Self {
            queued,
            last: HashMap::new(),
        }
    }

    /// Samples not yet consumed on `channel`.
    pub fn remaining(&self, channel: u8) -> usize {
        self.queued.get(&channel).map_or(0, VecDeque::len)
    }
}

impl AnalogInput for ReplayInput {
    fn read(&mut self, channel: u8) -> Result<i32, BoxError> {
        if let Some(raw) = self.queued.get_mut(&channel).and_then(VecDeque::pop_front) {
            self.last.insert(channel, raw);
            return Ok(raw);
        }
        match self.last.get(&channel) {
            Some(raw) => Ok(*raw),
            None => Err(Box::new(HwError::UnknownChannel(channel))),
        }
    }
}

#[derive(Debug, Default)]
struct Bench {
    positions: HashMap<u8, i32>,
    attached: HashSet<u8>,
}

/// Simulated servo bench. Tracks the last position of every channel and
/// refuses to attach a channel twice.
#[derive(Debug, Clone, Default)]
pub struct SimulatedDriver {
    bench: Rc<RefCell<Bench>>,
    range: PulseRange,
}

impl SimulatedDriver {
    pub fn new(range: PulseRange) -> Self {
        Self {
            bench: Rc::default(),
            range,
        }
    }

    /// Last commanded position of `channel`, if it was ever written.
    pub fn position(&self, channel: u8) -> Option<i32> {
        self.bench.borrow().positions.get(&channel).copied()
    }

    pub fn is_attached(&self, channel: u8) -> bool {
        self.bench.borrow().attached.contains(&channel)
    }
}

impl ActuatorDriver for SimulatedDriver {
    type Actuator = SimulatedServo;

    fn attach(&mut self, channel: u8) -> Result<Self::Actuator, BoxError> {
        if !self.bench.borrow_mut().attached.insert(channel) {
            return Err(Box::new(HwError::ChannelBusy(channel)));
        }
        tracing::debug!(channel, "simulated servo attached");
        Ok(SimulatedServo {
            channel,
            range: self.range,
            bench: Rc::clone(&self.bench),
        })
    }
}

#[derive(Debug)]
pub struct SimulatedServo {
    channel: u8,
    range: PulseRange,
    bench: Rc<RefCell<Bench>>,
}

impl Actuator for SimulatedServo {
    fn write(&mut self, value: i32) -> Result<(), BoxError> {
        let pulse_us = degrees_to_pulse_us(value, self.range);
        self.bench.borrow_mut().positions.insert(self.channel, value);
        tracing::debug!(
            channel = self.channel,
            degrees = value,
            pulse_us,
            "simulated servo write"
        );
        Ok(())
    }
}

impl Drop for SimulatedServo {
    fn drop(&mut self) {
        self.bench.borrow_mut().attached.remove(&self.channel);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_input_stays_in_range_and_turns_around() {
        let mut input = SimulatedInput::new(0, 10, 4);
        let samples: Vec<i32> = (0..8).map(|_| input.read(0).unwrap()).collect();
        assert_eq!(samples, vec![0, 4, 8, 4, 0, 4, 8, 4]);
    }

    #[test]
    fn simulated_channels_start_at_different_phases() {
        let mut input = SimulatedInput::default();
        let a = input.read(0).unwrap();
        let b = input.read(1).unwrap();
        assert_ne!(a, b);
        assert!((0..=1023).contains(&b));
    }

    #[test]
    fn replay_consumes_per_channel_then_holds() {
        let mut input = ReplayInput::new([(0, 10), (1, 500), (0, 20)]);
        assert_eq!(input.remaining(0), 2);
        assert_eq!(input.read(0).unwrap(), 10);
        assert_eq!(input.read(0).unwrap(), 20);
        assert_eq!(input.read(0).unwrap(), 20);
        assert_eq!(input.read(1).unwrap(), 500);
        assert_eq!(input.remaining(0), 0);
    }

    #[test]
    fn replay_unknown_channel_is_typed_error() {
        let mut input = ReplayInput::new([(0, 10)]);
        let err = input.read(3).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HwError>(),
            Some(HwError::UnknownChannel(3))
        ));
    }

    #[test]
    fn simulated_driver_tracks_positions_and_releases_on_drop() {
        let mut driver = SimulatedDriver::default();
        let mut servo = driver.attach(18).unwrap();
        assert!(driver.attach(18).is_err());
        servo.write(90).unwrap();
        assert_eq!(driver.position(18), Some(90));
        drop(servo);
        assert!(!driver.is_attached(18));
        assert!(driver.attach(18).is_ok());
    }
}
