//! Test and helper doubles for servolink_core.
//!
//! Both doubles share their state through `Rc<RefCell<_>>`, so a test can
//! keep a clone and inspect or steer it while the registry owns the other.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet, VecDeque};
use std::rc::Rc;

use servolink_traits::{Actuator, ActuatorDriver, AnalogInput, BoxError};

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<u8, VecDeque<i32>>,
    held: HashMap<u8, i32>,
    reads: Vec<u8>,
    failing: HashSet<u8>,
}

/// Analog input fed from per-channel scripts.
///
/// Queued samples are consumed first; afterwards the channel keeps
/// returning the last value it produced or was `set` to.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    inner: Rc<RefCell<Script>>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold `channel` at a constant raw value.
    pub fn set(&self, channel: u8, raw: i32) {
        let mut s = self.inner.borrow_mut();
        s.queued.remove(&channel);
        s.failing.remove(&channel);
        s.held.insert(channel, raw);
    }

    /// Queue samples to be returned in order.
    pub fn push(&self, channel: u8, samples: impl IntoIterator<Item = i32>) {
        let mut s = self.inner.borrow_mut();
        s.failing.remove(&channel);
        s.queued.entry(channel).or_default().extend(samples);
    }

    /// Make reads on `channel` fail until cleared with `set`/`push`.
    pub fn fail(&self, channel: u8) {
        self.inner.borrow_mut().failing.insert(channel);
    }

    /// Channels read so far, in order.
    pub fn reads(&self) -> Vec<u8> {
        self.inner.borrow().reads.clone()
    }
}

impl AnalogInput for ScriptedInput {
    fn read(&mut self, channel: u8) -> Result<i32, BoxError> {
        let mut s = self.inner.borrow_mut();
        s.reads.push(channel);
        if s.failing.contains(&channel) {
            return Err(format!("scripted failure on channel {channel}").into());
        }
        if let Some(v) = s.queued.get_mut(&channel).and_then(VecDeque::pop_front) {
            s.held.insert(channel, v);
            return Ok(v);
        }
        s.held
            .get(&channel)
            .copied()
            .ok_or_else(|| format!("no script for channel {channel}").into())
    }
}

#[derive(Debug, Default)]
struct Recording {
    writes: Vec<(u8, i32)>,
    attached: Vec<u8>,
    released: Vec<u8>,
    refuse_attach: HashSet<u8>,
    refuse_write: HashSet<u8>,
}

/// Actuator driver that records every attach, write and release.
#[derive(Debug, Clone, Default)]
pub struct RecordingDriver {
    inner: Rc<RefCell<Recording>>,
}

impl RecordingDriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `(actuator_channel, value)` for every committed write, in order.
    pub fn writes(&self) -> Vec<(u8, i32)> {
        self.inner.borrow().writes.clone()
    }

    /// Values written to one channel, in order.
    pub fn writes_to(&self, channel: u8) -> Vec<i32> {
        self.inner
            .borrow()
            .writes
            .iter()
            .filter(|(c, _)| *c == channel)
            .map(|(_, v)| *v)
            .collect()
    }

    pub fn attached(&self) -> Vec<u8> {
        self.inner.borrow().attached.clone()
    }

    /// Channels whose handles have been dropped.
    pub fn released(&self) -> Vec<u8> {
        self.inner.borrow().released.clone()
    }

    pub fn refuse_attach(&self, channel: u8) {
        self.inner.borrow_mut().refuse_attach.insert(channel);
    }

    pub fn refuse_write(&self, channel: u8) {
        self.inner.borrow_mut().refuse_write.insert(channel);
    }
}

impl ActuatorDriver for RecordingDriver {
    type Actuator = RecordingActuator;

    fn attach(&mut self, channel: u8) -> Result<Self::Actuator, BoxError> {
        let mut r = self.inner.borrow_mut();
        if r.refuse_attach.contains(&channel) {
            return Err(format!("channel {channel} busy").into());
        }
        r.attached.push(channel);
        Ok(RecordingActuator {
            channel,
            log: Rc::clone(&self.inner),
        })
    }
}

/// Handle produced by [`RecordingDriver`].
#[derive(Debug)]
pub struct RecordingActuator {
    channel: u8,
    log: Rc<RefCell<Recording>>,
}

impl Actuator for RecordingActuator {
    fn write(&mut self, value: i32) -> Result<(), BoxError> {
        let mut r = self.log.borrow_mut();
        if r.refuse_write.contains(&self.channel) {
            return Err(format!("write to channel {} rejected", self.channel).into());
        }
        r.writes.push((self.channel, value));
        Ok(())
    }
}

impl Drop for RecordingActuator {
    fn drop(&mut self) {
        self.log.borrow_mut().released.push(self.channel);
    }
}
