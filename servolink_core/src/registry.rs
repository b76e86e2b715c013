//! The pair registry: fixed-capacity storage of sensor↔actuator links and the
//! per-sample calibrate → map → gate step.

use std::sync::Arc;
use std::time::Duration;

use eyre::WrapErr;
use servolink_traits::clock::{Clock, MonotonicClock};
use servolink_traits::{Actuator, ActuatorDriver, AnalogInput};

use crate::builder::RegistryBuilder;
use crate::calibration::{CalibrationSpan, SpanUpdate};
use crate::config::PairCfg;
use crate::error::Result;
use crate::hw_error::map_hw_error;
use crate::mapping::{exceeds_hysteresis, map_range};
use crate::report::{PairReport, PairStatus, ProcessOutcome};

/// One sensor↔actuator link with its own calibration and hysteresis state.
#[derive(Debug)]
pub struct Pair<A> {
    sensor_channel: u8,
    actuator_channel: u8,
    actuator: A,
    span: CalibrationSpan,
    output_min: i32,
    output_max: i32,
    last_written: i32,
    hysteresis: u32,
    commits: u64,
    suppressed: u64,
}

impl<A> Pair<A> {
    fn new(cfg: PairCfg, actuator: A) -> Self {
        Self {
            sensor_channel: cfg.sensor_channel,
            actuator_channel: cfg.actuator_channel,
            actuator,
            span: CalibrationSpan::new(cfg.observed_min, cfg.observed_max),
            output_min: cfg.output_min,
            output_max: cfg.output_max,
            last_written: 0,
            hysteresis: cfg.hysteresis,
            commits: 0,
            suppressed: 0,
        }
    }

    pub fn sensor_channel(&self) -> u8 {
        self.sensor_channel
    }

    pub fn actuator_channel(&self) -> u8 {
        self.actuator_channel
    }

    pub fn observed_min(&self) -> i32 {
        self.span.min
    }

    pub fn observed_max(&self) -> i32 {
        self.span.max
    }

    pub fn span(&self) -> CalibrationSpan {
        self.span
    }

    pub fn output_range(&self) -> (i32, i32) {
        (self.output_min, self.output_max)
    }

    pub fn last_written(&self) -> i32 {
        self.last_written
    }

    pub fn hysteresis(&self) -> u32 {
        self.hysteresis
    }

    pub fn status(&self) -> PairStatus {
        PairStatus {
            sensor_channel: self.sensor_channel,
            actuator_channel: self.actuator_channel,
            observed_min: self.span.min,
            observed_max: self.span.max,
            output_min: self.output_min,
            output_max: self.output_max,
            last_written: self.last_written,
            hysteresis: self.hysteresis,
            commits: self.commits,
            suppressed: self.suppressed,
        }
    }
}

impl<A: Actuator> Pair<A> {
    /// Feed one raw sample through calibration, mapping and the hysteresis
    /// gate. The span keeps the sample even if the actuator write fails;
    /// `last_written` only moves on a successful write.
    fn step(&mut self, raw: i32) -> Result<PairReport> {
        let update = self.span.observe(raw);
        if update != SpanUpdate::Unchanged {
            tracing::trace!(
                sensor = self.sensor_channel,
                min = self.span.min,
                max = self.span.max,
                ?update,
                "calibration span widened"
            );
        }

        let degree = map_range(
            raw,
            self.span.min,
            self.span.max,
            self.output_min,
            self.output_max,
        );

        let committed = exceeds_hysteresis(degree, self.last_written, self.hysteresis);
        if committed {
            self.actuator
                .write(degree)
                .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
                .wrap_err_with(|| format!("write actuator channel {}", self.actuator_channel))?;
            self.last_written = degree;
            self.commits += 1;
        } else {
            self.suppressed += 1;
        }

        tracing::debug!(
            sensor = self.sensor_channel,
            actuator = self.actuator_channel,
            raw,
            degree,
            committed,
            "pair processed"
        );

        Ok(PairReport {
            sensor_channel: self.sensor_channel,
            actuator_channel: self.actuator_channel,
            raw,
            degree,
            committed,
            held: self.last_written,
        })
    }
}

/// Fixed-capacity table of pairs plus the hardware they read and drive.
///
/// Pairs are appended by [`Registry::link`] and live until the registry is
/// dropped or [`Registry::reinitialize`]d; dropping a pair releases its
/// actuator handle.
pub struct Registry<I, D: ActuatorDriver> {
    input: I,
    driver: D,
    clock: Arc<dyn Clock + Send + Sync>,
    pairs: Vec<Pair<D::Actuator>>,
    capacity: usize,
}

impl<I, D> Registry<I, D>
where
    I: AnalogInput,
    D: ActuatorDriver,
{
    /// Empty registry with room for `capacity` pairs, paced by the wall clock.
    pub fn new(input: I, driver: D, capacity: usize) -> Self {
        Self::with_clock(input, driver, capacity, Arc::new(MonotonicClock::new()))
    }

    pub(crate) fn with_clock(
        input: I,
        driver: D,
        capacity: usize,
        clock: Arc<dyn Clock + Send + Sync>,
    ) -> Self {
        Self {
            input,
            driver,
            clock,
            pairs: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn builder() -> RegistryBuilder<I, D> {
        RegistryBuilder::new()
    }

    /// Drop every pair and start over with a new capacity.
    ///
    /// This is a teardown, not a resize: calibration and output state of all
    /// existing pairs is discarded and their actuators are released.
    pub fn reinitialize(&mut self, capacity: usize) {
        let dropped = self.pairs.len();
        drop(std::mem::take(&mut self.pairs));
        self.pairs = Vec::with_capacity(capacity);
        self.capacity = capacity;
        tracing::info!(dropped, capacity, "registry reinitialized");
    }

    /// Append a pair. Returns `Ok(false)` without touching any state when the
    /// registry is full.
    ///
    /// Fails only if the actuator driver cannot attach to the output channel,
    /// in which case no slot is consumed either.
    pub fn link(&mut self, cfg: PairCfg) -> Result<bool> {
        if self.is_full() {
            tracing::warn!(
                sensor = cfg.sensor_channel,
                actuator = cfg.actuator_channel,
                capacity = self.capacity,
                "registry full; link refused"
            );
            return Ok(false);
        }

        let actuator = self
            .driver
            .attach(cfg.actuator_channel)
            .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
            .wrap_err_with(|| format!("attach actuator channel {}", cfg.actuator_channel))?;

        self.pairs.push(Pair::new(cfg, actuator));
        tracing::info!(
            slot = self.pairs.len() - 1,
            sensor = cfg.sensor_channel,
            actuator = cfg.actuator_channel,
            output_min = cfg.output_min,
            output_max = cfg.output_max,
            hysteresis = cfg.hysteresis,
            "pair linked"
        );
        Ok(true)
    }

    /// Process the first pair reading from `sensor_channel`.
    pub fn process(&mut self, sensor_channel: u8) -> Result<ProcessOutcome> {
        let Some(slot) = self.slot_of(sensor_channel) else {
            tracing::debug!(sensor = sensor_channel, "no pair for channel");
            return Ok(ProcessOutcome::NotFound);
        };
        self.step_slot(slot).map(ProcessOutcome::Processed)
    }

    /// Process every pair in slot order, sleeping `inter_pair_delay` after
    /// each one.
    ///
    /// A failing pair does not stop the sweep; the first error is returned
    /// once every pair has been visited.
    pub fn process_all(&mut self, inter_pair_delay: Duration) -> Result<()> {
        let mut first_err = None;
        for slot in 0..self.pairs.len() {
            if let Err(e) = self.step_slot(slot) {
                tracing::warn!(slot, error = %e, "pair failed during sweep");
                if first_err.is_none() {
                    first_err = Some(e);
                }
            }
            self.clock.sleep(inter_pair_delay);
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn step_slot(&mut self, slot: usize) -> Result<PairReport> {
        let pair = &mut self.pairs[slot];
        let raw = self
            .input
            .read(pair.sensor_channel)
            .map_err(|e| eyre::Report::new(map_hw_error(e.as_ref())))
            .wrap_err_with(|| format!("read analog channel {}", pair.sensor_channel))?;
        pair.step(raw)
    }

    fn slot_of(&self, sensor_channel: u8) -> Option<usize> {
        self.pairs
            .iter()
            .position(|p| p.sensor_channel == sensor_channel)
    }
}

impl<I, D: ActuatorDriver> Registry<I, D> {
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.pairs.len() >= self.capacity
    }

    /// Occupied slots in order.
    pub fn pairs(&self) -> &[Pair<D::Actuator>] {
        &self.pairs
    }

    /// First pair reading from `sensor_channel`.
    pub fn pair(&self, sensor_channel: u8) -> Option<&Pair<D::Actuator>> {
        self.pairs
            .iter()
            .find(|p| p.sensor_channel == sensor_channel)
    }

    pub fn status(&self) -> Vec<PairStatus> {
        self.pairs.iter().map(Pair::status).collect()
    }

    pub fn clock(&self) -> &Arc<dyn Clock + Send + Sync> {
        &self.clock
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn input_mut(&mut self) -> &mut I {
        &mut self.input
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mocks::{RecordingDriver, ScriptedInput};

    fn registry(capacity: usize) -> (Registry<ScriptedInput, RecordingDriver>, ScriptedInput) {
        let input = ScriptedInput::new();
        let reg = Registry::new(input.clone(), RecordingDriver::new(), capacity);
        (reg, input)
    }

    #[test]
    fn link_fills_slots_in_order() {
        let (mut reg, _) = registry(2);
        assert!(reg.link(PairCfg::new(1, 10)).unwrap());
        assert!(reg.link(PairCfg::new(2, 11)).unwrap());
        let sensors: Vec<u8> = reg.pairs().iter().map(Pair::sensor_channel).collect();
        assert_eq!(sensors, vec![1, 2]);
        assert!(reg.is_full());
    }

    #[test]
    fn new_pair_starts_from_config() {
        let (mut reg, _) = registry(1);
        let cfg = PairCfg::new(3, 7)
            .with_output_range(20, 160)
            .with_hysteresis(4);
        reg.link(cfg).unwrap();
        let p = reg.pair(3).unwrap();
        assert_eq!(p.actuator_channel(), 7);
        assert_eq!((p.observed_min(), p.observed_max()), (1027, 0));
        assert_eq!(p.output_range(), (20, 160));
        assert_eq!(p.hysteresis(), 4);
        assert_eq!(p.last_written(), 0);
    }

    #[test]
    fn write_failure_keeps_last_written() {
        let (mut reg, input) = registry(1);
        reg.link(PairCfg::new(1, 4).with_observed_range(0, 100))
            .unwrap();
        reg.driver().refuse_write(4);
        input.set(1, 50);
        assert!(reg.process(1).is_err());
        let p = reg.pair(1).unwrap();
        assert_eq!(p.last_written(), 0);
        assert_eq!(p.status().commits, 0);
    }
}
