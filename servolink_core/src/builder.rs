//! Builder for `Registry`.
//!
//! Collects the hardware seams, capacity, clock and an initial set of pairs,
//! validates them together and links every pair before handing the registry
//! back. Pairs are linked exactly as given; seed spans for a non-default
//! converter with `PairCfg::for_adc` before adding them.

use std::sync::Arc;

use servolink_traits::clock::{Clock, MonotonicClock};
use servolink_traits::{ActuatorDriver, AnalogInput};

use crate::config::PairCfg;
use crate::error::{BuildError, Result};
use crate::registry::Registry;

pub struct RegistryBuilder<I, D> {
    input: Option<I>,
    driver: Option<D>,
    capacity: Option<usize>,
    clock: Option<Box<dyn Clock + Send + Sync>>,
    pairs: Vec<PairCfg>,
}

impl<I, D> Default for RegistryBuilder<I, D> {
    fn default() -> Self {
        Self {
            input: None,
            driver: None,
            capacity: None,
            clock: None,
            pairs: Vec::new(),
        }
    }
}

impl<I, D> RegistryBuilder<I, D> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_input(mut self, input: I) -> Self {
        self.input = Some(input);
        self
    }

    pub fn with_driver(mut self, driver: D) -> Self {
        self.driver = Some(driver);
        self
    }

    /// Slot count; defaults to the number of pairs added to the builder.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    /// Provide a custom clock; defaults to `MonotonicClock`.
    pub fn with_clock(mut self, clock: Box<dyn Clock + Send + Sync>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Queue a pair to be linked at build time.
    pub fn with_pair(mut self, pair: PairCfg) -> Self {
        self.pairs.push(pair);
        self
    }

    pub fn with_pairs(mut self, pairs: impl IntoIterator<Item = PairCfg>) -> Self {
        self.pairs.extend(pairs);
        self
    }
}

impl<I, D> RegistryBuilder<I, D>
where
    I: AnalogInput,
    D: ActuatorDriver,
{
    /// Validate and build, linking every queued pair in order.
    pub fn try_build(self) -> Result<Registry<I, D>> {
        let input = self
            .input
            .ok_or_else(|| eyre::Report::new(BuildError::MissingInput))?;
        let driver = self
            .driver
            .ok_or_else(|| eyre::Report::new(BuildError::MissingDriver))?;

        let capacity = self.capacity.unwrap_or(self.pairs.len());
        if capacity == 0 {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "capacity must be >= 1",
            )));
        }
        if self.pairs.len() > capacity {
            return Err(eyre::Report::new(BuildError::InvalidConfig(
                "more pairs than capacity",
            )));
        }
        for pair in &self.pairs {
            if pair.output_min == pair.output_max {
                return Err(eyre::Report::new(BuildError::InvalidConfig(
                    "output range must not be empty",
                )));
            }
        }

        let clock: Arc<dyn Clock + Send + Sync> = match self.clock {
            Some(b) => Arc::from(b),
            None => Arc::new(MonotonicClock::new()),
        };

        let mut registry = Registry::with_clock(input, driver, capacity, clock);
        for pair in self.pairs {
            // capacity was checked above, so `false` cannot happen here
            registry.link(pair)?;
        }
        Ok(registry)
    }

    pub fn build(self) -> Result<Registry<I, D>> {
        self.try_build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AdcCfg;
    use crate::mocks::{RecordingDriver, ScriptedInput};

    fn build_err(b: RegistryBuilder<ScriptedInput, RecordingDriver>) -> BuildError {
        match b.try_build() {
            Err(e) => e
                .downcast_ref::<BuildError>()
                .cloned()
                .expect("typed BuildError"),
            Ok(_) => panic!("build should fail"),
        }
    }

    #[test]
    fn requires_input_and_driver() {
        assert_eq!(
            build_err(RegistryBuilder::new().with_capacity(1)),
            BuildError::MissingInput
        );
        assert_eq!(
            build_err(
                RegistryBuilder::new()
                    .with_input(ScriptedInput::new())
                    .with_capacity(1)
            ),
            BuildError::MissingDriver
        );
    }

    #[test]
    fn rejects_more_pairs_than_capacity() {
        let b = RegistryBuilder::new()
            .with_input(ScriptedInput::new())
            .with_driver(RecordingDriver::new())
            .with_capacity(1)
            .with_pairs([PairCfg::new(0, 1), PairCfg::new(2, 3)]);
        assert!(matches!(build_err(b), BuildError::InvalidConfig(_)));
    }

    #[test]
    fn capacity_defaults_to_pair_count() {
        let reg = RegistryBuilder::new()
            .with_input(ScriptedInput::new())
            .with_driver(RecordingDriver::new())
            .with_pairs([PairCfg::new(0, 1), PairCfg::new(2, 3)])
            .build()
            .unwrap();
        assert_eq!(reg.capacity(), 2);
        assert_eq!(reg.len(), 2);
        assert!(reg.is_full());
    }

    #[test]
    fn pairs_keep_their_configured_spans() {
        let reg = RegistryBuilder::new()
            .with_input(ScriptedInput::new())
            .with_driver(RecordingDriver::new())
            .with_pair(PairCfg::new(0, 1).for_adc(AdcCfg::new(12, 4)))
            .with_pair(PairCfg::new(2, 3))
            .with_pair(PairCfg::new(4, 5).with_observed_range(100, 900))
            .build()
            .unwrap();
        assert_eq!(reg.pair(0).unwrap().observed_min(), 4099);
        assert_eq!(reg.pair(2).unwrap().observed_min(), 1027);
        assert_eq!(reg.pair(4).unwrap().observed_min(), 100);
    }
}
