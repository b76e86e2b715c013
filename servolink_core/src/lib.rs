#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Sensor-to-servo pairing core (hardware-agnostic).
//!
//! All hardware interaction goes through the `servolink_traits` seams:
//! `AnalogInput` for raw samples and `ActuatorDriver`/`Actuator` for outputs.
//!
//! ## Architecture
//!
//! - **Registry**: fixed-capacity table of sensor↔actuator pairs (`registry`)
//! - **Calibration**: running min/max span per pair (`calibration`)
//! - **Mapping**: linear rescale plus hysteresis gate (`mapping`)
//! - **Runner**: periodic control loop over all pairs (`runner`)
//! - **Reports**: per-sample and per-pair results (`report`)
//!
//! ## Per-sample step
//!
//! read raw → widen span → map onto output range → commit only if the change
//! clears the pair's hysteresis threshold.

pub mod builder;
pub mod calibration;
pub mod config;
pub mod conversions;
pub mod error;
pub mod hw_error;
pub mod mapping;
pub mod mocks;
pub mod registry;
pub mod report;
pub mod runner;

pub use builder::RegistryBuilder;
pub use calibration::{CalibrationSpan, SpanUpdate};
pub use config::{AdcCfg, DEFAULT_OBSERVED_MAX, DEFAULT_OBSERVED_MIN, PairCfg, SERVO_MAX, SERVO_MIN};
pub use error::{BuildError, RegistryError, Result};
pub use registry::{Pair, Registry};
pub use report::{PairReport, PairStatus, ProcessOutcome};
pub use runner::{RunParams, RunStats};
