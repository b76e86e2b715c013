//! Hardware seams for the servolink workspace.
//!
//! The registry in `servolink_core` never touches pins directly: raw samples
//! come from an [`AnalogInput`], and outputs go to [`Actuator`] handles
//! obtained by attaching an [`ActuatorDriver`] to a channel.
pub mod clock;

pub use clock::{Clock, MonotonicClock};

/// Lowest position of a standard hobby servo, in degrees.
pub const SERVO_MIN_DEGREES: i32 = 0;
/// Highest position of a standard hobby servo, in degrees.
pub const SERVO_MAX_DEGREES: i32 = 180;

/// Boxed error used at every hardware trait boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Source of raw analog samples, addressed by input channel.
pub trait AnalogInput {
    fn read(&mut self, channel: u8) -> Result<i32, BoxError>;
}

/// A positional actuator bound to one output channel.
pub trait Actuator {
    /// Command a position in output units (degrees for standard servos).
    fn write(&mut self, value: i32) -> Result<(), BoxError>;
}

/// Binds actuator handles to output channels.
///
/// Dropping a handle releases its channel.
pub trait ActuatorDriver {
    type Actuator: Actuator;

    fn attach(&mut self, channel: u8) -> Result<Self::Actuator, BoxError>;
}

impl<T: AnalogInput + ?Sized> AnalogInput for Box<T> {
    fn read(&mut self, channel: u8) -> Result<i32, BoxError> {
        (**self).read(channel)
    }
}

impl<T: Actuator + ?Sized> Actuator for Box<T> {
    fn write(&mut self, value: i32) -> Result<(), BoxError> {
        (**self).write(value)
    }
}
