//! Maps `Box<dyn Error>` from trait boundaries to typed `RegistryError`.
//!
//! The traits in `servolink_traits` use boxed errors so any backend can plug
//! in; this module narrows them, with an optional feature-gated path for
//! `servolink_hardware::HwError` downcasting.

use crate::error::RegistryError;

/// Map a trait-boundary error to a typed `RegistryError`.
///
/// Known hardware error types are downcast first; anything else is carried
/// as an opaque `Hardware` message.
pub fn map_hw_error(e: &(dyn std::error::Error + 'static)) -> RegistryError {
    #[cfg(feature = "hardware-errors")]
    {
        if let Some(hw) = e.downcast_ref::<servolink_hardware::error::HwError>() {
            return match hw {
                servolink_hardware::error::HwError::ChannelOutOfRange(_)
                | servolink_hardware::error::HwError::UnknownChannel(_) => {
                    RegistryError::Config(hw.to_string())
                }
                other => RegistryError::HardwareFault(other.to_string()),
            };
        }
    }

    RegistryError::Hardware(e.to_string())
}
