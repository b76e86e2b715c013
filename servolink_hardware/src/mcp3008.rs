//! MCP3008 8-channel 10-bit ADC over SPI.
//!
//! Frame helpers are plain functions so they can be checked off-target; the
//! SPI-backed input itself needs the `hardware` feature.

/// Number of single-ended inputs.
pub const CHANNELS: u8 = 8;

/// Three-byte single-ended read request: start bit, then SGL=1 and the
/// channel in the high nibble.
pub fn request_frame(channel: u8) -> [u8; 3] {
    [0x01, 0x80 | ((channel & 0x07) << 4), 0x00]
}

/// Extract the 10-bit sample from a response frame.
pub fn decode_frame(rx: [u8; 3]) -> i32 {
    (i32::from(rx[1] & 0x03) << 8) | i32::from(rx[2])
}

#[cfg(all(feature = "hardware", target_os = "linux"))]
pub use hw::Mcp3008Input;

#[cfg(all(feature = "hardware", target_os = "linux"))]
mod hw {
    use rppal::spi::{Bus, Mode, SlaveSelect, Spi};
    use servolink_traits::{AnalogInput, BoxError};

    use crate::error::HwError;

    pub struct Mcp3008Input {
        spi: Spi,
    }

    impl Mcp3008Input {
        /// Open SPI0/CE0 at `clock_hz`.
        pub fn new(clock_hz: u32) -> Result<Self, HwError> {
            let spi = Spi::new(Bus::Spi0, SlaveSelect::Ss0, clock_hz, Mode::Mode0)
                .map_err(|e| HwError::Spi(format!("open SPI0: {e}")))?;
            Ok(Self { spi })
        }
    }

    impl AnalogInput for Mcp3008Input {
        fn read(&mut self, channel: u8) -> Result<i32, BoxError> {
            if channel >= super::CHANNELS {
                return Err(Box::new(HwError::ChannelOutOfRange(channel)));
            }
            let tx = super::request_frame(channel);
            let mut rx = [0u8; 3];
            self.spi
                .transfer(&mut rx, &tx)
                .map_err(|e| HwError::Spi(e.to_string()))?;
            let raw = super::decode_frame(rx);
            tracing::trace!(channel, raw, "mcp3008 sample");
            Ok(raw)
        }
    }
}
