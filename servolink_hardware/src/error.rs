use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("gpio error: {0}")]
    Gpio(String),
    #[error("spi error: {0}")]
    Spi(String),
    #[error("channel {0} is out of range for this device")]
    ChannelOutOfRange(u8),
    #[error("no samples for channel {0}")]
    UnknownChannel(u8),
    #[error("channel {0} is already attached")]
    ChannelBusy(u8),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
