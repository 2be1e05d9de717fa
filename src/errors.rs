use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("unsupported operating system: {0}")]
    UnsupportedPlatform(String),

    #[error("failed to get battery level: {0}")]
    BatteryRead(String),

    #[error("DEVICE_KEY is missing, please provide a valid key")]
    MissingCredential,

    #[error("DEVICE_ID or DEVICE_IP is missing, check your settings")]
    MissingDeviceLocation,

    #[error("invalid device address: {0}")]
    DeviceAddress(#[from] std::net::AddrParseError),

    #[error("device command failed: {0}")]
    DeviceCommand(String),

    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;
