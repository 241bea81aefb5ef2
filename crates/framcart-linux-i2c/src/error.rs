//! Error types for Linux I2C operations

use thiserror::Error;

/// Linux I2C specific errors
#[derive(Debug, Error)]
pub enum LinuxI2cError {
    /// Failed to open device
    #[error("Failed to open {path}: {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Failed to query adapter functionality
    #[error("Failed to query adapter functionality of {path}: {source}")]
    FuncsFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Adapter cannot do combined read/write transfers
    #[error("{0} does not support plain I2C transfers (I2C_FUNC_I2C)")]
    Unsupported(String),

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Device not specified
    #[error("No device specified. Use dev=/dev/i2c-N")]
    NoDevice,
}

/// Result type for Linux I2C operations
pub type Result<T> = std::result::Result<T, LinuxI2cError>;
