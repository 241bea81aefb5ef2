//! Error types for framcart-core
//!
//! This module provides a no_std compatible error type that can be used
//! throughout the crate.

use core::fmt;

/// Core error type - no_std compatible, Copy for efficiency
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    // Transport errors
    /// The addressed device did not acknowledge
    Nack,
    /// Bus-level fault other than a plain NACK (arbitration loss, collision)
    BusFault,

    // Presence errors
    /// The cart did not answer the presence probe, or vanished mid-transfer
    DeviceAbsent,
    /// The bus lock is held by someone else
    BusBusy,
    /// A transfer was attempted with a guard that does not hold this bus
    LockNotHeld,

    // Topology errors
    /// No multiplexer answered at startup
    MuxNotFound,
    /// Requested multiplexer channel or slot does not exist
    InvalidChannel,

    // Address/size errors
    /// Range start lies after its end
    InvalidRange,
    /// Range extends beyond the cart capacity
    AddressOutOfBounds,

    // Configuration errors
    /// Session configuration is inconsistent
    InvalidConfig,
}

impl Error {
    /// Whether this error means "the cart cannot be reached right now"
    ///
    /// Absence, transport faults and lock contention all collapse into the
    /// same operator-facing status.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Self::Nack | Self::BusFault | Self::DeviceAbsent | Self::BusBusy | Self::LockNotHeld
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Nack => write!(f, "device did not acknowledge"),
            Self::BusFault => write!(f, "I2C bus fault"),
            Self::DeviceAbsent => write!(f, "FRAM cart not present"),
            Self::BusBusy => write!(f, "I2C bus is busy"),
            Self::LockNotHeld => write!(f, "bus lock not held for this channel"),
            Self::MuxNotFound => write!(f, "I2C multiplexer not found"),
            Self::InvalidChannel => write!(f, "invalid channel or slot"),
            Self::InvalidRange => write!(f, "invalid byte range"),
            Self::AddressOutOfBounds => write!(f, "address out of bounds"),
            Self::InvalidConfig => write!(f, "invalid configuration"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

/// Result type alias using the core Error type
pub type Result<T> = core::result::Result<T, Error>;
