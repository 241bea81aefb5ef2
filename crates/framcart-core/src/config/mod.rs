//! Session configuration
//!
//! All values are startup constants: they are decided before the topology
//! is selected and never renegotiated during a session. With the `std`
//! feature they can also be loaded from a TOML file.

#[cfg(feature = "std")]
mod toml;

#[cfg(feature = "std")]
pub use self::toml::ConfigError;

use alloc::format;
use alloc::string::String;

use crate::error::{Error, Result};
use crate::fram::MAX_CAPACITY;

/// Default maximum write payload (and dump length) in bytes
pub const DEFAULT_LIMIT: usize = 64;

/// Upper bound accepted for `limit`
pub const MAX_LIMIT: usize = 256;

/// Default FRAM slave address (MB85RC series with A2..A0 tied low)
pub const DEFAULT_FRAM_ADDRESS: u8 = 0x50;

/// Default multiplexer address (TCA9548A with A2..A0 tied low)
pub const DEFAULT_MUX_ADDRESS: u8 = 0x70;

/// Capacity assumed for carts that do not report a device ID (MB85RC256V)
pub const DEFAULT_CAPACITY: u32 = 32 * 1024;

/// Default number of payload bytes per write transaction
pub const DEFAULT_WRITE_CHUNK: usize = 16;

/// Configuration shared by the topology selector, the slots and the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum write payload; longer input is truncated. Also the number of
    /// bytes shown per slot in the status dump.
    pub limit: usize,
    /// 7-bit address of the FRAM on every channel
    pub fram_address: u8,
    /// 7-bit address of the multiplexer
    pub mux_address: u8,
    /// Capacity for carts without device ID support
    pub default_capacity: u32,
    /// Payload bytes per write transaction
    pub write_chunk: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            fram_address: DEFAULT_FRAM_ADDRESS,
            mux_address: DEFAULT_MUX_ADDRESS,
            default_capacity: DEFAULT_CAPACITY,
            write_chunk: DEFAULT_WRITE_CHUNK,
        }
    }
}

impl SessionConfig {
    /// Check the configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 || self.limit > MAX_LIMIT {
            log::error!("limit must be 1..={}, got {}", MAX_LIMIT, self.limit);
            return Err(Error::InvalidConfig);
        }
        for (name, address) in [("fram", self.fram_address), ("mux", self.mux_address)] {
            if !is_valid_7bit_address(address) {
                log::error!("{} address 0x{:02X} is reserved or not 7-bit", name, address);
                return Err(Error::InvalidConfig);
            }
        }
        if self.fram_address == self.mux_address {
            log::error!("fram and mux share address 0x{:02X}", self.fram_address);
            return Err(Error::InvalidConfig);
        }
        if self.default_capacity == 0 || self.default_capacity > MAX_CAPACITY {
            log::error!(
                "default capacity must be 1..={}, got {}",
                MAX_CAPACITY,
                self.default_capacity
            );
            return Err(Error::InvalidConfig);
        }
        if self.write_chunk == 0 {
            log::error!("write chunk must not be zero");
            return Err(Error::InvalidConfig);
        }
        Ok(())
    }
}

/// Parse a number that can be hex (0x...) or decimal
pub fn parse_number(s: &str) -> core::result::Result<u32, String> {
    let s = s.trim();
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("invalid hex: {}", e))
    } else {
        s.parse().map_err(|e| format!("invalid number: {}", e))
    }
}

/// Whether `address` is a usable (non-reserved) 7-bit I2C address
pub fn is_valid_7bit_address(address: u8) -> bool {
    (0x08..=0x77).contains(&address)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("0x70"), Ok(0x70));
        assert_eq!(parse_number(" 80 "), Ok(80));
        assert!(parse_number("0xZZ").is_err());
        assert!(parse_number("-1").is_err());
    }

    #[test]
    fn test_default_is_valid() {
        assert!(SessionConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let base = SessionConfig::default();

        let zero_limit = SessionConfig { limit: 0, ..base };
        assert_eq!(zero_limit.validate(), Err(Error::InvalidConfig));

        let reserved = SessionConfig {
            fram_address: 0x7C,
            ..base
        };
        assert_eq!(reserved.validate(), Err(Error::InvalidConfig));

        let clash = SessionConfig {
            mux_address: base.fram_address,
            ..base
        };
        assert_eq!(clash.validate(), Err(Error::InvalidConfig));

        let huge = SessionConfig {
            default_capacity: 128 * 1024,
            ..base
        };
        assert_eq!(huge.validate(), Err(Error::InvalidConfig));
    }
}
