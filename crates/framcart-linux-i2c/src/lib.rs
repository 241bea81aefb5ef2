//! framcart-linux-i2c - Linux i2c-dev support
//!
//! This crate drives an I2C adapter through the `/dev/i2c-N` character
//! devices exposed by the kernel's i2c-dev driver.
//!
//! # Example
//!
//! ```no_run
//! use framcart_linux_i2c::{LinuxI2c, LinuxI2cConfig};
//! use framcart_core::bus::I2cBus;
//!
//! let mut bus = LinuxI2c::open(&LinuxI2cConfig::new("/dev/i2c-1"))?;
//! let present = bus.probe(0x50).is_ok();
//! println!("FRAM at 0x50: {}", present);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! # Usage with framcart CLI
//!
//! ```bash
//! framcart scan -b linux_i2c:dev=/dev/i2c-1
//! framcart session -b linux_i2c:bus=1,maxlen=32
//! ```
//!
//! # System Requirements
//!
//! - Linux kernel with i2c-dev support (`CONFIG_I2C_CHARDEV`)
//! - Read/write access to `/dev/i2c-N` (usually the `i2c` group)

pub mod device;
pub mod error;

// Re-exports
pub use device::{funcs, parse_options, LinuxI2c, LinuxI2cConfig};
pub use error::{LinuxI2cError, Result};

/// Open a Linux I2C adapter and return a boxed I2cBus
///
/// This is a convenience function for use in the CLI bus dispatch.
///
/// # Example Options
///
/// - `dev=/dev/i2c-1` - device path
/// - `bus=1` - same as above
/// - `maxlen=32` - Optional: bytes per transaction
pub fn open_linux_i2c(
    options: &[(&str, &str)],
) -> std::result::Result<Box<dyn framcart_core::bus::I2cBus>, Box<dyn std::error::Error>> {
    let config = parse_options(options)?;
    let bus = LinuxI2c::open(&config)?;
    Ok(Box::new(bus))
}
