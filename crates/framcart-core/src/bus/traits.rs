//! Bus transport trait definitions
//!
//! These traits use `maybe_async` to support both sync and async modes.
//! - Without `is_sync`, traits are async (suitable for Embassy, tokio)
//! - With the `is_sync` feature, traits become synchronous

use crate::error::Result;
use maybe_async::maybe_async;

/// Raw I2C transport (sync or async depending on `is_sync` feature)
///
/// This trait represents the physical bus supplied by the host platform.
/// Addresses are 7-bit. Implementations must map a missing acknowledge to
/// `Error::Nack` and every other bus-level failure to `Error::BusFault`;
/// the layers above treat both as "cart unreachable".
///
/// ## Example
///
/// ```ignore
/// #[maybe_async(AFIT)]
/// impl I2cBus for MyBus {
///     async fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
///         self.hw.write(address, data).map_err(|_| Error::Nack)
///     }
///     // ...
/// }
/// ```
#[maybe_async(AFIT)]
pub trait I2cBus {
    /// Maximum number of bytes a single read transaction can return
    fn max_read_len(&self) -> usize;

    /// Maximum number of bytes a single write transaction can carry
    fn max_write_len(&self) -> usize;

    /// Write `data` to the device at `address` (START - ADDR(W) - DATA - STOP)
    async fn write(&mut self, address: u8, data: &[u8]) -> Result<()>;

    /// Read into `buf` from the device at `address` (START - ADDR(R) - DATA - STOP)
    async fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()>;

    /// Write then read with a repeated START
    async fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()>;

    /// Check whether a device acknowledges at `address`
    ///
    /// The default sends a zero-length write. Backends with an SMBus quick
    /// command should prefer that.
    async fn probe(&mut self, address: u8) -> Result<()> {
        self.write(address, &[]).await
    }
}

// Blanket impl for boxed buses to allow trait objects (sync mode only)
// In async mode, traits with async fn are not object-safe
#[cfg(feature = "is_sync")]
impl I2cBus for alloc::boxed::Box<dyn I2cBus> {
    fn max_read_len(&self) -> usize {
        (**self).max_read_len()
    }

    fn max_write_len(&self) -> usize {
        (**self).max_write_len()
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
        (**self).write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read(address, buf)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
        (**self).write_read(address, data, buf)
    }

    fn probe(&mut self, address: u8) -> Result<()> {
        (**self).probe(address)
    }
}

/// Information about a bus backend
#[derive(Debug, Clone)]
pub struct BusInfo {
    /// Name of the backend
    pub name: &'static str,
    /// Alternative names/aliases
    pub aliases: &'static [&'static str],
    /// Description
    pub description: &'static str,
}
