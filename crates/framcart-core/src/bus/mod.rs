//! I2C bus abstractions
//!
//! This module defines the transport trait that host backends implement
//! (`I2cBus`), the scoped bus lock, and the `BusChannel` type that the FRAM
//! slots talk through.

mod channel;
#[cfg(feature = "embedded-hal")]
mod eh;
mod lock;
mod traits;

pub use channel::{BusChannel, SharedBus};
#[cfg(feature = "embedded-hal")]
pub use eh::EhBus;
pub use lock::{BusGuard, BusLock};
pub use traits::*;
