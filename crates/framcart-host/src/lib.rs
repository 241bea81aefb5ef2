//! framcart-host - Bus registry for the framcart tools
//!
//! The CLI never names a concrete transport. It hands a bus string such as
//! `dummy:mux=1,carts=2` or `linux_i2c:dev=/dev/i2c-1` to this crate and
//! gets back a boxed `I2cBus`, or directly a selected `Topology`.
//!
//! ```text
//!   framcart (CLI) ──► framcart-host ──► framcart-dummy
//!                          │        └──► framcart-linux-i2c
//!                          ▼
//!                    framcart-core (topology, slots, session)
//! ```
//!
//! # Example
//!
//! ```ignore
//! use framcart_core::config::SessionConfig;
//!
//! let config = SessionConfig::default();
//! let topology = framcart_host::open_topology("dummy:carts=2", &config)?;
//! println!("{} slot(s)", topology.slot_count());
//! ```

mod error;
mod registry;

pub use error::{HostError, Result};
pub use registry::{
    available_buses, bus_names_short, open_bus, open_topology, parse_bus_params, BoxedI2cBus,
    BusParams,
};
