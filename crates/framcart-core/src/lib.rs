//! framcart-core - Core library for hot-swappable I2C FRAM carts
//!
//! This crate provides presence detection and byte-range access for one or
//! two FRAM modules ("carts") attached over I2C through pogo-pin connectors
//! and hot-swap buffers, optionally routed through a channel multiplexer.
//! A cart can appear or disappear between any two transactions, so absence
//! is an ordinary outcome here rather than a fault.
//!
//! It is designed to be `no_std` compatible (it needs `alloc`).
//!
//! # Features
//!
//! - `std` - Enable standard library support (TOML config files)
//! - `is_sync` - Compile the `maybe_async` code as blocking code
//! - `embedded-hal` - Adapter for any `embedded_hal::i2c::I2c` bus
//!
//! # Example
//!
//! ```ignore
//! use framcart_core::config::SessionConfig;
//! use framcart_core::fram::{ByteRange, Presence};
//! use framcart_core::topology;
//!
//! fn dump_carts<B: framcart_core::bus::I2cBus>(bus: B) {
//!     let config = SessionConfig::default();
//!     let topology = topology::select(bus, &config);
//!     for slot in topology.slots() {
//!         match slot.scan() {
//!             Presence::Empty => println!("Slot {}: Empty", slot.index()),
//!             Presence::Occupied(capacity) => {
//!                 let range = ByteRange::with_len(0, 16).unwrap();
//!                 println!("{} bytes: {:?}", capacity, slot.read_range(range));
//!             }
//!         }
//!     }
//! }
//! ```

#![no_std]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]
// Allow async fn in traits - we use maybe-async for dual sync/async support
#![allow(async_fn_in_trait)]

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod bus;
pub mod config;
pub mod error;
pub mod fram;
pub mod mux;
pub mod report;
pub mod session;
pub mod topology;

pub use error::{Error, Result};
