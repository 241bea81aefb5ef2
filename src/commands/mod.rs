//! CLI command implementations
//!
//! Every command works on a `Topology` opened through `framcart-host`, so
//! the same code drives the dummy bus and real adapters.
//!
//! ## Interactive session
//!
//! `console` adapts stdin/stdout to the core `Console` trait and runs the
//! session loop until stdin closes.
//!
//! ## One-shot commands
//!
//! `scan`, `read`, `write` and `erase` do a single operation on one slot.
//! Whole-cart reads and erases show a progress bar.

mod console;
mod erase;
mod list;
mod read;
mod scan;
mod write;

pub use console::run_session;
pub use erase::{run_erase, run_erase_all};
pub use list::list_buses;
pub use read::{run_read, run_read_all};
pub use scan::run_scan;
pub use write::run_write;

use framcart_core::bus::I2cBus;
use framcart_core::fram::{FramSlot, Presence};
use framcart_core::topology::Topology;
use framcart_core::Error;

/// Look up a slot, with a readable error for the current topology
pub fn slot<B: I2cBus>(
    topology: &Topology<B>,
    index: usize,
) -> Result<&FramSlot<B>, Box<dyn std::error::Error>> {
    topology.slot(index).ok_or_else(|| {
        format!(
            "Slot {} does not exist ({} topology has {} slot(s))",
            index,
            topology.name(),
            topology.slot_count()
        )
        .into()
    })
}

/// Capacity of the cart in `slot`, or an error if the slot is empty
fn require_cart<B: I2cBus>(slot: &FramSlot<B>) -> Result<u32, Error> {
    match slot.scan() {
        Presence::Occupied(capacity) => Ok(capacity),
        Presence::Empty => Err(Error::DeviceAbsent),
    }
}
