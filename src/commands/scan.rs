//! Scan command implementation

use framcart_core::bus::I2cBus;
use framcart_core::fram::Presence;
use framcart_core::report;
use framcart_core::topology::Topology;

/// Report the presence, capacity and device ID of every slot
pub fn run_scan<B: I2cBus>(topology: &Topology<B>) -> Result<(), Box<dyn std::error::Error>> {
    println!("{} topology, {} slot(s)", topology.name(), topology.slot_count());

    for slot in topology.slots() {
        match slot.scan() {
            Presence::Empty => println!("{}", report::empty_slot(slot.index())),
            Presence::Occupied(capacity) => match slot.device_id() {
                Ok(id) if id.capacity().is_some() => {
                    println!("Slot {}: {} bytes, {}", slot.index(), capacity, id)
                }
                Ok(_) | Err(_) => println!(
                    "Slot {}: {} bytes (no device ID, assumed)",
                    slot.index(),
                    capacity
                ),
            },
        }
    }

    Ok(())
}
