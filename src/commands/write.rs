//! Write command implementation

use framcart_core::bus::I2cBus;
use framcart_core::fram::FramSlot;

/// Write `data` at `offset`, truncated to the slot's limit
pub fn run_write<B: I2cBus>(
    slot: &FramSlot<B>,
    offset: u32,
    data: &[u8],
) -> Result<(), Box<dyn std::error::Error>> {
    if data.len() > slot.limit() {
        log::warn!(
            "Input is {} bytes, only the first {} will be written",
            data.len(),
            slot.limit()
        );
    }

    let written = slot.write_range(offset, data)?;
    println!(
        "Wrote {} bytes to slot {} at 0x{:04X}",
        written,
        slot.index(),
        offset
    );
    Ok(())
}
