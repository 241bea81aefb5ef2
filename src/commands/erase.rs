//! Erase command implementation

use framcart_core::bus::I2cBus;
use framcart_core::fram::{ByteRange, FramSlot};
use indicatif::{ProgressBar, ProgressStyle};

use super::require_cart;

/// Chunk size for whole-cart erases
const ERASE_CHUNK_SIZE: u32 = 256;

/// Zero `length` bytes at `start`
pub fn run_erase<B: I2cBus>(
    slot: &FramSlot<B>,
    start: u32,
    length: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = ByteRange::with_len(start, length)?;
    slot.erase_range(range)?;
    println!(
        "Erased {} bytes of slot {} starting at 0x{:04X}",
        range.len(),
        slot.index(),
        start
    );
    Ok(())
}

/// Zero the whole cart with a progress bar
pub fn run_erase_all<B: I2cBus>(slot: &FramSlot<B>) -> Result<(), Box<dyn std::error::Error>> {
    let capacity = require_cart(slot)?;

    let pb = ProgressBar::new(capacity as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta}) Erasing")?
            .progress_chars("#>-"),
    );

    let mut offset = 0u32;
    while offset < capacity {
        let end = std::cmp::min(offset + ERASE_CHUNK_SIZE, capacity);
        if let Err(e) = slot.erase_range(ByteRange::new(offset, end)?) {
            pb.abandon_with_message(format!("Erase failed at 0x{:04X}", offset));
            return Err(e.into());
        }
        offset = end;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Erase complete");
    println!("Erased all {} bytes of slot {}", capacity, slot.index());
    Ok(())
}
