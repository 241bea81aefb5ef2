//! Read command implementation

use framcart_core::bus::I2cBus;
use framcart_core::fram::{ByteRange, FramSlot};
use framcart_core::report;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::path::Path;

use super::require_cart;

/// Chunk size for whole-cart reads (1 KiB)
const READ_CHUNK_SIZE: usize = 1024;

/// Read `length` bytes at `start` and dump them or save them to `output`
pub fn run_read<B: I2cBus>(
    slot: &FramSlot<B>,
    start: u32,
    length: usize,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let range = ByteRange::with_len(start, length)?;
    let data = slot.read_range(range)?;
    emit(&data, start, output)
}

/// Read the whole cart with a progress bar
pub fn run_read_all<B: I2cBus>(
    slot: &FramSlot<B>,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let capacity = require_cart(slot)?;
    println!("Slot {}: {} bytes", slot.index(), capacity);

    let data = read_with_progress(slot, capacity)?;
    emit(&data, 0, output)
}

/// Read `capacity` bytes in chunks, each one presence-checked
pub fn read_with_progress<B: I2cBus>(
    slot: &FramSlot<B>,
    capacity: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let total_size = capacity as usize;
    let mut data = Vec::with_capacity(total_size);

    let pb = ProgressBar::new(total_size as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})")?
            .progress_chars("#>-"),
    );

    let mut offset = 0usize;
    while offset < total_size {
        let chunk_size = std::cmp::min(READ_CHUNK_SIZE, total_size - offset);
        let range = ByteRange::with_len(offset as u32, chunk_size)?;

        match slot.read_range(range) {
            Ok(chunk) => data.extend_from_slice(&chunk),
            Err(e) => {
                pb.abandon_with_message("Read failed");
                return Err(e.into());
            }
        }

        offset += chunk_size;
        pb.set_position(offset as u64);
    }

    pb.finish_with_message("Read complete");
    Ok(data)
}

fn emit(data: &[u8], start: u32, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            fs::write(path, data)?;
            println!("Wrote {} bytes to {:?}", data.len(), path);
        }
        None => {
            for row in report::hexdump_at(start as usize, data) {
                println!("{}", row);
            }
        }
    }
    Ok(())
}
