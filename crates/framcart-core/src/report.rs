//! Operator-facing text
//!
//! Pure functions turning slot status and byte buffers into display lines.
//! Nothing in here touches the bus.

use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::error::Error;
use crate::session::{menu_commands, Command};

/// The one status line shown for every absence or transport failure
pub const NO_CART_ERROR: &str = "Unable to access FRAM";

/// Confirmation after a successful write or erase
pub const OK: &str = "ok";

/// Bytes shown per hex dump row
pub const BYTES_PER_ROW: usize = 16;

/// Status line for a slot without a cart
pub fn empty_slot(index: usize) -> String {
    format!("Slot {}: Empty", index)
}

/// Header line preceding the dump of an occupied slot
pub fn slot_header(index: usize, end: usize) -> String {
    format!("Slot {} fram_bytes[0:{}]:", index, end)
}

/// Capacity line shown under the header of an occupied slot
pub fn capacity_line(capacity: u32) -> String {
    format!("  len(fram) = {}", capacity)
}

/// Status line for a failed operation
pub fn error_line(err: &Error) -> String {
    if err.is_unreachable() {
        String::from(NO_CART_ERROR)
    } else {
        format!("Error: {}", err)
    }
}

/// Format one dump row: offset, 16 hex cells, ASCII column
///
/// A short row keeps the ASCII column aligned by filling the missing hex
/// cells with two-space blanks.
pub fn hexdump_row(offset: usize, row: &[u8]) -> String {
    let mut line = format!("{:04X}:", offset);
    for i in 0..BYTES_PER_ROW {
        match row.get(i) {
            Some(b) => {
                let _ = write!(line, " {:02X}", b);
            }
            None => line.push_str("   "),
        }
    }
    line.push_str("  ");
    line.extend(row.iter().map(|&b| {
        if b.is_ascii_graphic() || b == b' ' {
            b as char
        } else {
            '.'
        }
    }));
    line
}

/// Hex+ASCII dump, 16 bytes per row
pub fn hexdump(bytes: &[u8]) -> Vec<String> {
    hexdump_at(0, bytes)
}

/// Hex+ASCII dump of bytes that start at memory offset `base`
pub fn hexdump_at(base: usize, bytes: &[u8]) -> Vec<String> {
    bytes
        .chunks(BYTES_PER_ROW)
        .enumerate()
        .map(|(i, row)| hexdump_row(base + i * BYTES_PER_ROW, row))
        .collect()
}

fn menu_label(command: &Command, limit: usize) -> String {
    match command {
        Command::Rescan => String::from("Rescan carts"),
        Command::Write { slot } => {
            format!("Write string to slot {} (limit {} characters)", slot, limit)
        }
        Command::Erase { slot } => {
            format!("Erase first {} bytes of slot {} (set to 0)", limit, slot)
        }
    }
}

/// The menu prompt for a topology with `slot_count` slots
pub fn menu(slot_count: usize, limit: usize) -> String {
    let mut text = String::from("Menu:\n");
    for command in menu_commands(slot_count) {
        let _ = writeln!(text, " {}  {}", command.key(), menu_label(&command, limit));
    }
    text.push_str("choice [1]: ");
    text
}

/// Prompt asking for the string to write
pub fn write_prompt(limit: usize) -> String {
    format!("what to write? (max {} chars): ", limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_row() {
        let mut bytes = [0u8; 16];
        bytes[..5].copy_from_slice(b"hello");
        assert_eq!(
            hexdump_row(0, &bytes),
            format!("0000: 68 65 6C 6C 6F{}  hello{}", " 00".repeat(11), ".".repeat(11))
        );
    }

    #[test]
    fn test_short_row_is_padded() {
        let line = hexdump_row(0x20, b"AB");
        assert_eq!(line, format!("0020: 41 42{}  AB", " ".repeat(42)));
        assert_eq!(line.len(), hexdump_row(0, &[0u8; 16]).len() - 14);
    }

    #[test]
    fn test_dump_rows() {
        let rows = hexdump(&[0xFFu8; 40]);
        assert_eq!(rows.len(), 3);
        assert!(rows[1].starts_with("0010: FF"));
        assert!(rows[2].starts_with("0020: FF FF FF FF FF FF FF FF   "));

        let rows = hexdump_at(0x100, &[0u8; 17]);
        assert!(rows[0].starts_with("0100: 00"));
        assert!(rows[1].starts_with("0110: 00   "));
    }

    #[test]
    fn test_status_lines() {
        assert_eq!(empty_slot(1), "Slot 1: Empty");
        assert_eq!(slot_header(0, 64), "Slot 0 fram_bytes[0:64]:");
        assert_eq!(capacity_line(8192), "  len(fram) = 8192");
        assert_eq!(error_line(&Error::DeviceAbsent), NO_CART_ERROR);
        assert_eq!(error_line(&Error::BusFault), NO_CART_ERROR);
        assert_eq!(
            error_line(&Error::AddressOutOfBounds),
            "Error: address out of bounds"
        );
    }

    #[test]
    fn test_menu_text() {
        let single = menu(1, 32);
        assert_eq!(
            single,
            "Menu:\n 1  Rescan carts\n 2  Write string to slot 0 (limit 32 characters)\n 3  Erase first 32 bytes of slot 0 (set to 0)\nchoice [1]: "
        );
        let dual = menu(2, 32);
        assert!(dual.contains(" 4  Write string to slot 1"));
        assert!(dual.contains(" 5  Erase first 32 bytes of slot 1"));
    }
}
