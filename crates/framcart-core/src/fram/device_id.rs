//! FRAM device ID decoding
//!
//! I2C FRAMs that support it answer a read at the reserved address `0x7C`
//! (after a write of the device's own address shifted left by one) with
//! three bytes: a 12-bit manufacturer ID followed by a 12-bit product ID.

use core::fmt;

/// Reserved slave address used for device ID reads
pub const DEVICE_ID_ADDRESS: u8 = 0x7C;

/// Fujitsu manufacturer ID
pub const MANUFACTURER_FUJITSU: u16 = 0x00A;

/// Largest capacity reachable with two-byte memory addressing
pub const MAX_CAPACITY: u32 = 64 * 1024;

/// Manufacturer and product identifiers of a FRAM device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceId {
    /// 12-bit manufacturer ID
    pub manufacturer: u16,
    /// 12-bit product ID
    pub product: u16,
}

impl DeviceId {
    /// Decode the three raw ID bytes
    pub fn from_bytes(raw: [u8; 3]) -> Self {
        Self {
            manufacturer: ((raw[0] as u16) << 4) | ((raw[1] as u16) >> 4),
            product: (((raw[1] & 0x0F) as u16) << 8) | raw[2] as u16,
        }
    }

    /// Encode back into the three raw ID bytes
    pub fn to_bytes(&self) -> [u8; 3] {
        [
            (self.manufacturer >> 4) as u8,
            (((self.manufacturer & 0x0F) << 4) as u8) | ((self.product >> 8) & 0x0F) as u8,
            self.product as u8,
        ]
    }

    /// Density code from bits 11..8 of the product ID
    pub fn density(&self) -> u8 {
        ((self.product >> 8) & 0x0F) as u8
    }

    /// Capacity in bytes implied by the density code
    ///
    /// `None` for IDs that look like a floating bus (all zeros or all ones)
    /// or that describe parts needing more than two address bytes.
    pub fn capacity(&self) -> Option<u32> {
        if (self.manufacturer == 0 && self.product == 0)
            || (self.manufacturer == 0xFFF && self.product == 0xFFF)
        {
            return None;
        }
        let capacity = 1024u32.checked_shl(self.density() as u32)?;
        (capacity <= MAX_CAPACITY).then_some(capacity)
    }

    /// Manufacturer name, when known
    pub fn vendor(&self) -> &'static str {
        match self.manufacturer {
            MANUFACTURER_FUJITSU => "Fujitsu",
            _ => "unknown",
        }
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (manufacturer 0x{:03X}, product 0x{:03X})",
            self.vendor(),
            self.manufacturer,
            self.product
        )
    }
}
