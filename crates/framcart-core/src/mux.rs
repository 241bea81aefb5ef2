//! I2C multiplexer router
//!
//! Supports TCA9548A-compatible switches: a single control register at the
//! mux address, one bit per downstream channel. Only the first two channels
//! carry cart slots.

use bitflags::bitflags;
use maybe_async::maybe_async;

use crate::bus::{BusChannel, I2cBus, SharedBus};
use crate::error::{Error, Result};

/// Number of multiplexer channels that carry cart slots
pub const MUX_SLOTS: u8 = 2;

bitflags! {
    /// Multiplexer control register
    ///
    /// Each set bit connects the corresponding downstream channel to the
    /// upstream bus. The router only ever writes one-hot masks.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct MuxControl: u8 {
        /// Downstream channel 0
        const CH0 = 1 << 0;
        /// Downstream channel 1
        const CH1 = 1 << 1;
        /// Downstream channel 2
        const CH2 = 1 << 2;
        /// Downstream channel 3
        const CH3 = 1 << 3;
        /// Downstream channel 4
        const CH4 = 1 << 4;
        /// Downstream channel 5
        const CH5 = 1 << 5;
        /// Downstream channel 6
        const CH6 = 1 << 6;
        /// Downstream channel 7
        const CH7 = 1 << 7;
    }
}

impl MuxControl {
    /// One-hot mask selecting only `index`
    pub fn only(index: u8) -> Option<Self> {
        if index < 8 {
            Self::from_bits(1 << index)
        } else {
            None
        }
    }
}

/// Router over a detected multiplexer
///
/// Hands out independent `BusChannel`s for the slot channels. All of them
/// share the physical bus (and its lock) with the router.
pub struct MuxRouter<B: I2cBus> {
    bus: SharedBus<B>,
    address: u8,
}

impl<B: I2cBus> MuxRouter<B> {
    /// Detect a multiplexer at `address`
    ///
    /// The mux must acknowledge, accept an all-channels-off write and read
    /// that value back. Any failure is reported as `Error::MuxNotFound`,
    /// never as a transport error.
    #[maybe_async]
    pub async fn open(bus: SharedBus<B>, address: u8) -> Result<Self> {
        let raw = BusChannel::direct(bus.clone());
        let guard = raw.try_acquire().ok_or(Error::MuxNotFound)?;

        if !raw.probe(&guard, address).await {
            log::debug!("mux: nothing at 0x{:02X}", address);
            return Err(Error::MuxNotFound);
        }

        raw.write_raw(&guard, address, &[MuxControl::empty().bits()])
            .await
            .map_err(|e| {
                log::debug!("mux: failed to clear control register: {}", e);
                Error::MuxNotFound
            })?;

        let mut control = [0xFFu8; 1];
        raw.read_raw(&guard, address, &mut control)
            .await
            .map_err(|e| {
                log::debug!("mux: failed to read control register: {}", e);
                Error::MuxNotFound
            })?;
        if control[0] != MuxControl::empty().bits() {
            log::debug!(
                "mux: control register reads 0x{:02X} after clearing, not a mux",
                control[0]
            );
            return Err(Error::MuxNotFound);
        }

        log::debug!("mux: found at 0x{:02X}", address);
        Ok(Self { bus, address })
    }

    /// Multiplexer address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// The sub-bus channel for slot `index` (0 or 1)
    pub fn channel(&self, index: u8) -> Result<BusChannel<B>> {
        if index >= MUX_SLOTS {
            return Err(Error::InvalidChannel);
        }
        let select = MuxControl::only(index).ok_or(Error::InvalidChannel)?;
        Ok(BusChannel::routed(
            self.bus.clone(),
            self.address,
            index,
            select,
        ))
    }

    /// Both slot channels, in slot order
    pub fn slot_channels(&self) -> (BusChannel<B>, BusChannel<B>) {
        (
            BusChannel::routed(self.bus.clone(), self.address, 0, MuxControl::CH0),
            BusChannel::routed(self.bus.clone(), self.address, 1, MuxControl::CH1),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_hot_masks() {
        assert_eq!(MuxControl::only(0), Some(MuxControl::CH0));
        assert_eq!(MuxControl::only(1), Some(MuxControl::CH1));
        assert_eq!(MuxControl::only(7).map(|m| m.bits()), Some(0x80));
        assert_eq!(MuxControl::only(8), None);
    }
}
