//! FRAM cart slots
//!
//! A `FramSlot` binds one `BusChannel` to the fixed FRAM address. It holds no
//! presence state: every operation acquires the bus, probes the cart, and
//! only then transfers. The slot descriptor stays valid for the whole
//! session while carts come and go underneath it.
//!
//! Transfers use two-byte big-endian memory addressing (MB85RC-style parts
//! up to 64 KiB).

mod device_id;
mod range;

pub use device_id::{DeviceId, DEVICE_ID_ADDRESS, MANUFACTURER_FUJITSU, MAX_CAPACITY};
pub use range::{clip_payload, ByteRange};

use alloc::vec;
use alloc::vec::Vec;
use maybe_async::maybe_async;

use crate::bus::{BusChannel, BusGuard, I2cBus};
use crate::config::SessionConfig;
use crate::error::{Error, Result};

/// Outcome of a presence scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// No cart answered
    Empty,
    /// A cart answered; carries its capacity in bytes
    Occupied(u32),
}

impl Presence {
    /// Whether a cart is present
    pub fn is_occupied(&self) -> bool {
        matches!(self, Self::Occupied(_))
    }

    /// Capacity of the present cart
    pub fn capacity(&self) -> Option<u32> {
        match self {
            Self::Empty => None,
            Self::Occupied(capacity) => Some(*capacity),
        }
    }
}

/// Map a transfer failure to "the cart went away"
fn lost(slot: usize, what: &str, e: Error) -> Error {
    log::debug!("slot {}: {} failed: {}", slot, what, e);
    Error::DeviceAbsent
}

/// One cart position, bound to a channel for the whole session
pub struct FramSlot<B: I2cBus> {
    index: usize,
    channel: BusChannel<B>,
    config: SessionConfig,
}

impl<B: I2cBus> FramSlot<B> {
    /// Bind slot `index` to `channel`
    pub fn new(index: usize, channel: BusChannel<B>, config: SessionConfig) -> Self {
        Self {
            index,
            channel,
            config,
        }
    }

    /// Slot index as shown to the operator
    pub fn index(&self) -> usize {
        self.index
    }

    /// FRAM address on the channel
    pub fn address(&self) -> u8 {
        self.config.fram_address
    }

    /// Maximum write payload for this slot
    pub fn limit(&self) -> usize {
        self.config.limit
    }

    /// The channel this slot talks through
    pub fn channel(&self) -> &BusChannel<B> {
        &self.channel
    }

    fn acquire(&self) -> Result<BusGuard<'_>> {
        self.channel.try_acquire().ok_or_else(|| {
            log::warn!("slot {}: bus is busy", self.index);
            Error::BusBusy
        })
    }

    #[maybe_async]
    async fn read_id_locked(&self, guard: &BusGuard<'_>) -> Result<DeviceId> {
        let raw = self.channel.read_device_id(guard, self.address()).await?;
        Ok(DeviceId::from_bytes(raw))
    }

    #[maybe_async]
    async fn capacity_locked(&self, guard: &BusGuard<'_>) -> u32 {
        match self.read_id_locked(guard).await {
            Ok(id) => match id.capacity() {
                Some(capacity) => {
                    log::trace!("slot {}: {} reports {} bytes", self.index, id, capacity);
                    capacity
                }
                None => {
                    log::debug!(
                        "slot {}: unusable device ID {}, assuming {} bytes",
                        self.index,
                        id,
                        self.config.default_capacity
                    );
                    self.config.default_capacity
                }
            },
            Err(_) => {
                log::trace!(
                    "slot {}: no device ID, assuming {} bytes",
                    self.index,
                    self.config.default_capacity
                );
                self.config.default_capacity
            }
        }
    }

    /// Probe and size the cart while holding the bus
    #[maybe_async]
    async fn present_locked(&self, guard: &BusGuard<'_>) -> Result<u32> {
        if !self.channel.probe(guard, self.address()).await {
            log::debug!("slot {}: no cart", self.index);
            return Err(Error::DeviceAbsent);
        }
        Ok(self.capacity_locked(guard).await)
    }

    /// Check whether a cart is currently present
    ///
    /// Never fails: absence and a busy bus both read as `Empty`.
    #[maybe_async]
    pub async fn scan(&self) -> Presence {
        let Some(guard) = self.channel.try_acquire() else {
            log::warn!("slot {}: bus is busy, reporting empty", self.index);
            return Presence::Empty;
        };
        match self.present_locked(&guard).await {
            Ok(capacity) => Presence::Occupied(capacity),
            Err(_) => Presence::Empty,
        }
    }

    /// Read the cart's device ID
    #[maybe_async]
    pub async fn device_id(&self) -> Result<DeviceId> {
        let guard = self.acquire()?;
        self.present_locked(&guard).await?;
        self.read_id_locked(&guard).await
    }

    /// Read the bytes covered by `range`
    ///
    /// Presence is re-checked first. If the cart disappears during the
    /// transfer the partial buffer is dropped and `DeviceAbsent` returned.
    #[maybe_async]
    pub async fn read_range(&self, range: ByteRange) -> Result<Vec<u8>> {
        let guard = self.acquire()?;
        let capacity = self.present_locked(&guard).await?;
        range.check_within(capacity)?;

        let mut buf = vec![0u8; range.len()];
        if range.is_empty() {
            return Ok(buf);
        }
        self.channel
            .read(&guard, self.address(), range.start() as u16, &mut buf)
            .await
            .map_err(|e| lost(self.index, "read", e))?;

        log::debug!(
            "slot {}: read {} bytes at 0x{:04X}",
            self.index,
            buf.len(),
            range.start()
        );
        Ok(buf)
    }

    /// Write `data` starting at `offset`, truncated to the configured limit
    ///
    /// The payload goes out as a sequence of `write_chunk`-sized
    /// transactions. If the cart disappears part way through, the chunks
    /// already written stay written and the remainder of the range keeps its
    /// old contents; there is no rollback. Returns the number of bytes
    /// written.
    #[maybe_async]
    pub async fn write_range(&self, offset: u32, data: &[u8]) -> Result<usize> {
        let data = clip_payload(data, self.config.limit);
        let range = ByteRange::with_len(offset, data.len())?;

        let guard = self.acquire()?;
        let capacity = self.present_locked(&guard).await?;
        range.check_within(capacity)?;

        let mut written = 0usize;
        for chunk in data.chunks(self.config.write_chunk) {
            let at = range.start() as usize + written;
            if let Err(e) = self
                .channel
                .write(&guard, self.address(), at as u16, chunk)
                .await
            {
                log::warn!(
                    "slot {}: write interrupted after {} of {} bytes, cart left partially written",
                    self.index,
                    written,
                    data.len()
                );
                return Err(lost(self.index, "write", e));
            }
            written += chunk.len();
        }

        log::debug!(
            "slot {}: wrote {} bytes at 0x{:04X}",
            self.index,
            written,
            range.start()
        );
        Ok(written)
    }

    /// Set every byte in `range` to zero, one byte per transaction
    ///
    /// Same partial-failure behavior as [`FramSlot::write_range`].
    #[maybe_async]
    pub async fn erase_range(&self, range: ByteRange) -> Result<()> {
        let guard = self.acquire()?;
        let capacity = self.present_locked(&guard).await?;
        range.check_within(capacity)?;

        for at in range.start()..range.end() {
            if let Err(e) = self
                .channel
                .write(&guard, self.address(), at as u16, &[0])
                .await
            {
                log::warn!(
                    "slot {}: erase interrupted at 0x{:04X}, cart left partially erased",
                    self.index,
                    at
                );
                return Err(lost(self.index, "erase", e));
            }
        }

        log::debug!(
            "slot {}: erased 0x{:04X}..0x{:04X}",
            self.index,
            range.start(),
            range.end()
        );
        Ok(())
    }
}
