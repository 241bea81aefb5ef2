//! Logical I2C channels
//!
//! A `BusChannel` is either the bare physical bus or one sub-bus of a
//! multiplexer. Both kinds share the physical bus through `SharedBus`, which
//! also owns the single `BusLock` for that bus: acquiring any channel locks
//! the wire, so a mux selection and the transfer that follows it always run
//! as one critical section.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{RefCell, RefMut};

use crate::bus::lock::{BusGuard, BusLock};
use crate::bus::traits::I2cBus;
use crate::error::{Error, Result};
use crate::fram::DEVICE_ID_ADDRESS;
use crate::mux::MuxControl;
use maybe_async::maybe_async;

/// Size of the FRAM memory address that prefixes every transfer
const MEMORY_ADDRESS_LEN: usize = 2;

struct Shared<B> {
    bus: RefCell<B>,
    lock: BusLock,
}

/// A physical bus shared between the channels built on top of it
pub struct SharedBus<B> {
    inner: Rc<Shared<B>>,
}

impl<B> SharedBus<B> {
    /// Wrap a physical bus
    pub fn new(bus: B) -> Self {
        Self {
            inner: Rc::new(Shared {
                bus: RefCell::new(bus),
                lock: BusLock::new(),
            }),
        }
    }

    /// The lock guarding this physical bus
    pub fn lock(&self) -> &BusLock {
        &self.inner.lock
    }

    fn borrow(&self) -> Result<RefMut<'_, B>> {
        self.inner.bus.try_borrow_mut().map_err(|_| Error::BusBusy)
    }
}

impl<B> Clone for SharedBus<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Route {
    mux_address: u8,
    select: MuxControl,
}

/// One logical I2C link: the bare bus, or a multiplexer sub-bus
///
/// Every transfer takes a `BusGuard` obtained from [`BusChannel::try_acquire`]
/// as proof that the caller holds the bus. Routed channels write their
/// one-hot selection mask to the multiplexer at the start of every
/// transaction, so devices on the other sub-buses are never visible.
pub struct BusChannel<B: I2cBus> {
    bus: SharedBus<B>,
    route: Option<Route>,
    index: u8,
}

impl<B: I2cBus> BusChannel<B> {
    /// Channel 0 directly on the physical bus
    pub fn direct(bus: SharedBus<B>) -> Self {
        Self {
            bus,
            route: None,
            index: 0,
        }
    }

    pub(crate) fn routed(bus: SharedBus<B>, mux_address: u8, index: u8, select: MuxControl) -> Self {
        Self {
            bus,
            route: Some(Route {
                mux_address,
                select,
            }),
            index,
        }
    }

    /// Channel index (always 0 for a direct channel)
    pub fn index(&self) -> u8 {
        self.index
    }

    /// Whether this channel goes through a multiplexer
    pub fn is_routed(&self) -> bool {
        self.route.is_some()
    }

    /// Try to take the bus without blocking
    pub fn try_acquire(&self) -> Option<BusGuard<'_>> {
        self.bus.lock().try_acquire()
    }

    /// Whether the underlying bus is currently locked
    pub fn is_locked(&self) -> bool {
        self.bus.lock().is_held()
    }

    fn check_guard(&self, guard: &BusGuard<'_>) -> Result<()> {
        if guard.guards(self.bus.lock()) {
            Ok(())
        } else {
            Err(Error::LockNotHeld)
        }
    }

    #[maybe_async]
    async fn select(&self, bus: &mut B) -> Result<()> {
        if let Some(route) = self.route {
            log::trace!(
                "mux 0x{:02X}: select channel {} (mask 0x{:02X})",
                route.mux_address,
                self.index,
                route.select.bits()
            );
            bus.write(route.mux_address, &[route.select.bits()]).await?;
        }
        Ok(())
    }

    /// Check whether a device acknowledges at `address` on this channel
    ///
    /// Absence is a normal outcome: every failure, including a failed mux
    /// selection, reads as `false`.
    #[maybe_async]
    pub async fn probe(&self, guard: &BusGuard<'_>, address: u8) -> bool {
        if self.check_guard(guard).is_err() {
            return false;
        }
        let Ok(mut bus) = self.bus.borrow() else {
            return false;
        };
        let result = match self.select(&mut bus).await {
            Ok(()) => bus.probe(address).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => true,
            Err(e) => {
                log::trace!(
                    "channel {}: no ack from 0x{:02X} ({})",
                    self.index,
                    address,
                    e
                );
                false
            }
        }
    }

    /// Read `buf.len()` bytes starting at memory `offset` of the device
    ///
    /// The read is split into transactions of at most `max_read_len()`
    /// bytes, each re-sending the memory address.
    #[maybe_async]
    pub async fn read(
        &self,
        guard: &BusGuard<'_>,
        address: u8,
        offset: u16,
        buf: &mut [u8],
    ) -> Result<()> {
        self.check_guard(guard)?;
        let mut bus = self.bus.borrow()?;
        self.select(&mut bus).await?;

        let chunk_len = bus.max_read_len().max(1);
        let mut at = offset as usize;
        for chunk in buf.chunks_mut(chunk_len) {
            let mem_addr = (at as u16).to_be_bytes();
            bus.write_read(address, &mem_addr, chunk).await?;
            at += chunk.len();
        }
        Ok(())
    }

    /// Write `data` starting at memory `offset` of the device
    #[maybe_async]
    pub async fn write(
        &self,
        guard: &BusGuard<'_>,
        address: u8,
        offset: u16,
        data: &[u8],
    ) -> Result<()> {
        self.check_guard(guard)?;
        let mut bus = self.bus.borrow()?;
        self.select(&mut bus).await?;

        let chunk_len = bus
            .max_write_len()
            .saturating_sub(MEMORY_ADDRESS_LEN)
            .max(1);
        let mut frame = Vec::with_capacity(chunk_len + MEMORY_ADDRESS_LEN);
        let mut at = offset as usize;
        for chunk in data.chunks(chunk_len) {
            frame.clear();
            frame.extend_from_slice(&(at as u16).to_be_bytes());
            frame.extend_from_slice(chunk);
            bus.write(address, &frame).await?;
            at += chunk.len();
        }
        Ok(())
    }

    /// Raw write-then-read on this channel, without a memory address prefix
    #[maybe_async]
    pub async fn write_read(
        &self,
        guard: &BusGuard<'_>,
        address: u8,
        data: &[u8],
        buf: &mut [u8],
    ) -> Result<()> {
        self.check_guard(guard)?;
        let mut bus = self.bus.borrow()?;
        self.select(&mut bus).await?;
        bus.write_read(address, data, buf).await
    }

    /// Raw write on this channel, without a memory address prefix
    #[maybe_async]
    pub async fn write_raw(&self, guard: &BusGuard<'_>, address: u8, data: &[u8]) -> Result<()> {
        self.check_guard(guard)?;
        let mut bus = self.bus.borrow()?;
        self.select(&mut bus).await?;
        bus.write(address, data).await
    }

    /// Raw read on this channel
    #[maybe_async]
    pub async fn read_raw(&self, guard: &BusGuard<'_>, address: u8, buf: &mut [u8]) -> Result<()> {
        self.check_guard(guard)?;
        let mut bus = self.bus.borrow()?;
        self.select(&mut bus).await?;
        bus.read(address, buf).await
    }

    /// Read the three device ID bytes of the device at `address`
    ///
    /// The query goes to the reserved ID address with the device's own
    /// address (shifted left by one) as the single write byte.
    #[maybe_async]
    pub async fn read_device_id(&self, guard: &BusGuard<'_>, address: u8) -> Result<[u8; 3]> {
        let mut raw = [0u8; 3];
        self.write_read(guard, DEVICE_ID_ADDRESS, &[address << 1], &mut raw)
            .await?;
        Ok(raw)
    }
}

#[cfg(all(test, feature = "is_sync"))]
mod tests {
    use super::*;
    use alloc::vec;

    /// Records every transaction; NACKs everything except `present`
    struct RecordingBus {
        present: u8,
        log: Vec<(u8, Vec<u8>)>,
        max_len: usize,
    }

    impl RecordingBus {
        fn new(present: u8) -> Self {
            Self {
                present,
                log: Vec::new(),
                max_len: 4,
            }
        }
    }

    impl I2cBus for RecordingBus {
        fn max_read_len(&self) -> usize {
            self.max_len
        }

        fn max_write_len(&self) -> usize {
            self.max_len
        }

        fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
            self.log.push((address, data.to_vec()));
            if address == self.present {
                Ok(())
            } else {
                Err(Error::Nack)
            }
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
            self.write_read(address, &[], buf)
        }

        fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
            self.write(address, data)?;
            buf.fill(0xA5);
            Ok(())
        }
    }

    #[test]
    fn test_read_is_chunked_and_addressed() {
        let shared = SharedBus::new(RecordingBus::new(0x50));
        let channel = BusChannel::direct(shared.clone());
        let guard = channel.try_acquire().unwrap();

        let mut buf = [0u8; 10];
        channel.read(&guard, 0x50, 0x0100, &mut buf).unwrap();
        assert!(buf.iter().all(|&b| b == 0xA5));

        let bus = shared.borrow().unwrap();
        let addrs: Vec<_> = bus.log.iter().map(|(_, d)| d.clone()).collect();
        assert_eq!(
            addrs,
            vec![vec![0x01, 0x00], vec![0x01, 0x04], vec![0x01, 0x08]]
        );
    }

    #[test]
    fn test_write_frames_leave_room_for_address() {
        let shared = SharedBus::new(RecordingBus::new(0x50));
        let channel = BusChannel::direct(shared.clone());
        let guard = channel.try_acquire().unwrap();

        channel.write(&guard, 0x50, 0, b"abcd").unwrap();

        let bus = shared.borrow().unwrap();
        assert_eq!(bus.log.len(), 2);
        assert_eq!(bus.log[0].1, vec![0x00, 0x00, b'a', b'b']);
        assert_eq!(bus.log[1].1, vec![0x00, 0x02, b'c', b'd']);
    }

    #[test]
    fn test_routed_channel_selects_before_every_transfer() {
        let shared = SharedBus::new(RecordingBus::new(0x70));
        let channel = BusChannel::routed(shared.clone(), 0x70, 1, MuxControl::CH1);
        let guard = channel.try_acquire().unwrap();

        assert!(channel.probe(&guard, 0x70));
        assert!(!channel.probe(&guard, 0x50));

        let bus = shared.borrow().unwrap();
        assert_eq!(bus.log[0], (0x70, vec![0x02]));
        assert_eq!(bus.log[2], (0x70, vec![0x02]));
        assert_eq!(bus.log[3], (0x50, vec![]));
    }

    #[test]
    fn test_foreign_guard_is_rejected() {
        let a = BusChannel::direct(SharedBus::new(RecordingBus::new(0x50)));
        let b = BusChannel::direct(SharedBus::new(RecordingBus::new(0x50)));
        let guard = a.try_acquire().unwrap();

        assert!(!b.probe(&guard, 0x50));
        let mut buf = [0u8; 1];
        assert_eq!(b.read(&guard, 0x50, 0, &mut buf), Err(Error::LockNotHeld));
    }

    #[test]
    fn test_lock_released_after_failed_transfer() {
        let channel = BusChannel::direct(SharedBus::new(RecordingBus::new(0x51)));
        {
            let guard = channel.try_acquire().unwrap();
            let mut buf = [0u8; 2];
            assert_eq!(channel.read(&guard, 0x50, 0, &mut buf), Err(Error::Nack));
        }
        assert!(!channel.is_locked());
        assert!(channel.try_acquire().is_some());
    }

    #[test]
    fn test_channels_on_one_bus_share_the_lock() {
        let shared = SharedBus::new(RecordingBus::new(0x50));
        let ch0 = BusChannel::routed(shared.clone(), 0x70, 0, MuxControl::CH0);
        let ch1 = BusChannel::routed(shared, 0x70, 1, MuxControl::CH1);

        let guard = ch0.try_acquire().unwrap();
        assert!(ch1.try_acquire().is_none());
        drop(guard);
        assert!(ch1.try_acquire().is_some());
    }
}
