//! framcart-dummy - In-memory I2C bus emulator for testing
//!
//! This crate provides a dummy I2C bus with an optional TCA9548A-style
//! multiplexer and up to two FRAM carts behind it. Carts can be inserted and
//! pulled at any time through a [`DummyHandle`], including part way through
//! an operation, which makes it useful for exercising the hot-swap paths
//! without real hardware.

#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

use alloc::collections::VecDeque;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use framcart_core::bus::I2cBus;
use framcart_core::config::parse_number;
use framcart_core::error::{Error, Result};
use framcart_core::fram::{DeviceId, DEVICE_ID_ADDRESS, MANUFACTURER_FUJITSU, MAX_CAPACITY};
use framcart_core::session::Console;

/// Number of cart positions on the emulated board
pub const CART_SLOTS: usize = 2;

/// Configuration for the dummy bus
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// Multiplexer address, or `None` for a bare bus with one cart position
    pub mux_address: Option<u8>,
    /// Address every cart answers at
    pub fram_address: u8,
    /// Largest single transaction in bytes
    pub max_transfer_len: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            mux_address: Some(0x70),
            fram_address: 0x50,
            max_transfer_len: 32,
        }
    }
}

/// One emulated FRAM cart
#[derive(Debug, Clone)]
pub struct DummyCart {
    data: Vec<u8>,
    device_id: Option<[u8; 3]>,
    pointer: usize,
}

impl DummyCart {
    /// A cart of `size` bytes without device ID support, filled with 0xFF
    pub fn new(size: usize) -> Self {
        Self {
            data: vec![0xFF; size.max(1)],
            device_id: None,
            pointer: 0,
        }
    }

    /// A Fujitsu MB85RC-style cart that reports its density via device ID
    ///
    /// `size` is rounded down to a power of two between 1 KiB and 64 KiB.
    pub fn fujitsu(size: usize) -> Self {
        let size = size.clamp(1024, MAX_CAPACITY as usize);
        let density = (size / 1024).ilog2() as u16;
        let id = DeviceId {
            manufacturer: MANUFACTURER_FUJITSU,
            product: (density << 8) | 0x10,
        };
        let mut cart = Self::new(1024 << density);
        cart.device_id = Some(id.to_bytes());
        cart
    }

    /// A cart preloaded with `initial_data`
    pub fn with_data(mut self, initial_data: &[u8]) -> Self {
        let len = core::cmp::min(initial_data.len(), self.data.len());
        self.data[..len].copy_from_slice(&initial_data[..len]);
        self
    }

    /// Cart memory
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn write(&mut self, bytes: &[u8]) {
        // First two bytes set the address pointer; the rest is data
        if bytes.len() < 2 {
            return;
        }
        self.pointer = u16::from_be_bytes([bytes[0], bytes[1]]) as usize % self.data.len();
        for &b in &bytes[2..] {
            self.data[self.pointer] = b;
            self.pointer = (self.pointer + 1) % self.data.len();
        }
    }

    fn read(&mut self, buf: &mut [u8]) {
        for b in buf {
            *b = self.data[self.pointer];
            self.pointer = (self.pointer + 1) % self.data.len();
        }
    }
}

struct Removal {
    slot: usize,
    remaining: usize,
}

struct DummyState {
    config: DummyConfig,
    mux_control: u8,
    carts: [Option<DummyCart>; CART_SLOTS],
    pulled: [Option<DummyCart>; CART_SLOTS],
    removal: Option<Removal>,
    transactions: usize,
}

impl DummyState {
    /// Cart positions currently connected to the upstream bus
    fn visible(&self) -> impl Iterator<Item = usize> + '_ {
        (0..CART_SLOTS).filter(move |&slot| {
            self.carts[slot].is_some()
                && match self.config.mux_address {
                    Some(_) => self.mux_control & (1 << slot) != 0,
                    None => slot == 0,
                }
        })
    }

    /// The one cart answering on the bus right now
    fn target(&mut self) -> Result<usize> {
        let (first, more) = {
            let mut visible = self.visible();
            (visible.next(), visible.next().is_some())
        };
        let first = first.ok_or(Error::Nack)?;
        if more {
            log::trace!("dummy: two carts answering at once");
            return Err(Error::BusFault);
        }

        if let Some(removal) = self.removal.as_mut().filter(|r| r.slot == first) {
            if removal.remaining == 0 {
                log::debug!("dummy: cart pulled from slot {}", first);
                self.pulled[first] = self.carts[first].take();
                self.removal = None;
                return Err(Error::Nack);
            }
            removal.remaining -= 1;
        }
        Ok(first)
    }

    fn cart(&mut self) -> Result<&mut DummyCart> {
        let slot = self.target()?;
        self.carts[slot].as_mut().ok_or(Error::Nack)
    }

    fn is_mux(&self, address: u8) -> bool {
        self.config.mux_address == Some(address)
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
        if self.is_mux(address) {
            if let Some(&control) = data.last() {
                self.mux_control = control;
            }
            return Ok(());
        }
        if address == self.config.fram_address {
            self.cart()?.write(data);
            return Ok(());
        }
        Err(Error::Nack)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        if self.is_mux(address) {
            buf.fill(self.mux_control);
            return Ok(());
        }
        if address == self.config.fram_address {
            self.cart()?.read(buf);
            return Ok(());
        }
        Err(Error::Nack)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
        if address == DEVICE_ID_ADDRESS {
            if data.first() != Some(&(self.config.fram_address << 1)) {
                return Err(Error::Nack);
            }
            let id = self.cart()?.device_id.ok_or(Error::Nack)?;
            for (b, id) in buf.iter_mut().zip(id.iter().cycle()) {
                *b = *id;
            }
            return Ok(());
        }
        if self.is_mux(address) {
            self.write(address, data)?;
            return self.read(address, buf);
        }
        if address == self.config.fram_address {
            let cart = self.cart()?;
            cart.write(data);
            cart.read(buf);
            return Ok(());
        }
        Err(Error::Nack)
    }
}

/// Dummy I2C bus
///
/// Cloning a `DummyBus` is cheap; every clone drives the same emulated board.
#[derive(Clone)]
pub struct DummyBus {
    state: Rc<RefCell<DummyState>>,
}

impl DummyBus {
    /// Create an empty board with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        Self {
            state: Rc::new(RefCell::new(DummyState {
                config,
                mux_control: 0,
                carts: [None, None],
                pulled: [None, None],
                removal: None,
                transactions: 0,
            })),
        }
    }

    /// Create an empty board with a multiplexer at 0x70
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Handle for hot-plugging carts while the bus is in use
    pub fn handle(&self) -> DummyHandle {
        DummyHandle {
            state: Rc::clone(&self.state),
        }
    }
}

impl I2cBus for DummyBus {
    fn max_read_len(&self) -> usize {
        self.state.borrow().config.max_transfer_len
    }

    fn max_write_len(&self) -> usize {
        self.state.borrow().config.max_transfer_len
    }

    fn write(&mut self, address: u8, data: &[u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;
        if data.len() > state.config.max_transfer_len {
            return Err(Error::BusFault);
        }
        state.write(address, data)
    }

    fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;
        if buf.len() > state.config.max_transfer_len {
            return Err(Error::BusFault);
        }
        state.read(address, buf)
    }

    fn write_read(&mut self, address: u8, data: &[u8], buf: &mut [u8]) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;
        if buf.len() > state.config.max_transfer_len {
            return Err(Error::BusFault);
        }
        state.write_read(address, data, buf)
    }
}

/// Test-side access to the emulated board
#[derive(Clone)]
pub struct DummyHandle {
    state: Rc<RefCell<DummyState>>,
}

impl DummyHandle {
    /// Plug `cart` into `slot`, replacing whatever was there
    pub fn insert(&self, slot: usize, cart: DummyCart) {
        if let Some(position) = self.state.borrow_mut().carts.get_mut(slot) {
            *position = Some(cart);
        }
    }

    /// Pull the cart out of `slot`
    pub fn remove(&self, slot: usize) -> Option<DummyCart> {
        self.state.borrow_mut().carts.get_mut(slot)?.take()
    }

    /// Pull the cart out of `slot` after it has answered `transactions` more
    /// transactions
    pub fn remove_after(&self, slot: usize, transactions: usize) {
        self.state.borrow_mut().removal = Some(Removal {
            slot,
            remaining: transactions,
        });
    }

    /// Memory of the cart that a scheduled [`DummyHandle::remove_after`]
    /// pulled out of `slot`, as it was at the moment of removal
    pub fn pulled_data(&self, slot: usize) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        state
            .pulled
            .get(slot)?
            .as_ref()
            .map(|cart| cart.data().to_vec())
    }

    /// Copy of the memory of the cart in `slot`
    pub fn cart_data(&self, slot: usize) -> Option<Vec<u8>> {
        let state = self.state.borrow();
        state
            .carts
            .get(slot)?
            .as_ref()
            .map(|cart| cart.data().to_vec())
    }

    /// Current multiplexer control register
    pub fn mux_control(&self) -> u8 {
        self.state.borrow().mux_control
    }

    /// Total transactions seen on the bus
    pub fn transactions(&self) -> usize {
        self.state.borrow().transactions
    }
}

/// Parse bus options into a populated board
///
/// # Options
///
/// - `mux=0|1` - emulate a multiplexer at 0x70 (default: 1)
/// - `carts=N` - number of carts inserted at start (default: 0)
/// - `size=N` - cart size in bytes, decimal or hex (default: 32768)
/// - `id=0|1` - carts report a device ID (default: 1)
pub fn parse_options(options: &[(&str, &str)]) -> Result<DummyBus> {
    let mut config = DummyConfig::default();
    let mut carts = 0usize;
    let mut size = 32 * 1024usize;
    let mut with_id = true;

    for (key, value) in options {
        let number = || {
            parse_number(value).map_err(|e| {
                log::error!("dummy: bad value for '{}': {}", key, e);
                Error::InvalidConfig
            })
        };
        match *key {
            "mux" => {
                if number()? == 0 {
                    config.mux_address = None;
                }
            }
            "carts" => carts = number()? as usize,
            "size" => size = number()? as usize,
            "id" => with_id = number()? != 0,
            _ => {
                log::error!("dummy: unknown option '{}'", key);
                return Err(Error::InvalidConfig);
            }
        }
    }

    let positions = if config.mux_address.is_some() {
        CART_SLOTS
    } else {
        1
    };
    if carts > positions {
        log::error!(
            "dummy: {} carts requested but the board has {} position(s)",
            carts,
            positions
        );
        return Err(Error::InvalidConfig);
    }

    let bus = DummyBus::new(config);
    let handle = bus.handle();
    for slot in 0..carts {
        let cart = if with_id {
            DummyCart::fujitsu(size)
        } else {
            DummyCart::new(size.min(MAX_CAPACITY as usize))
        };
        handle.insert(slot, cart);
    }
    log::debug!("dummy: board ready with {} cart(s)", carts);
    Ok(bus)
}

/// Console fed from a fixed list of input lines, recording everything shown
#[derive(Debug, Default)]
pub struct ScriptedConsole {
    input: VecDeque<String>,
    output: Vec<String>,
}

impl ScriptedConsole {
    /// A console that answers prompts with `lines`, then reports end of input
    pub fn new<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            input: lines.into_iter().map(Into::into).collect(),
            output: Vec::new(),
        }
    }

    /// Everything shown or prompted so far
    pub fn output(&self) -> &[String] {
        &self.output
    }

    /// Forget recorded output
    pub fn clear(&mut self) {
        self.output.clear();
    }
}

impl Console for ScriptedConsole {
    fn show(&mut self, line: &str) {
        self.output.push(line.into());
    }

    fn prompt(&mut self, text: &str) -> Option<String> {
        self.output.push(text.into());
        self.input.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use framcart_core::bus::{BusChannel, SharedBus};
    use framcart_core::config::SessionConfig;
    use framcart_core::fram::{ByteRange, FramSlot, Presence};
    use framcart_core::mux::MuxRouter;
    use framcart_core::report::{self, NO_CART_ERROR};
    use framcart_core::session::{Command, Session};
    use framcart_core::topology::{self, Topology};

    fn dual() -> (Topology<DummyBus>, DummyHandle) {
        let bus = DummyBus::new_default();
        let handle = bus.handle();
        (topology::select(bus, &SessionConfig::default()), handle)
    }

    fn single() -> (Topology<DummyBus>, DummyHandle) {
        let bus = DummyBus::new(DummyConfig {
            mux_address: None,
            ..DummyConfig::default()
        });
        let handle = bus.handle();
        (topology::select(bus, &SessionConfig::default()), handle)
    }

    fn slot(topology: &Topology<DummyBus>, index: usize) -> &FramSlot<DummyBus> {
        topology.slot(index).unwrap()
    }

    #[test]
    fn test_fujitsu_device_id() {
        let cart = DummyCart::fujitsu(32 * 1024);
        assert_eq!(cart.device_id, Some([0x00, 0xA5, 0x10]));
        assert_eq!(cart.data().len(), 32 * 1024);
        assert_eq!(DummyCart::fujitsu(3000).data().len(), 2048);
    }

    #[test]
    fn test_mux_selects_topology() {
        let (topology, _) = dual();
        assert!(topology.is_dual());
        assert_eq!(topology.slot_count(), 2);

        let (topology, _) = single();
        assert!(!topology.is_dual());
        assert_eq!(topology.slot_count(), 1);
        assert!(topology.slot(1).is_none());
        assert_eq!(topology.slots().count(), 1);
    }

    #[test]
    fn test_scan_reports_capacity() {
        let (topology, handle) = dual();
        assert_eq!(slot(&topology, 0).scan(), Presence::Empty);

        handle.insert(0, DummyCart::fujitsu(8 * 1024));
        handle.insert(1, DummyCart::new(4096));
        assert_eq!(slot(&topology, 0).scan(), Presence::Occupied(8 * 1024));
        // No device ID: falls back to the configured default
        assert_eq!(
            slot(&topology, 1).scan(),
            Presence::Occupied(SessionConfig::default().default_capacity)
        );
    }

    #[test]
    fn test_scan_is_idempotent() {
        let (topology, handle) = dual();
        handle.insert(1, DummyCart::fujitsu(32 * 1024));
        for slot in topology.slots() {
            assert_eq!(slot.scan(), slot.scan());
        }
    }

    #[test]
    fn test_write_read_round_trip() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);

        let payload: Vec<u8> = (0..40u8).collect();
        assert_eq!(slot0.write_range(0x100, &payload).unwrap(), 40);

        let range = ByteRange::with_len(0x100, 40).unwrap();
        assert_eq!(slot0.read_range(range).unwrap(), payload);
        assert_eq!(&handle.cart_data(0).unwrap()[0x100..0x128], &payload[..]);

        // Exactly LIMIT bytes go through untouched
        let limit = slot0.limit();
        let payload: Vec<u8> = (0..limit).map(|i| (i as u8).wrapping_mul(7)).collect();
        assert_eq!(slot0.write_range(0x200, &payload).unwrap(), limit);
        let range = ByteRange::with_len(0x200, limit).unwrap();
        assert_eq!(slot0.read_range(range).unwrap(), payload);
        assert_eq!(handle.cart_data(0).unwrap()[0x200 + limit], 0xFF);
    }

    #[test]
    fn test_oversized_write_is_truncated() {
        let (topology, handle) = single();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);
        let limit = slot0.limit();

        let payload = vec![b'x'; limit + 10];
        assert_eq!(slot0.write_range(0, &payload).unwrap(), limit);

        let data = handle.cart_data(0).unwrap();
        assert!(data[..limit].iter().all(|&b| b == b'x'));
        assert_eq!(data[limit], 0xFF);
    }

    #[test]
    fn test_erase_zeroes_range() {
        let (topology, handle) = dual();
        handle.insert(1, DummyCart::fujitsu(32 * 1024).with_data(&[0xAB; 128]));
        let slot1 = slot(&topology, 1);

        let range = ByteRange::new(0, 64).unwrap();
        slot1.erase_range(range).unwrap();
        assert_eq!(slot1.read_range(range).unwrap(), vec![0u8; 64]);
        assert_eq!(handle.cart_data(1).unwrap()[64], 0xAB);
    }

    #[test]
    fn test_erase_at_offset() {
        let (topology, handle) = single();
        handle.insert(0, DummyCart::fujitsu(8 * 1024).with_data(&[0xAB; 64]));
        let slot0 = slot(&topology, 0);

        slot0.erase_range(ByteRange::new(16, 48).unwrap()).unwrap();
        let data = handle.cart_data(0).unwrap();
        assert_eq!(data[15], 0xAB);
        assert!(data[16..48].iter().all(|&b| b == 0));
        assert_eq!(data[48], 0xAB);
    }

    #[test]
    fn test_mux_router_channels() {
        let bus = DummyBus::new_default();
        let router = MuxRouter::open(SharedBus::new(bus), 0x70).unwrap();
        assert_eq!(router.channel(1).unwrap().index(), 1);
        assert!(router.channel(1).unwrap().is_routed());
        assert_eq!(router.channel(2).err(), Some(Error::InvalidChannel));

        let (ch0, ch1) = router.slot_channels();
        assert_eq!((ch0.index(), ch1.index()), (0, 1));
    }

    #[test]
    fn test_out_of_bounds_range() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(1024));
        let slot0 = slot(&topology, 0);

        let range = ByteRange::new(1000, 1100).unwrap();
        assert_eq!(slot0.read_range(range), Err(Error::AddressOutOfBounds));
        assert_eq!(slot0.write_range(1020, b"too long"), Err(Error::AddressOutOfBounds));
        assert_eq!(handle.cart_data(0).unwrap()[1020], 0xFF);
    }

    #[test]
    fn test_removed_between_scan_and_read() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);

        assert!(slot0.scan().is_occupied());
        handle.remove(0);
        let range = ByteRange::with_len(0, 16).unwrap();
        assert_eq!(slot0.read_range(range), Err(Error::DeviceAbsent));
        assert_eq!(slot0.scan(), Presence::Empty);
    }

    #[test]
    fn test_removed_mid_read() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);

        // Probe, device ID, then the first 32-byte chunk succeed
        handle.remove_after(0, 3);
        let range = ByteRange::with_len(0, 64).unwrap();
        assert_eq!(slot0.read_range(range), Err(Error::DeviceAbsent));
        assert!(handle.cart_data(0).is_none());
        assert!(handle.pulled_data(0).is_some());
        assert!(!slot0.channel().is_locked());
    }

    #[test]
    fn test_removed_mid_write_leaves_prefix() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);

        // Probe, device ID, then one 16-byte chunk
        handle.remove_after(0, 3);
        let payload: Vec<u8> = (1..=48u8).collect();
        assert_eq!(slot0.write_range(0, &payload), Err(Error::DeviceAbsent));
        assert!(!slot0.channel().is_locked());
        assert_eq!(slot0.scan(), Presence::Empty);

        let pulled = handle.pulled_data(0).unwrap();
        assert_eq!(&pulled[..16], &payload[..16]);
        assert!(pulled[16..48].iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_failed_transfer_releases_lock() {
        let (topology, _) = dual();
        let slot0 = slot(&topology, 0);
        assert_eq!(slot0.write_range(0, b"abc"), Err(Error::DeviceAbsent));
        assert!(!slot0.channel().is_locked());
        assert!(slot0.channel().try_acquire().is_some());
    }

    #[test]
    fn test_busy_bus_reads_empty() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        let slot0 = slot(&topology, 0);
        let slot1 = slot(&topology, 1);

        let guard = slot1.channel().try_acquire().unwrap();
        assert_eq!(slot0.scan(), Presence::Empty);
        assert_eq!(slot0.write_range(0, b"abc"), Err(Error::BusBusy));
        drop(guard);
        assert!(slot0.scan().is_occupied());
    }

    #[test]
    fn test_slots_are_isolated() {
        let (topology, handle) = dual();
        handle.insert(0, DummyCart::fujitsu(32 * 1024));
        handle.insert(1, DummyCart::fujitsu(32 * 1024));

        slot(&topology, 0).write_range(0, b"MARK").unwrap();
        let range = ByteRange::with_len(0, 4).unwrap();
        assert_ne!(slot(&topology, 1).read_range(range).unwrap(), b"MARK");
        assert_eq!(&handle.cart_data(1).unwrap()[..4], &[0xFF; 4]);
        assert_eq!(handle.mux_control(), 0x02);
    }

    #[test]
    fn test_collision_without_selection() {
        let bus = DummyBus::new_default();
        let handle = bus.handle();
        handle.insert(0, DummyCart::new(1024));
        handle.insert(1, DummyCart::new(1024));

        // Both channels switched on at once
        let mut upstream = bus.clone();
        upstream.write(0x70, &[0x03]).unwrap();
        assert_eq!(upstream.probe(0x50), Err(Error::BusFault));

        let raw = BusChannel::direct(SharedBus::new(bus));
        let guard = raw.try_acquire().unwrap();
        assert!(!raw.probe(&guard, 0x50));
    }

    #[test]
    fn test_parse_options() {
        let bus = parse_options(&[("mux", "1"), ("carts", "2"), ("size", "0x2000")]).unwrap();
        let topology = topology::select(bus, &SessionConfig::default());
        assert!(topology.is_dual());
        for slot in topology.slots() {
            assert_eq!(slot.scan(), Presence::Occupied(0x2000));
        }

        assert!(parse_options(&[("mux", "0"), ("carts", "2")]).is_err());
        assert!(parse_options(&[("colour", "red")]).is_err());
        assert!(parse_options(&[("size", "big")]).is_err());
    }

    #[test]
    fn test_session_hello_scenario() {
        let bus = DummyBus::new_default();
        let handle = bus.handle();
        let config = SessionConfig {
            limit: 32,
            ..SessionConfig::default()
        };
        let topology = topology::select(bus, &config);
        let console = ScriptedConsole::new(["hello\r\n"]);
        let mut session = Session::new(topology, console, &config);

        // Both slots empty
        session.report_slots();
        assert_eq!(
            session.console().output(),
            &[report::empty_slot(0), report::empty_slot(1)]
        );
        session.console_mut().clear();

        // Cart arrives in slot 0, operator writes "hello"
        handle.insert(0, DummyCart::fujitsu(32 * 1024).with_data(&[0u8; 64]));
        session.execute(Command::Write { slot: 0 });
        assert_eq!(
            session.console().output().last().map(String::as_str),
            Some(report::OK)
        );
        assert_eq!(&handle.cart_data(0).unwrap()[..5], b"hello");
        session.console_mut().clear();

        session.report_slots();
        let output = session.console().output().to_vec();
        assert_eq!(output[0], report::slot_header(0, 32));
        assert_eq!(output[1], "  len(fram) = 32768");
        assert!(output[2].starts_with("0000: 68 65 6C 6C 6F 00"));
        assert!(output[2].ends_with("hello..........."));
        assert_eq!(output[4], report::empty_slot(1));
        session.console_mut().clear();

        // Erase slot 0
        session.execute(Command::Erase { slot: 0 });
        assert_eq!(
            session.console().output(),
            &[String::from("Erasing..."), String::from(report::OK)]
        );
        let range = ByteRange::with_len(0, 32).unwrap();
        assert_eq!(
            session.topology().slot(0).unwrap().read_range(range).unwrap(),
            vec![0u8; 32]
        );
    }

    #[test]
    fn test_session_cart_smaller_than_limit() {
        let bus = DummyBus::new_default();
        let handle = bus.handle();
        handle.insert(0, DummyCart::new(32).with_data(&[0xAB; 32]));
        let config = SessionConfig {
            default_capacity: 32,
            ..SessionConfig::default()
        };
        let topology = topology::select(bus, &config);
        let console = ScriptedConsole::new(Vec::<String>::new());
        let mut session = Session::new(topology, console, &config);

        session.report_slots();
        let output = session.console().output().to_vec();
        assert_eq!(output[0], "Slot 0 fram_bytes[0:32]:");
        assert_eq!(output[1], report::capacity_line(32));
        assert_eq!(output.len(), 5);
        assert_eq!(output[4], report::empty_slot(1));
        session.console_mut().clear();

        session.execute(Command::Erase { slot: 0 });
        assert_eq!(
            session.console().output(),
            &[String::from("Erasing..."), String::from(report::OK)]
        );
        assert_eq!(handle.cart_data(0).unwrap(), vec![0u8; 32]);
    }

    #[test]
    fn test_session_runs_until_input_closes() {
        let bus = DummyBus::new_default();
        let handle = bus.handle();
        handle.insert(1, DummyCart::fujitsu(32 * 1024));
        let config = SessionConfig::default();
        let topology = topology::select(bus, &config);
        let console = ScriptedConsole::new(["4", "abc", "9", "3"]);
        let mut session = Session::new(topology, console, &config);

        session.run();

        let output = session.into_console().output().to_vec();
        assert!(output.iter().any(|l| l == "Writing..."));
        // Erase on the empty slot 0 reports the unreachable status
        assert_eq!(output.iter().filter(|l| *l == NO_CART_ERROR).count(), 1);
        assert_eq!(&handle.cart_data(1).unwrap()[..3], b"abc");
    }
}
