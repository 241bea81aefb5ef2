//! Topology selection
//!
//! Decided once at startup: with a multiplexer the session has two slots,
//! without one it has a single slot on the bare bus. The choice is never
//! revisited, so a mux plugged in later goes unnoticed until restart.

use core::iter;
use maybe_async::maybe_async;

use crate::bus::{BusChannel, I2cBus, SharedBus};
use crate::config::SessionConfig;
use crate::fram::FramSlot;
use crate::mux::MuxRouter;

/// The fixed set of slots for a session
pub enum Topology<B: I2cBus> {
    /// No multiplexer: one slot directly on the physical bus
    Single {
        /// The only slot
        slot0: FramSlot<B>,
    },
    /// Multiplexer present: one slot per routed channel
    Dual {
        /// Slot on mux channel 0
        slot0: FramSlot<B>,
        /// Slot on mux channel 1
        slot1: FramSlot<B>,
    },
}

impl<B: I2cBus> Topology<B> {
    /// Number of slots (1 or 2)
    pub fn slot_count(&self) -> usize {
        match self {
            Self::Single { .. } => 1,
            Self::Dual { .. } => 2,
        }
    }

    /// Whether the session runs through a multiplexer
    pub fn is_dual(&self) -> bool {
        matches!(self, Self::Dual { .. })
    }

    /// Slot by index
    pub fn slot(&self, index: usize) -> Option<&FramSlot<B>> {
        match (self, index) {
            (Self::Single { slot0 }, 0) | (Self::Dual { slot0, .. }, 0) => Some(slot0),
            (Self::Dual { slot1, .. }, 1) => Some(slot1),
            _ => None,
        }
    }

    /// All slots in index order
    pub fn slots(&self) -> impl Iterator<Item = &FramSlot<B>> {
        let (first, second) = match self {
            Self::Single { slot0 } => (slot0, None),
            Self::Dual { slot0, slot1 } => (slot0, Some(slot1)),
        };
        iter::once(first).chain(second)
    }

    /// Short human readable name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Single { .. } => "single",
            Self::Dual { .. } => "dual",
        }
    }
}

/// Pick the session topology for `bus`
///
/// Tries to open the multiplexer at `config.mux_address`; any failure falls
/// back to a single slot directly on the bus.
#[maybe_async]
pub async fn select<B: I2cBus>(bus: B, config: &SessionConfig) -> Topology<B> {
    let shared = SharedBus::new(bus);

    match MuxRouter::open(shared.clone(), config.mux_address).await {
        Ok(router) => {
            log::info!(
                "Multiplexer found at 0x{:02X}: two cart slots",
                router.address()
            );
            let (ch0, ch1) = router.slot_channels();
            Topology::Dual {
                slot0: FramSlot::new(0, ch0, *config),
                slot1: FramSlot::new(1, ch1, *config),
            }
        }
        Err(e) => {
            log::info!(
                "No multiplexer at 0x{:02X} ({}): one cart slot on the bare bus",
                config.mux_address,
                e
            );
            Topology::Single {
                slot0: FramSlot::new(0, BusChannel::direct(shared), *config),
            }
        }
    }
}
