//! Interactive session loop
//!
//! Each iteration scans every slot, prints its status, shows the menu,
//! reads one command and runs it to completion before the next prompt.
//! Slot-level failures become status lines; the loop only stops when the
//! console runs out of input.

use alloc::string::String;
use maybe_async::maybe_async;

use crate::bus::I2cBus;
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::fram::{ByteRange, Presence};
use crate::report;
use crate::topology::Topology;

/// Upper bound on slots in any topology
pub const MAX_SLOTS: usize = 2;

/// Upper bound on menu entries: rescan plus write/erase per slot
pub const MAX_COMMANDS: usize = 1 + 2 * MAX_SLOTS;

/// Line-oriented operator interface
pub trait Console {
    /// Display one line (or a pre-formatted block)
    fn show(&mut self, line: &str);

    /// Show `text` and read one line of input; `None` when input is closed
    fn prompt(&mut self, text: &str) -> Option<String>;
}

/// One menu selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Scan the slots again
    Rescan,
    /// Prompt for a string and write it at offset 0
    Write {
        /// Target slot
        slot: usize,
    },
    /// Zero the first LIMIT bytes
    Erase {
        /// Target slot
        slot: usize,
    },
}

impl Command {
    /// Menu key for this command
    pub fn key(&self) -> usize {
        match self {
            Self::Rescan => 1,
            Self::Write { slot } => 2 + 2 * slot,
            Self::Erase { slot } => 3 + 2 * slot,
        }
    }

    /// Parse one input line against a topology with `slot_count` slots
    ///
    /// Empty input selects the default (rescan). Anything that is not a
    /// key of the active menu yields `None`.
    pub fn parse(input: &str, slot_count: usize) -> Option<Self> {
        let input = input.trim();
        if input.is_empty() {
            return Some(Self::Rescan);
        }
        let key: usize = input.parse().ok()?;
        menu_commands(slot_count)
            .into_iter()
            .find(|command| command.key() == key)
    }
}

/// Commands offered for a topology with `slot_count` slots, in menu order
pub fn menu_commands(slot_count: usize) -> heapless::Vec<Command, MAX_COMMANDS> {
    // At most 1 + 2 * MAX_SLOTS entries, so the collect never overflows
    core::iter::once(Command::Rescan)
        .chain(
            (0..slot_count.min(MAX_SLOTS))
                .flat_map(|slot| [Command::Write { slot }, Command::Erase { slot }]),
        )
        .collect()
}

/// The interactive loop over a fixed topology
pub struct Session<B: I2cBus, C: Console> {
    topology: Topology<B>,
    console: C,
    limit: usize,
}

impl<B: I2cBus, C: Console> Session<B, C> {
    /// Create a session over an already selected topology
    pub fn new(topology: Topology<B>, console: C, config: &SessionConfig) -> Self {
        Self {
            topology,
            console,
            limit: config.limit,
        }
    }

    /// The session's topology
    pub fn topology(&self) -> &Topology<B> {
        &self.topology
    }

    /// The console
    pub fn console(&self) -> &C {
        &self.console
    }

    /// Mutable access to the console
    pub fn console_mut(&mut self) -> &mut C {
        &mut self.console
    }

    /// Consume the session, returning the console
    pub fn into_console(self) -> C {
        self.console
    }

    /// Run until the console reports end of input
    #[maybe_async]
    pub async fn run(&mut self) {
        log::info!(
            "Session started ({} topology, {} slot(s), limit {} bytes)",
            self.topology.name(),
            self.topology.slot_count(),
            self.limit
        );
        while self.step().await {}
        log::info!("Input closed, session ends");
    }

    /// One iteration: report, prompt, execute
    ///
    /// Returns `false` once the console has no more input.
    #[maybe_async]
    pub async fn step(&mut self) -> bool {
        self.report_slots().await;

        let menu = report::menu(self.topology.slot_count(), self.limit);
        let Some(line) = self.console.prompt(&menu) else {
            return false;
        };

        match Command::parse(&line, self.topology.slot_count()) {
            Some(command) => self.execute(command).await,
            None => log::debug!("ignoring unrecognized input {:?}", line.trim()),
        }
        true
    }

    /// Scan every slot and show its status, capacity and first LIMIT bytes
    ///
    /// The dump is clamped to carts smaller than LIMIT and the header names
    /// the range actually shown.
    #[maybe_async]
    pub async fn report_slots(&mut self) {
        for slot in self.topology.slots() {
            match slot.scan().await {
                Presence::Empty => self.console.show(&report::empty_slot(slot.index())),
                Presence::Occupied(capacity) => {
                    log::debug!("slot {}: cart present, {} bytes", slot.index(), capacity);
                    let bytes = match ByteRange::with_len(0, self.limit) {
                        Ok(range) => {
                            let range = range.clamp_to(capacity);
                            slot.read_range(range).await.map(|bytes| (range, bytes))
                        }
                        Err(e) => Err(e),
                    };
                    match bytes {
                        Ok((range, bytes)) => {
                            let header = report::slot_header(slot.index(), range.end() as usize);
                            self.console.show(&header);
                            self.console.show(&report::capacity_line(capacity));
                            for row in report::hexdump(&bytes) {
                                self.console.show(&row);
                            }
                        }
                        Err(e) => self.console.show(&report::error_line(&e)),
                    }
                }
            }
        }
    }

    /// Run one command and show its outcome
    #[maybe_async]
    pub async fn execute(&mut self, command: Command) {
        let outcome = match command {
            Command::Rescan => return,
            Command::Write { slot } => {
                let Some(text) = self.console.prompt(&report::write_prompt(self.limit)) else {
                    return;
                };
                let text = text.trim_end_matches(['\r', '\n']);
                self.console.show("Writing...");
                match self.topology.slot(slot) {
                    Some(slot) => slot.write_range(0, text.as_bytes()).await.map(|_| ()),
                    None => Err(Error::InvalidChannel),
                }
            }
            Command::Erase { slot } => {
                self.console.show("Erasing...");
                match (self.topology.slot(slot), ByteRange::with_len(0, self.limit)) {
                    (Some(slot), Ok(range)) => match slot.scan().await {
                        // Carts smaller than LIMIT are erased in full
                        Presence::Occupied(capacity) => {
                            slot.erase_range(range.clamp_to(capacity)).await
                        }
                        Presence::Empty => Err(Error::DeviceAbsent),
                    },
                    (None, _) => Err(Error::InvalidChannel),
                    (_, Err(e)) => Err(e),
                }
            }
        };
        self.show_outcome(outcome);
    }

    fn show_outcome(&mut self, outcome: Result<()>) {
        match outcome {
            Ok(()) => self.console.show(report::OK),
            Err(e) => {
                log::debug!("operation failed: {}", e);
                self.console.show(&report::error_line(&e));
            }
        }
    }
}
