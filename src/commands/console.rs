//! Terminal console for the interactive session

use framcart_core::bus::I2cBus;
use framcart_core::config::SessionConfig;
use framcart_core::session::{Console, Session};
use framcart_core::topology::Topology;
use std::io::{self, BufRead, Write};

/// `Console` over the process's stdin and stdout
pub struct StdConsole {
    stdin: io::StdinLock<'static>,
}

impl StdConsole {
    /// Lock stdin for the lifetime of the console
    pub fn new() -> Self {
        Self {
            stdin: io::stdin().lock(),
        }
    }
}

impl Default for StdConsole {
    fn default() -> Self {
        Self::new()
    }
}

impl Console for StdConsole {
    fn show(&mut self, line: &str) {
        println!("{}", line);
    }

    fn prompt(&mut self, text: &str) -> Option<String> {
        print!("{}", text);
        if let Err(e) = io::stdout().flush() {
            log::warn!("Failed to flush stdout: {}", e);
        }

        let mut line = String::new();
        match self.stdin.read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line),
            Err(e) => {
                log::error!("Failed to read input: {}", e);
                None
            }
        }
    }
}

/// Run the interactive loop until stdin is closed
pub fn run_session<B: I2cBus>(
    topology: Topology<B>,
    config: &SessionConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    println!(
        "{} cart slot(s), limit {} bytes. Ctrl-D to quit.",
        topology.slot_count(),
        config.limit
    );
    let mut session = Session::new(topology, StdConsole::new(), config);
    session.run();
    println!();
    Ok(())
}
