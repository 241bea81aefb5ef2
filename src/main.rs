//! framcart - Hot-swappable I2C FRAM cart tool
//!
//! Drives one or two FRAM carts on an I2C bus, optionally behind a channel
//! multiplexer. Carts may be plugged and pulled at any time; every operation
//! re-checks presence before touching the cart.
//!
//! The `session` command runs the interactive scan/menu loop. The other
//! commands do one operation and exit, which is handy in scripts.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands, SessionArgs};
use framcart_core::config::SessionConfig;
use std::path::Path;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let config = load_config(cli.config.as_deref(), &cli.session)?;
    log::debug!("Session config: {:?}", config);

    let result = match cli.command {
        Commands::Session { bus } => {
            let topology = framcart_host::open_topology(&bus, &config)?;
            commands::run_session(topology, &config)
        }
        Commands::Scan { bus } => {
            let topology = framcart_host::open_topology(&bus, &config)?;
            commands::run_scan(&topology)
        }
        Commands::Read {
            bus,
            slot,
            start,
            length,
            all,
            output,
        } => {
            let topology = framcart_host::open_topology(&bus, &config)?;
            let slot = commands::slot(&topology, slot)?;
            if all {
                commands::run_read_all(slot, output.as_deref())
            } else {
                let length = length.map_or(config.limit, |l| l as usize);
                commands::run_read(slot, start, length, output.as_deref())
            }
        }
        Commands::Write {
            bus,
            slot,
            offset,
            data,
            input,
        } => {
            let payload = match (data, input) {
                (Some(data), _) => data.into_bytes(),
                (None, Some(path)) => std::fs::read(&path)
                    .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?,
                (None, None) => return Err("Nothing to write: use --data or --input".into()),
            };
            let topology = framcart_host::open_topology(&bus, &config)?;
            let slot = commands::slot(&topology, slot)?;
            commands::run_write(slot, offset, &payload)
        }
        Commands::Erase {
            bus,
            slot,
            start,
            length,
            all,
        } => {
            let topology = framcart_host::open_topology(&bus, &config)?;
            let slot = commands::slot(&topology, slot)?;
            if all {
                commands::run_erase_all(slot)
            } else {
                let length = length.map_or(config.limit, |l| l as usize);
                commands::run_erase(slot, start, length)
            }
        }
        Commands::ListBuses => {
            commands::list_buses();
            Ok(())
        }
    };

    result
}

/// Defaults, then the config file, then command line overrides
fn load_config(
    path: Option<&Path>,
    args: &SessionArgs,
) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => SessionConfig::from_toml_file(path)?,
        None => SessionConfig::default(),
    };

    if let Some(limit) = args.limit {
        config.limit = limit;
    }
    if let Some(address) = args.fram_addr {
        config.fram_address = address;
    }
    if let Some(address) = args.mux_addr {
        config.mux_address = address;
    }

    config
        .validate()
        .map_err(|e| format!("Invalid session configuration: {}", e))?;
    Ok(config)
}
