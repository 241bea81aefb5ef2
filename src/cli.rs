//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a string as a hex or decimal u32
fn parse_hex_u32(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid hex value: {}", e))
    } else {
        s.parse::<u32>().map_err(|e| format!("Invalid number: {}", e))
    }
}

/// Parse a 7-bit I2C address given in hex or decimal
fn parse_address(s: &str) -> Result<u8, String> {
    let value = parse_hex_u32(s)?;
    u8::try_from(value)
        .ok()
        .filter(|a| *a <= 0x7F)
        .ok_or_else(|| format!("Address 0x{:X} is not a 7-bit I2C address", value))
}

/// Generate dynamic help text for the bus argument
fn bus_help() -> String {
    format!(
        "Bus to use, as name[:key=value,...] [available: {}]",
        framcart_host::bus_names_short()
    )
}

#[derive(Parser)]
#[command(name = "framcart")]
#[command(author, version, about = "Hot-swappable I2C FRAM cart tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Session configuration file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub session: SessionArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Overrides for the session configuration, applied on top of --config
#[derive(clap::Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Maximum write payload and dump length in bytes
    #[arg(long, global = true)]
    pub limit: Option<usize>,

    /// FRAM address on every channel (hex or decimal)
    #[arg(long, value_parser = parse_address, global = true)]
    pub fram_addr: Option<u8>,

    /// Multiplexer address (hex or decimal)
    #[arg(long, value_parser = parse_address, global = true)]
    pub mux_addr: Option<u8>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Interactive session: scan, show, write and erase carts from a menu
    Session {
        /// Bus to use
        #[arg(short, long, help = bus_help())]
        bus: String,
    },

    /// Report which slots hold a cart
    Scan {
        /// Bus to use
        #[arg(short, long, help = bus_help())]
        bus: String,
    },

    /// Read cart contents
    Read {
        /// Bus to use
        #[arg(short, long, help = bus_help())]
        bus: String,

        /// Slot to read from
        #[arg(short, long, default_value_t = 0)]
        slot: usize,

        /// Start address (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Number of bytes (hex or decimal, defaults to the limit)
        #[arg(long, value_parser = parse_hex_u32, conflicts_with = "all")]
        length: Option<u32>,

        /// Read the whole cart
        #[arg(long)]
        all: bool,

        /// Write the bytes to this file instead of dumping them
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a string or file contents to a cart (truncated to the limit)
    Write {
        /// Bus to use
        #[arg(short, long, help = bus_help())]
        bus: String,

        /// Slot to write to
        #[arg(short, long, default_value_t = 0)]
        slot: usize,

        /// Start address (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        offset: u32,

        /// String to write
        #[arg(short, long, conflicts_with = "input", required_unless_present = "input")]
        data: Option<String>,

        /// File whose contents to write
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Zero a range of a cart
    Erase {
        /// Bus to use
        #[arg(short, long, help = bus_help())]
        bus: String,

        /// Slot to erase
        #[arg(short, long, default_value_t = 0)]
        slot: usize,

        /// Start address (hex or decimal)
        #[arg(long, value_parser = parse_hex_u32, default_value = "0")]
        start: u32,

        /// Number of bytes (hex or decimal, defaults to the limit)
        #[arg(long, value_parser = parse_hex_u32, conflicts_with = "all")]
        length: Option<u32>,

        /// Erase the whole cart
        #[arg(long)]
        all: bool,
    },

    /// List available buses
    ListBuses,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_address() {
        assert_eq!(parse_address("0x50"), Ok(0x50));
        assert_eq!(parse_address("112"), Ok(0x70));
        assert!(parse_address("0x80").is_err());
        assert!(parse_address("300").is_err());
    }

    #[test]
    fn test_write_needs_payload() {
        assert!(Cli::try_parse_from(["framcart", "write", "-b", "dummy"]).is_err());
        assert!(Cli::try_parse_from(["framcart", "write", "-b", "dummy", "-d", "hi"]).is_ok());
    }

    #[test]
    fn test_global_overrides() {
        let cli = Cli::try_parse_from([
            "framcart", "scan", "-b", "dummy", "--limit", "32", "--mux-addr", "0x71",
        ])
        .unwrap();
        assert_eq!(cli.session.limit, Some(32));
        assert_eq!(cli.session.mux_addr, Some(0x71));
        assert_eq!(cli.session.fram_addr, None);
    }
}
