//! Bus registry and initialization
//!
//! This module opens I2C transports by name. The backend types stay hidden
//! behind `Box<dyn I2cBus>`.

use crate::error::{HostError, Result};
use framcart_core::bus::{BusInfo, I2cBus};
use framcart_core::config::SessionConfig;
use framcart_core::topology::{self, Topology};

/// Type-erased physical bus
pub type BoxedI2cBus = Box<dyn I2cBus>;

/// Parsed bus parameters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusParams {
    /// Bus backend name
    pub name: String,
    /// Key-value parameters, in the order given
    pub params: Vec<(String, String)>,
}

impl BusParams {
    /// Parameters as borrowed pairs, the form backend parsers take
    pub fn options(&self) -> Vec<(&str, &str)> {
        self.params
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }
}

/// Parse a bus string into name and parameters
///
/// Format: "name" or "name:key1=value1,key2=value2"
///
/// # Example
/// ```ignore
/// let params = parse_bus_params("linux_i2c:dev=/dev/i2c-1")?;
/// assert_eq!(params.name, "linux_i2c");
/// ```
pub fn parse_bus_params(s: &str) -> Result<BusParams> {
    let (name, opts_str) = s.split_once(':').unwrap_or((s, ""));
    if name.is_empty() {
        return Err(HostError::InvalidParams(format!(
            "missing bus name in '{}'",
            s
        )));
    }

    let mut params = Vec::new();
    if !opts_str.is_empty() {
        for opt in opts_str.split(',') {
            if let Some((key, value)) = opt.split_once('=') {
                params.push((key.trim().to_string(), value.trim().to_string()));
            } else {
                return Err(HostError::InvalidParams(format!(
                    "'{}' (expected key=value)",
                    opt
                )));
            }
        }
    }

    Ok(BusParams {
        name: name.to_string(),
        params,
    })
}

/// Open a physical bus from a bus string
///
/// # Arguments
/// * `bus` - Bus string (e.g., "dummy" or "linux_i2c:dev=/dev/i2c-1")
pub fn open_bus(bus: &str) -> Result<BoxedI2cBus> {
    let params = parse_bus_params(bus)?;
    log::debug!("Opening bus {} with {:?}", params.name, params.params);

    match params.name.as_str() {
        #[cfg(feature = "dummy")]
        "dummy" => open_dummy(&params),

        #[cfg(feature = "linux-i2c")]
        "linux_i2c" | "linux-i2c" | "i2cdev" => open_linux_i2c(&params),

        _ => Err(HostError::UnknownBus(params.name, bus_names_short())),
    }
}

/// Open a bus and select the session topology on it
///
/// The configuration is validated before the bus is touched.
pub fn open_topology(bus: &str, config: &SessionConfig) -> Result<Topology<BoxedI2cBus>> {
    config.validate()?;
    let bus = open_bus(bus)?;
    Ok(topology::select(bus, config))
}

#[cfg(feature = "dummy")]
fn open_dummy(params: &BusParams) -> Result<BoxedI2cBus> {
    let bus = framcart_dummy::parse_options(&params.options()).map_err(|e| {
        HostError::Backend {
            name: params.name.clone(),
            source: e.into(),
        }
    })?;
    log::info!("Using in-memory dummy bus");
    Ok(Box::new(bus))
}

#[cfg(feature = "linux-i2c")]
fn open_linux_i2c(params: &BusParams) -> Result<BoxedI2cBus> {
    framcart_linux_i2c::open_linux_i2c(&params.options()).map_err(|source| HostError::Backend {
        name: params.name.clone(),
        source,
    })
}

/// Get information about all available buses (enabled at compile time)
#[allow(unused_mut, clippy::vec_init_then_push)]
pub fn available_buses() -> Vec<BusInfo> {
    let mut buses = Vec::new();

    #[cfg(feature = "dummy")]
    buses.push(BusInfo {
        name: "dummy",
        aliases: &[],
        description: "In-memory bus with emulated mux and carts (mux=0|1, carts=N, size=N, id=0|1)",
    });

    #[cfg(feature = "linux-i2c")]
    buses.push(BusInfo {
        name: "linux_i2c",
        aliases: &["linux-i2c", "i2cdev"],
        description: "Linux i2c-dev adapter (dev=/dev/i2c-N or bus=N, maxlen=N)",
    });

    buses
}

/// Comma separated list of available bus names
pub fn bus_names_short() -> String {
    let buses = available_buses();
    if buses.is_empty() {
        return "none (recompile with features)".to_string();
    }
    let names: Vec<&str> = buses.iter().map(|b| b.name).collect();
    names.join(", ")
}
