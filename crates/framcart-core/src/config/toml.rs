//! TOML session configuration files
//!
//! ```toml
//! [session]
//! limit = 64
//! fram_address = 0x50
//! mux_address = "0x70"
//! default_capacity = "32 KiB"
//! write_chunk = 16
//! ```
//!
//! Every key is optional; missing keys keep their defaults.

use std::fs;
use std::path::Path;
use std::string::{String, ToString};

use super::{parse_number, SessionConfig};

/// Errors from loading a configuration file
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("failed to read {path}: {source}")]
    Io {
        /// Path that failed
        path: String,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML or has unexpected keys
    #[error("failed to parse config: {0}")]
    Parse(#[from] ::toml::de::Error),

    /// The values parsed but are inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(#[from] crate::error::Error),
}

/// TOML config file structure
#[derive(Debug, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlConfigFile {
    session: Option<TomlSession>,
}

/// `[session]` table
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct TomlSession {
    limit: Option<usize>,
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    fram_address: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_opt_address")]
    mux_address: Option<u8>,
    #[serde(default, deserialize_with = "deserialize_opt_size")]
    default_capacity: Option<u32>,
    write_chunk: Option<usize>,
}

#[derive(serde::Deserialize)]
#[serde(untagged)]
enum HexOrInt {
    Int(u32),
    Str(String),
}

/// Deserialize an I2C address that can be hex (0x...) or decimal
fn deserialize_opt_address<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    let value = match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => n,
        HexOrInt::Str(s) => parse_number(&s).map_err(serde::de::Error::custom)?,
    };
    u8::try_from(value)
        .map(Some)
        .map_err(|_| serde::de::Error::custom(std::format!("address {} out of range", value)))
}

/// Deserialize a size that can be a number or a string like "32 KiB"
fn deserialize_opt_size<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::Deserialize;

    match HexOrInt::deserialize(deserializer)? {
        HexOrInt::Int(n) => Ok(Some(n)),
        HexOrInt::Str(s) => parse_size(&s).map(Some).map_err(serde::de::Error::custom),
    }
}

/// Parse a size string like "32 KiB", "0x8000" or "32768"
fn parse_size(s: &str) -> Result<u32, String> {
    let s = s.trim();

    if let Ok(n) = parse_number(s) {
        return Ok(n);
    }

    let lower = s.to_lowercase();
    let (num_str, multiplier) = if let Some(n) = lower.strip_suffix("kib") {
        (n.trim(), 1024)
    } else if let Some(n) = lower.strip_suffix("kb") {
        (n.trim(), 1024)
    } else if let Some(n) = lower.strip_suffix("b") {
        (n.trim(), 1)
    } else {
        return Err(std::format!("invalid size: {}", s));
    };

    let n: u32 = num_str
        .parse()
        .map_err(|e| std::format!("invalid size '{}': {}", s, e))?;
    n.checked_mul(multiplier)
        .ok_or_else(|| "size overflow".to_string())
}

impl SessionConfig {
    /// Parse a TOML document on top of the defaults and validate the result
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let file: TomlConfigFile = ::toml::from_str(content)?;
        let session = file.session.unwrap_or_default();

        let defaults = SessionConfig::default();
        let config = SessionConfig {
            limit: session.limit.unwrap_or(defaults.limit),
            fram_address: session.fram_address.unwrap_or(defaults.fram_address),
            mux_address: session.mux_address.unwrap_or(defaults.mux_address),
            default_capacity: session.default_capacity.unwrap_or(defaults.default_capacity),
            write_chunk: session.write_chunk.unwrap_or(defaults.write_chunk),
        };
        config.validate()?;
        Ok(config)
    }

    /// Load a TOML configuration file
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        log::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }
}
