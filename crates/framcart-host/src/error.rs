//! Errors from opening a bus

use thiserror::Error;

/// Failures while turning a bus string into an open transport
#[derive(Debug, Error)]
pub enum HostError {
    /// The bus string is malformed
    #[error("Invalid bus parameter: {0}")]
    InvalidParams(String),

    /// No backend with this name was compiled in
    #[error("Unknown bus: {0} (available: {1})")]
    UnknownBus(String, String),

    /// The backend rejected its options or failed to open
    #[error("Failed to open {name} bus: {source}")]
    Backend {
        name: String,
        #[source]
        source: Box<dyn std::error::Error>,
    },

    /// Session configuration rejected before touching the bus
    #[error("Invalid session configuration: {0}")]
    Config(#[from] framcart_core::Error),
}

/// Result type for bus registry operations
pub type Result<T> = std::result::Result<T, HostError>;
