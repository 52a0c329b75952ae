//! Error types for the interrupt classifier workspace
//!
//! Classification itself never fails. These errors only surface from the
//! surrounding layers: processor chains and serialization.

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type
#[derive(Error, Debug)]
pub enum Error {
    // Pipeline errors
    #[error("Pipeline error: {0}")]
    Pipeline(String),

    #[error("Channel closed")]
    ChannelClosed,

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
