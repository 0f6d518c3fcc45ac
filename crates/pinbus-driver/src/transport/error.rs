//! Transport layer errors

use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum TransportError {
    #[error("Failed to open {device}: {reason}")]
    OpenFailed { device: String, reason: String },

    #[error("Link closed")]
    Closed,

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),
}
