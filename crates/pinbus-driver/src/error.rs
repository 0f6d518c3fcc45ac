//! Driver boundary errors

use thiserror::Error;

use crate::transport::TransportError;

/// Errors surfaced at the [`crate::BusDriver`] boundary.
///
/// Note what is *not* here: malformed receive bytes (silently
/// resynchronized), registry overflow (silent no-op) and failed
/// command transmits (logged, command lost) never reach the caller.
#[derive(Debug, Error)]
pub enum DriverError {
    /// Transport failure, in practice only while opening the port
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// Connect called while a link is already up
    #[error("Already connected")]
    AlreadyConnected,

    /// Operation requires an open link
    #[error("Not connected")]
    NotConnected,

    /// Configuration dispatch attempted while the master loop runs
    #[error("Configuration phase is over: the master loop is running")]
    ConfigPhaseOver,

    /// Background worker could not be spawned
    #[error("Failed to spawn master loop thread: {0}")]
    Spawn(String),
}
