//! Transport layer for the RS485 link
//!
//! The engine is deaf to the underlying medium — UART, USB-serial
//! bridge or a test double — as long as this blocking byte-stream
//! contract holds. The protocol deadlines (5 ms per poll exchange)
//! are polling deadlines enforced by the caller through
//! `read_byte(timeout)`, not kernel socket timeouts, because "no more
//! replies" must be distinguished from "more data still arriving".

mod error;
pub mod mock;
pub mod serial;

pub use error::TransportError;
pub use mock::{MockTransport, SimulatedBoard};
pub use serial::SerialPortTransport;

use std::sync::Arc;
use std::time::Duration;

use crate::config::TransportConfig;

/// Blocking byte-stream contract the master engine drives.
pub trait BusTransport: Send + Sync {
    /// Open the link. The only operation whose failure can fail a
    /// connection attempt.
    fn open(&self) -> Result<(), TransportError>;

    /// Close the link. Safe to call from any thread; the master loop
    /// observes closure at its next iteration boundary.
    fn close(&self);

    fn is_open(&self) -> bool;

    /// Bytes currently readable without blocking.
    fn available(&self) -> usize;

    /// Read one byte, waiting up to `timeout`. `Ok(None)` means the
    /// deadline elapsed with nothing to read.
    fn read_byte(&self, timeout: Duration) -> Result<Option<u8>, TransportError>;

    /// Write a full frame. Returns the number of bytes written.
    fn write(&self, frame: &[u8]) -> Result<usize, TransportError>;
}

/// Create a transport from configuration.
pub fn create_transport(config: &TransportConfig) -> Arc<dyn BusTransport> {
    match config {
        TransportConfig::Serial(cfg) => Arc::new(SerialPortTransport::new(cfg.clone())),
        TransportConfig::Mock(cfg) => {
            let mock = MockTransport::new();
            for &address in &cfg.boards {
                mock.add_board(SimulatedBoard::new(address));
            }
            Arc::new(mock)
        }
    }
}
