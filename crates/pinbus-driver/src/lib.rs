//! pinbus-driver - RS485 master engine for pinball I/O boards
//!
//! The host is the single bus master on a half-duplex RS485 chain of
//! up to 16 addressable I/O boards that actuate solenoids, lamps and
//! LED strings and report switch state. This crate implements the
//! master side: framing, board discovery, a round-robin polling
//! scheduler interleaved with outbound command delivery, and the
//! queues bridging caller threads and the background worker.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                       BusDriver                          │
//! │  connect / configure / start / disconnect                │
//! │  set_solenoid_state, set_lamp_state, next_switch_state   │
//! │                                                          │
//! │   caller threads          master loop thread             │
//! │   ┌────────────┐  push   ┌──────────────────────┐        │
//! │   │ EventQueue ├────────►│ MasterLoop           │        │
//! │   └────────────┘         │  1. send one command │        │
//! │   ┌─────────────┐  pop   │  2. poll next board  │        │
//! │   │ SwitchQueue │◄───────┤  3. sleep 1 ms       │        │
//! │   └─────────────┘        └──────────┬───────────┘        │
//! │                                     │                    │
//! │                           ┌─────────┴──────────┐         │
//! │                           │ BusTransport       │         │
//! │                           │ (serialport / mock)│         │
//! │                           └────────────────────┘         │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! Concurrency discipline: both queues use short-lived locks around
//! the enqueue/dequeue critical section only; the active-board flags
//! are written exclusively from the discovery/master-loop context (the
//! registry value is moved into the worker thread), and everything
//! else sees only read snapshots.

pub mod config;
pub mod discovery;
pub mod driver;
pub mod error;
pub mod io;
pub mod queue;
pub mod registry;
pub mod scheduler;
pub mod transport;

pub use config::{DriverConfig, MockConfig, SerialConfig, Timings, TransportConfig};
pub use driver::BusDriver;
pub use error::DriverError;
pub use queue::{EventQueue, FifoQueue, SwitchQueue};
pub use registry::BoardRegistry;
pub use transport::{create_transport, BusTransport, MockTransport, TransportError};

// Re-export for convenience
pub use pinbus_core::{ConfigEvent, Event, SwitchState};
