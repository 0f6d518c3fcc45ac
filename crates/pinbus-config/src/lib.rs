//! pinbus-config - machine description loading
//!
//! Translates a YAML machine description (boards, switches, switch
//! matrix, PWM outputs, LED strings) into the ordered configuration
//! bursts the driver transmits during its configuration phase, plus
//! the list of board addresses to register for switch polling.
//!
//! The field semantics of each record are opaque to the driver core;
//! this crate is the producer that owns them.

mod error;
pub mod led;
pub mod machine;
pub mod records;

pub use error::ConfigError;
pub use machine::{load_machine, MachineConfig};
pub use records::{config_bursts, poll_boards};
