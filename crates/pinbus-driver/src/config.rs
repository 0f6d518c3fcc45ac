//! Driver configuration
//!
//! Construction-time settings for the bus master: which transport to
//! drive, which board addresses to register for polling, and the
//! protocol timings (overridable mainly so tests do not have to sit
//! through the boot-settle waits).

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for a [`crate::BusDriver`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriverConfig {
    /// Transport configuration
    pub transport: TransportConfig,
    /// Board addresses to register for switch polling
    #[serde(default)]
    pub boards: Vec<u8>,
    /// Protocol timings
    #[serde(default)]
    pub timings: Timings,
}

impl DriverConfig {
    /// Shorthand for a driver on a serial device with default settings.
    pub fn serial(device: impl Into<String>) -> Self {
        Self {
            transport: TransportConfig::Serial(SerialConfig {
                device: device.into(),
                baud_rate: default_baud_rate(),
            }),
            boards: Vec::new(),
            timings: Timings::default(),
        }
    }

    /// Shorthand for a driver on the in-memory mock bus.
    pub fn mock() -> Self {
        Self {
            transport: TransportConfig::Mock(MockConfig::default()),
            boards: Vec::new(),
            timings: Timings::default(),
        }
    }
}

/// Transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TransportConfig {
    /// Physical RS485 link through a UART / USB-serial bridge
    Serial(SerialConfig),
    /// In-memory mock bus for testing
    Mock(MockConfig),
}

/// Serial line configuration. The bus always runs 8 data bits, one
/// stop bit, no parity; only the device path and baud rate vary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SerialConfig {
    /// Device path, e.g. "/dev/ttyUSB0"
    pub device: String,
    /// Baud rate
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_baud_rate() -> u32 {
    115_200
}

/// Mock bus configuration: addresses of simulated boards that answer
/// the discovery ping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default)]
    pub boards: Vec<u8>,
}

/// Protocol timings, in milliseconds on the wire format side.
///
/// The defaults are the values the deployed firmware expects; changing
/// them outside of tests risks missing board boot windows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Timings {
    /// Wait after opening the port before any traffic (board boot settle)
    #[serde(default = "default_boot_settle_ms")]
    pub boot_settle_ms: u64,
    /// Wait after the broadcast RESET
    #[serde(default = "default_reset_settle_ms")]
    pub reset_settle_ms: u64,
    /// Wait after the broadcast PING
    #[serde(default = "default_ping_settle_ms")]
    pub ping_settle_ms: u64,
    /// Receive deadline per poll exchange, discovery and runtime alike
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,
    /// Sleep at the end of each scheduler tick
    #[serde(default = "default_tick_sleep_ms")]
    pub tick_sleep_ms: u64,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            boot_settle_ms: default_boot_settle_ms(),
            reset_settle_ms: default_reset_settle_ms(),
            ping_settle_ms: default_ping_settle_ms(),
            poll_timeout_ms: default_poll_timeout_ms(),
            tick_sleep_ms: default_tick_sleep_ms(),
        }
    }
}

impl Timings {
    /// Near-zero timings for tests against the mock bus.
    pub fn fast() -> Self {
        Self {
            boot_settle_ms: 0,
            reset_settle_ms: 0,
            ping_settle_ms: 0,
            poll_timeout_ms: 1,
            tick_sleep_ms: 0,
        }
    }

    pub fn boot_settle(&self) -> Duration {
        Duration::from_millis(self.boot_settle_ms)
    }

    pub fn reset_settle(&self) -> Duration {
        Duration::from_millis(self.reset_settle_ms)
    }

    pub fn ping_settle(&self) -> Duration {
        Duration::from_millis(self.ping_settle_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn tick_sleep(&self) -> Duration {
        Duration::from_millis(self.tick_sleep_ms)
    }
}

fn default_boot_settle_ms() -> u64 {
    200
}

fn default_reset_settle_ms() -> u64 {
    1000
}

fn default_ping_settle_ms() -> u64 {
    200
}

fn default_poll_timeout_ms() -> u64 {
    5
}

fn default_tick_sleep_ms() -> u64 {
    1
}
