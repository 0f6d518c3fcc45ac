//! YAML machine description model
//!
//! Field names follow the machine files deployed in the field
//! (camelCase), so existing descriptions load unchanged.

use std::path::Path;

use pinbus_core::ids::platform;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Top-level machine description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MachineConfig {
    #[serde(default)]
    pub debug: bool,
    /// ROM name of the emulated game
    #[serde(default)]
    pub rom: String,
    /// Serial device of the RS485 bridge
    pub serial_port: String,
    /// Pinball platform, e.g. "WPC", "DE", "SYS11"
    #[serde(default)]
    pub platform: String,
    pub boards: Vec<BoardConfig>,
    #[serde(default)]
    pub switches: Vec<SwitchConfig>,
    #[serde(default)]
    pub switch_matrix: Option<SwitchMatrixConfig>,
    #[serde(default)]
    pub pwm_output: Vec<PwmOutputConfig>,
    #[serde(default)]
    pub led_stripes: Vec<LedStripeConfig>,
}

impl MachineConfig {
    /// Numeric platform code for the wire. Unknown names fall back to
    /// WPC, the most common platform.
    pub fn platform_code(&self) -> u8 {
        match self.platform.as_str() {
            "DE" => platform::DATA_EAST,
            "SYS11" => platform::SYS11,
            "LIBPINMAME" => platform::LIBPINMAME,
            _ => platform::WPC,
        }
    }
}

/// One I/O board on the chain.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardConfig {
    pub number: u8,
    /// Whether the driver polls this board for switch events
    #[serde(default)]
    pub poll_events: bool,
}

/// A directly wired switch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchConfig {
    #[serde(default)]
    pub description: String,
    pub board: u8,
    pub port: u32,
    pub number: u32,
}

/// Switch matrix wiring.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SwitchMatrixConfig {
    pub board: u8,
    #[serde(default)]
    pub active_low: bool,
    pub pulse_time: u32,
    pub columns: Vec<MatrixLineConfig>,
    pub rows: Vec<MatrixLineConfig>,
}

/// One matrix column or row line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatrixLineConfig {
    pub number: u32,
    pub port: u32,
}

/// A PWM output driving a coil, flasher or lamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PwmOutputConfig {
    #[serde(default)]
    pub description: String,
    pub board: u8,
    pub port: u32,
    pub number: u32,
    pub power: u32,
    pub min_pulse_time: u32,
    pub max_pulse_time: u32,
    pub hold_power: u32,
    pub hold_power_activation_time: u32,
    #[serde(default)]
    pub fast_flip_switch: u32,
    /// "coil", "flasher" or "lamp"
    #[serde(rename = "type", default)]
    pub output_type: String,
}

/// An addressable LED string and its per-LED assignments.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedStripeConfig {
    pub board: u8,
    pub port: u32,
    /// Color order of the string, e.g. "GRB" or "RGBW"
    pub led_type: String,
    pub amount: u32,
    #[serde(default)]
    pub light_up: u32,
    #[serde(default)]
    pub after_glow: u32,
    #[serde(default)]
    pub lamps: Vec<LedAssignmentConfig>,
    #[serde(default)]
    pub flashers: Vec<LedAssignmentConfig>,
    #[serde(default)]
    pub gi: Vec<LedAssignmentConfig>,
}

/// One LED used as a lamp, flasher or GI segment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedAssignmentConfig {
    #[serde(default)]
    pub description: String,
    pub number: u32,
    pub led_number: u32,
    /// Hex RGB(W) color, e.g. "FFFF00"
    pub color: String,
}

/// Load a machine description from a YAML file.
pub fn load_machine(path: impl AsRef<Path>) -> Result<MachineConfig, ConfigError> {
    let raw = std::fs::read_to_string(&path)?;
    let machine: MachineConfig = serde_yaml::from_str(&raw)?;
    debug!(
        path = %path.as_ref().display(),
        rom = %machine.rom,
        boards = machine.boards.len(),
        "machine description loaded"
    );
    Ok(machine)
}
