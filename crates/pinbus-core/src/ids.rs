//! Numeric namespace shared between the host and the I/O board firmware
//!
//! These values are part of the wire protocol and must match the
//! firmware bit for bit. Most are printable ASCII so frames stay
//! legible in a logic analyzer.

/// Highest addressable board count on one bus. Addresses are 0..=15.
pub const MAX_BOARDS: usize = 16;

/// Event source ids (first payload byte of an event frame)
pub mod event_source {
    /// Wildcard source, "*"
    pub const ANY: u8 = 42;
    /// Debug traffic, "B"
    pub const DEBUG: u8 = 66;
    /// Configuration frame marker, "C"
    pub const CONFIGURATION: u8 = 67;
    /// DMD frame traffic, "D"
    pub const DMD: u8 = 68;
    /// Generic cross-system event, "E"
    pub const EVENT: u8 = 69;
    /// Event emitted by a running light effect, "F"
    pub const EFFECT: u8 = 70;
    /// General illumination, "G"
    pub const GI: u8 = 71;
    /// Lamp commands, mainly playfield inserts, "L"
    pub const LIGHT: u8 = 76;
    /// Poll terminator, "N"
    pub const NULL: u8 = 78;
    /// Sound commands, "O"
    pub const SOUND: u8 = 79;
    /// Poll request, "P"
    pub const POLL_EVENTS: u8 = 80;
    /// Read current state of all switches, "R"
    pub const READ_SWITCHES: u8 = 82;
    /// Solenoid commands, includes flashers, "S"
    pub const SOLENOID: u8 = 83;
    /// Switch state report, "W"
    pub const SWITCH: u8 = 87;
    /// Discovery ping, "X"
    pub const PING: u8 = 88;
    /// Discovery ping reply, "Y"
    pub const PONG: u8 = 89;
    /// Bus reset, "Z"
    pub const RESET: u8 = 90;
}

/// Configuration record topics (second payload byte of a config frame)
pub mod config_topic {
    pub const PLATFORM: u8 = 102;
    pub const LED_STRING: u8 = 103;
    pub const LAMPS: u8 = 108;
    pub const MECHS: u8 = 109;
    pub const PWM: u8 = 112;
    pub const SWITCHES: u8 = 115;
    pub const SWITCH_MATRIX: u8 = 120;
}

/// Configuration record keys (sub-field ids within a topic)
pub mod config_key {
    pub const HOLD_POWER_ACTIVATION_TIME: u8 = 65;
    pub const BRIGHTNESS: u8 = 66;
    pub const COLOR: u8 = 67;
    pub const FAST_SWITCH: u8 = 70;
    pub const AFTER_GLOW: u8 = 71;
    pub const HOLD_POWER: u8 = 72;
    pub const LED_NUMBER: u8 = 76;
    pub const MAX_PULSE_TIME: u8 = 77;
    pub const NUMBER: u8 = 78;
    pub const AMOUNT_LEDS: u8 = 79;
    pub const PORT: u8 = 80;
    pub const MIN_PULSE_TIME: u8 = 84;
    pub const LIGHT_UP: u8 = 85;
    pub const ACTIVE_LOW: u8 = 86;
    pub const POWER: u8 = 87;
    pub const TYPE: u8 = 89;
    pub const NULL: u8 = 99;
}

/// PWM output types
pub mod pwm_type {
    pub const SOLENOID: u8 = 1;
    pub const FLASHER: u8 = 2;
    pub const LAMP: u8 = 3;
}

/// Roles of individual LEDs within a string
pub mod led_type {
    pub const GI: u8 = 1;
    pub const FLASHER: u8 = 2;
    pub const LAMP: u8 = 3;
}

/// Switch matrix line types
pub mod matrix_type {
    pub const COLUMN: u8 = 1;
    pub const ROW: u8 = 2;
}

/// Pinball platform codes
pub mod platform {
    pub const WPC: u8 = 1;
    pub const DATA_EAST: u8 = 2;
    pub const SYS11: u8 = 3;
    pub const LIBPINMAME: u8 = 100;
}
