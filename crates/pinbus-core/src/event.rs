//! Event value types moved through the driver's queues
//!
//! All three types are plain `Copy` values. They are created by a
//! producer, moved through a queue, consumed exactly once and
//! discarded — ownership of a frame is never shared.

use crate::ids::event_source;

/// One event frame payload.
///
/// The meaning of `event_id` depends on `source_id`: for solenoid and
/// lamp commands it is the device number, for control events (poll,
/// ping, reset, read-switches) it is a fixed command code, and for
/// poll requests `value` carries the target board address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Event {
    pub source_id: u8,
    pub event_id: u16,
    pub value: u8,
}

impl Event {
    pub fn new(source_id: u8, event_id: u16, value: u8) -> Self {
        Self {
            source_id,
            event_id,
            value,
        }
    }

    /// A control event with the default command code and payload.
    pub fn control(source_id: u8) -> Self {
        Self::new(source_id, 1, 1)
    }

    /// Poll request addressed to one board.
    pub fn poll_request(board: u8) -> Self {
        Self::new(event_source::POLL_EVENTS, 1, board)
    }

    /// Broadcast bus reset.
    pub fn reset() -> Self {
        Self::control(event_source::RESET)
    }

    /// Broadcast discovery ping.
    pub fn ping() -> Self {
        Self::control(event_source::PING)
    }

    /// Ask all boards to report their current switch states.
    pub fn read_switches() -> Self {
        Self::control(event_source::READ_SWITCHES)
    }

    /// Solenoid state command. Any non-zero state means "on".
    pub fn solenoid(number: u16, on: bool) -> Self {
        Self::new(event_source::SOLENOID, number, u8::from(on))
    }

    /// Lamp state command.
    pub fn lamp(number: u16, on: bool) -> Self {
        Self::new(event_source::LIGHT, number, u8::from(on))
    }
}

/// One configuration frame payload.
///
/// The wire `sourceId` of a config frame is always
/// [`event_source::CONFIGURATION`] and is supplied by the codec.
/// `key` and `value` semantics are opaque to the driver; the receiving
/// board interprets them per `topic`, reassembling multi-frame records
/// by `index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfigEvent {
    pub board_id: u8,
    pub topic: u8,
    pub index: u8,
    pub key: u8,
    pub value: u32,
}

impl ConfigEvent {
    pub fn new(board_id: u8, topic: u8, index: u8, key: u8, value: u32) -> Self {
        Self {
            board_id,
            topic,
            index,
            key,
            value,
        }
    }
}

/// A decoded switch transition, ready for client consumption.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SwitchState {
    pub number: u16,
    /// 0 = open, 1 = closed.
    pub state: u8,
}

impl SwitchState {
    pub fn new(number: u16, state: u8) -> Self {
        Self { number, state }
    }
}
