//! pinbus-core - shared protocol types for the pinbus RS485 driver
//!
//! This crate holds everything both sides of the driver boundary agree
//! on: the event value types that travel through the queues, the
//! numeric namespace shared with the I/O board firmware, and the
//! sentinel-delimited frame codec.
//!
//! The wire protocol is deliberately minimal: two fixed-size frame
//! kinds, `0xFF` sentinels at both ends, big-endian multi-byte fields,
//! and no checksum. See [`codec`] for the framing rules and the
//! documented limitations.

pub mod codec;
pub mod event;
pub mod ids;

pub use codec::{
    decode_config_event, decode_event, encode_config_event, encode_event, FrameDecoder,
    CONFIG_FRAME_LEN, EVENT_FRAME_LEN, FRAME_SENTINEL,
};
pub use event::{ConfigEvent, Event, SwitchState};
pub use ids::MAX_BOARDS;
