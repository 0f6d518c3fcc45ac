//! Sentinel-delimited frame codec
//!
//! Two frame kinds exist on the bus:
//!
//! ```text
//! Event  (6 bytes): FF │ source │ idHi idLo │ value │ FF
//! Config (11 bytes): FF │ 'C' │ board topic index key │ v3 v2 v1 v0 │ FF
//! ```
//!
//! All multi-byte fields are big-endian. There is no checksum: a
//! corrupted payload that happens to preserve both sentinel positions
//! is indistinguishable from a valid frame. This is a known limitation
//! of the deployed firmware protocol and is kept for bit-for-bit wire
//! compatibility.
//!
//! The bus can lose or corrupt bytes, especially around RS485
//! transceiver direction switches, so [`FrameDecoder`] never assumes a
//! fixed frame boundary: on any window that fails validation it drops
//! exactly one byte and rescans.

use bytes::{Buf, BytesMut};

use crate::event::{ConfigEvent, Event};
use crate::ids::event_source;

/// Frame delimiter at both ends of every frame.
pub const FRAME_SENTINEL: u8 = 0xFF;
/// Size of an event frame on the wire.
pub const EVENT_FRAME_LEN: usize = 6;
/// Size of a configuration frame on the wire.
pub const CONFIG_FRAME_LEN: usize = 11;

/// Encode an event into its 6-byte wire frame.
pub fn encode_event(event: &Event) -> [u8; EVENT_FRAME_LEN] {
    [
        FRAME_SENTINEL,
        event.source_id,
        (event.event_id >> 8) as u8,
        (event.event_id & 0xff) as u8,
        event.value,
        FRAME_SENTINEL,
    ]
}

/// Encode a configuration event into its 11-byte wire frame.
pub fn encode_config_event(event: &ConfigEvent) -> [u8; CONFIG_FRAME_LEN] {
    [
        FRAME_SENTINEL,
        event_source::CONFIGURATION,
        event.board_id,
        event.topic,
        event.index,
        event.key,
        (event.value >> 24) as u8,
        (event.value >> 16) as u8,
        (event.value >> 8) as u8,
        event.value as u8,
        FRAME_SENTINEL,
    ]
}

/// Decode an exact event frame. Checks the sentinel positions only;
/// the stream-level noise heuristics live in [`FrameDecoder`].
pub fn decode_event(frame: &[u8; EVENT_FRAME_LEN]) -> Option<Event> {
    if frame[0] != FRAME_SENTINEL || frame[5] != FRAME_SENTINEL {
        return None;
    }
    Some(Event::new(
        frame[1],
        u16::from(frame[2]) << 8 | u16::from(frame[3]),
        frame[4],
    ))
}

/// Decode an exact configuration frame.
pub fn decode_config_event(frame: &[u8; CONFIG_FRAME_LEN]) -> Option<ConfigEvent> {
    if frame[0] != FRAME_SENTINEL
        || frame[1] != event_source::CONFIGURATION
        || frame[10] != FRAME_SENTINEL
    {
        return None;
    }
    Some(ConfigEvent::new(
        frame[2],
        frame[3],
        frame[4],
        frame[5],
        u32::from(frame[6]) << 24
            | u32::from(frame[7]) << 16
            | u32::from(frame[8]) << 8
            | u32::from(frame[9]),
    ))
}

/// Incremental decoder for the receive side of the bus.
///
/// Bytes are fed in as they arrive; [`FrameDecoder::next_event`]
/// yields each event whose 6-byte window passes validation:
/// sentinels at both ends, non-zero source id and non-zero event id.
/// Anything else is treated as noise and resynchronized one byte at
/// a time.
#[derive(Debug, Default)]
pub struct FrameDecoder {
    buf: BytesMut,
}

impl FrameDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append received bytes to the scan buffer.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Append a single received byte.
    pub fn push_byte(&mut self, byte: u8) {
        self.buf.extend_from_slice(&[byte]);
    }

    /// Number of bytes waiting in the scan buffer.
    pub fn pending(&self) -> usize {
        self.buf.len()
    }

    /// Scan for the next valid event frame, discarding noise.
    ///
    /// Returns `None` once fewer than six bytes remain; the leftover
    /// bytes stay buffered for the next read.
    pub fn next_event(&mut self) -> Option<Event> {
        while self.buf.len() >= EVENT_FRAME_LEN {
            let window: &[u8] = &self.buf[..EVENT_FRAME_LEN];
            if window[0] == FRAME_SENTINEL
                && window[1] != 0
                && (window[2] != 0 || window[3] != 0)
                && window[5] == FRAME_SENTINEL
            {
                let event = Event::new(
                    window[1],
                    u16::from(window[2]) << 8 | u16::from(window[3]),
                    window[4],
                );
                self.buf.advance(EVENT_FRAME_LEN);
                return Some(event);
            }
            // Not a frame start; drop one byte and rescan.
            self.buf.advance(1);
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;
    use crate::ids::{config_topic, event_source};

    #[rstest]
    #[case(1, 1, 0)]
    #[case(1, 1, 255)]
    #[case(83, 12, 1)]
    #[case(255, 65535, 255)]
    #[case(87, 300, 0)]
    fn event_round_trip(#[case] source_id: u8, #[case] event_id: u16, #[case] value: u8) {
        let event = Event::new(source_id, event_id, value);
        let frame = encode_event(&event);
        assert_eq!(decode_event(&frame), Some(event));
    }

    #[rstest]
    #[case(0, 0, 0, 0, 0)]
    #[case(15, 255, 255, 255, u32::MAX)]
    #[case(3, config_topic::LAMPS, 2, 80, 0x00FF_FF00)]
    fn config_event_round_trip(
        #[case] board_id: u8,
        #[case] topic: u8,
        #[case] index: u8,
        #[case] key: u8,
        #[case] value: u32,
    ) {
        let event = ConfigEvent::new(board_id, topic, index, key, value);
        let frame = encode_config_event(&event);
        assert_eq!(decode_config_event(&frame), Some(event));
    }

    #[test]
    fn solenoid_command_wire_bytes() {
        let frame = encode_event(&Event::solenoid(12, true));
        assert_eq!(frame, [0xFF, 83, 0x00, 0x0C, 0x01, 0xFF]);
    }

    #[test]
    fn config_frame_is_big_endian() {
        let frame = encode_config_event(&ConfigEvent::new(1, config_topic::PWM, 0, 80, 0x01020304));
        assert_eq!(&frame[6..10], &[0x01, 0x02, 0x03, 0x04]);
    }

    #[test]
    fn decode_rejects_missing_sentinels() {
        assert_eq!(decode_event(&[0x00, 83, 0, 12, 1, 0xFF]), None);
        assert_eq!(decode_event(&[0xFF, 83, 0, 12, 1, 0x00]), None);
    }

    #[test]
    fn decoder_yields_consecutive_frames() {
        let a = Event::new(event_source::SWITCH, 7, 1);
        let b = Event::new(event_source::SWITCH, 7, 0);
        let mut decoder = FrameDecoder::new();
        decoder.extend(&encode_event(&a));
        decoder.extend(&encode_event(&b));
        assert_eq!(decoder.next_event(), Some(a));
        assert_eq!(decoder.next_event(), Some(b));
        assert_eq!(decoder.next_event(), None);
    }

    #[test]
    fn decoder_resyncs_past_spurious_sentinel() {
        // An extra 0xFF ahead of a valid frame: the window starting at
        // the stray byte fails validation once enough bytes arrive,
        // the decoder slides one byte and finds the real frame. The
        // frame after it must decode cleanly too.
        let a = Event::new(event_source::SWITCH, 33, 1);
        let b = Event::new(event_source::NULL, 1, 0);
        let mut decoder = FrameDecoder::new();
        decoder.push_byte(0xFF);
        decoder.extend(&encode_event(&a));
        decoder.extend(&encode_event(&b));
        assert_eq!(decoder.next_event(), Some(a));
        assert_eq!(decoder.next_event(), Some(b));
    }

    #[test]
    fn decoder_discards_garbage_runs() {
        let event = Event::new(event_source::PONG, 1, 4);
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0x12, 0x00, 0xFF, 0x03, 0x99]);
        decoder.extend(&encode_event(&event));
        assert_eq!(decoder.next_event(), Some(event));
        assert_eq!(decoder.next_event(), None);
    }

    #[test]
    fn decoder_treats_zero_source_as_noise() {
        // A zero source id cannot come from a board; the window is
        // noise even with both sentinels in place.
        let mut decoder = FrameDecoder::new();
        decoder.extend(&[0xFF, 0x00, 0x00, 0x07, 0x01, 0xFF]);
        assert_eq!(decoder.next_event(), None);
    }

    #[test]
    fn decoder_keeps_partial_frames_buffered() {
        let event = Event::new(event_source::SWITCH, 5, 1);
        let frame = encode_event(&event);
        let mut decoder = FrameDecoder::new();
        decoder.extend(&frame[..4]);
        assert_eq!(decoder.next_event(), None);
        assert_eq!(decoder.pending(), 4);
        decoder.extend(&frame[4..]);
        assert_eq!(decoder.next_event(), Some(event));
    }
}
