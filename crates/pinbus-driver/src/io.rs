//! Frame-level send/receive primitives over a [`BusTransport`]
//!
//! Sending is a single write of a fixed-size frame; there is no retry
//! or backoff, a failed transmit loses the frame (callers log it).
//! Receiving is bounded by a wall-clock deadline and feeds the
//! byte-at-a-time resync decoder, never assuming frame alignment.

use std::time::{Duration, Instant};

use pinbus_core::{codec, ConfigEvent, Event, FrameDecoder};
use tracing::trace;

use crate::transport::{BusTransport, TransportError};

/// Transmit one event frame.
pub fn send_event(transport: &dyn BusTransport, event: &Event) -> Result<(), TransportError> {
    let frame = codec::encode_event(event);
    trace!(frame = %hex::encode(frame), "tx event");
    transport.write(&frame).map(|_| ())
}

/// Transmit one configuration frame.
pub fn send_config_event(
    transport: &dyn BusTransport,
    event: &ConfigEvent,
) -> Result<(), TransportError> {
    let frame = codec::encode_config_event(event);
    trace!(frame = %hex::encode(frame), "tx config event");
    transport.write(&frame).map(|_| ())
}

/// Receive the next valid event frame within `deadline`.
///
/// Returns `Ok(None)` when the deadline elapses first — on this bus
/// that is an ordinary outcome ("no more replies"), not an error.
/// Noise bytes consumed along the way stay absorbed by `decoder`.
pub fn receive_event(
    transport: &dyn BusTransport,
    decoder: &mut FrameDecoder,
    deadline: Duration,
) -> Result<Option<Event>, TransportError> {
    if let Some(event) = decoder.next_event() {
        return Ok(Some(event));
    }

    let start = Instant::now();
    loop {
        let remaining = deadline.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            return Ok(None);
        }
        match transport.read_byte(remaining)? {
            Some(byte) => {
                decoder.push_byte(byte);
                if let Some(event) = decoder.next_event() {
                    return Ok(Some(event));
                }
            }
            // Transport-level timeout: nothing more is arriving.
            None => return Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use pinbus_core::ids::event_source;

    use super::*;
    use crate::transport::{MockTransport, SimulatedBoard};

    #[test]
    fn receive_decodes_a_poll_reply() {
        let mock = MockTransport::new();
        mock.open().unwrap();
        mock.add_board(SimulatedBoard::new(2));
        mock.queue_switch_event(2, 44, 1);
        send_event(&mock, &Event::poll_request(2)).unwrap();

        let mut decoder = FrameDecoder::new();
        let first = receive_event(&mock, &mut decoder, Duration::from_millis(5)).unwrap();
        assert_eq!(first, Some(Event::new(event_source::SWITCH, 44, 1)));
        let second = receive_event(&mock, &mut decoder, Duration::from_millis(5)).unwrap();
        assert_eq!(second.map(|e| e.source_id), Some(event_source::NULL));
    }

    #[test]
    fn receive_returns_none_on_silence() {
        let mock = MockTransport::new();
        mock.open().unwrap();
        let mut decoder = FrameDecoder::new();
        let result = receive_event(&mock, &mut decoder, Duration::from_millis(1)).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn receive_skips_leading_noise() {
        let mock = MockTransport::new();
        mock.open().unwrap();
        mock.add_board(SimulatedBoard::new(5));
        mock.inject_noise(5, &[0xFF, 0x13, 0x37]);
        mock.queue_switch_event(5, 8, 0);
        send_event(&mock, &Event::poll_request(5)).unwrap();

        let mut decoder = FrameDecoder::new();
        let event = receive_event(&mock, &mut decoder, Duration::from_millis(5)).unwrap();
        assert_eq!(event, Some(Event::new(event_source::SWITCH, 8, 0)));
    }
}
