//! In-memory mock bus with simulated I/O boards
//!
//! The mock interprets every frame the host writes exactly like the
//! board firmware would: a broadcast RESET clears board state, a
//! broadcast PING arms a PONG on every responsive board, and a poll
//! request addressed to a present board drains that board's queued
//! events followed by a NULL terminator into the host's receive
//! stream. Absent boards simply stay silent, which is what a probe
//! timeout looks like on the real bus.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use pinbus_core::{
    codec, ConfigEvent, Event, SwitchState, CONFIG_FRAME_LEN, EVENT_FRAME_LEN,
};
use pinbus_core::ids::event_source;
use tracing::trace;

use super::{BusTransport, TransportError};

/// One scripted board on the mock bus.
#[derive(Debug)]
pub struct SimulatedBoard {
    address: u8,
    answers_ping: bool,
    pong_pending: bool,
    /// Events delivered on the next poll addressed to this board.
    pending: VecDeque<Event>,
    /// Switch states reported when the host broadcasts READ_SWITCHES.
    initial_switches: Vec<SwitchState>,
    /// Raw bytes emitted ahead of the next reply burst (line noise).
    noise_prelude: Vec<u8>,
}

impl SimulatedBoard {
    pub fn new(address: u8) -> Self {
        Self {
            address,
            answers_ping: true,
            pong_pending: false,
            pending: VecDeque::new(),
            initial_switches: Vec::new(),
            noise_prelude: Vec::new(),
        }
    }

    /// A board that is present on the bus but never answers the
    /// discovery ping; its probes end with a NULL reply.
    pub fn silent(address: u8) -> Self {
        Self {
            answers_ping: false,
            ..Self::new(address)
        }
    }

    pub fn with_initial_switch(mut self, number: u16, state: u8) -> Self {
        self.initial_switches.push(SwitchState::new(number, state));
        self
    }

    pub fn address(&self) -> u8 {
        self.address
    }
}

#[derive(Debug, Default)]
struct MockBus {
    boards: BTreeMap<u8, SimulatedBoard>,
    /// Bytes the host will read next.
    rx: VecDeque<u8>,
    /// Every frame the host wrote, in order.
    writes: Vec<Vec<u8>>,
    /// Decoded configuration frames, in write order.
    config_frames: Vec<ConfigEvent>,
}

impl MockBus {
    fn handle_event(&mut self, event: Event) {
        match event.source_id {
            event_source::RESET => {
                for board in self.boards.values_mut() {
                    board.pong_pending = false;
                    board.pending.clear();
                }
            }
            event_source::PING => {
                for board in self.boards.values_mut() {
                    if board.answers_ping {
                        board.pong_pending = true;
                    }
                }
            }
            event_source::READ_SWITCHES => {
                for board in self.boards.values_mut() {
                    for sw in &board.initial_switches {
                        board
                            .pending
                            .push_back(Event::new(event_source::SWITCH, sw.number, sw.state));
                    }
                }
            }
            event_source::POLL_EVENTS => {
                let address = event.value;
                let mut reply = Vec::new();
                if let Some(board) = self.boards.get_mut(&address) {
                    reply.append(&mut board.noise_prelude);
                    if board.pong_pending {
                        board.pong_pending = false;
                        reply.extend_from_slice(&codec::encode_event(&Event::new(
                            event_source::PONG,
                            1,
                            address,
                        )));
                    }
                    while let Some(pending) = board.pending.pop_front() {
                        reply.extend_from_slice(&codec::encode_event(&pending));
                    }
                    reply.extend_from_slice(&codec::encode_event(&Event::control(
                        event_source::NULL,
                    )));
                }
                self.rx.extend(reply);
            }
            _ => {
                // Solenoid, lamp and friends: actuation only, no reply.
            }
        }
    }
}

/// [`BusTransport`] test double over a scripted in-memory bus.
#[derive(Debug, Default)]
pub struct MockTransport {
    open: AtomicBool,
    bus: Mutex<MockBus>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_board(&self, board: SimulatedBoard) {
        let mut bus = self.bus.lock();
        bus.boards.insert(board.address, board);
    }

    /// Queue a switch transition on a board, delivered with its next poll.
    pub fn queue_switch_event(&self, address: u8, number: u16, state: u8) {
        if let Some(board) = self.bus.lock().boards.get_mut(&address) {
            board
                .pending
                .push_back(Event::new(event_source::SWITCH, number, state));
        }
    }

    /// Queue an arbitrary reply event on a board.
    pub fn queue_board_event(&self, address: u8, event: Event) {
        if let Some(board) = self.bus.lock().boards.get_mut(&address) {
            board.pending.push_back(event);
        }
    }

    /// Inject raw bytes ahead of a board's next reply burst.
    pub fn inject_noise(&self, address: u8, bytes: &[u8]) {
        if let Some(board) = self.bus.lock().boards.get_mut(&address) {
            board.noise_prelude.extend_from_slice(bytes);
        }
    }

    /// Every frame written so far, oldest first.
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.bus.lock().writes.clone()
    }

    /// Forget the write log, e.g. between the discovery and runtime
    /// phases of a test.
    pub fn clear_writes(&self) {
        self.bus.lock().writes.clear();
    }

    /// Decoded event frames the host wrote, oldest first.
    pub fn written_events(&self) -> Vec<Event> {
        self.bus
            .lock()
            .writes
            .iter()
            .filter_map(|frame| {
                let frame: &[u8; EVENT_FRAME_LEN] = frame.as_slice().try_into().ok()?;
                codec::decode_event(frame)
            })
            .collect()
    }

    /// Board addresses in the order the host polled them.
    pub fn polled_addresses(&self) -> Vec<u8> {
        self.written_events()
            .into_iter()
            .filter(|e| e.source_id == event_source::POLL_EVENTS)
            .map(|e| e.value)
            .collect()
    }

    /// Configuration frames the host wrote, in order.
    pub fn config_frames(&self) -> Vec<ConfigEvent> {
        self.bus.lock().config_frames.clone()
    }
}

impl BusTransport for MockTransport {
    fn open(&self) -> Result<(), TransportError> {
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn available(&self) -> usize {
        self.bus.lock().rx.len()
    }

    fn read_byte(&self, _timeout: Duration) -> Result<Option<u8>, TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        // The mock bus has no propagation delay: an empty receive
        // stream reads as an elapsed deadline.
        Ok(self.bus.lock().rx.pop_front())
    }

    fn write(&self, frame: &[u8]) -> Result<usize, TransportError> {
        if !self.is_open() {
            return Err(TransportError::Closed);
        }
        trace!(frame = %hex::encode(frame), "mock bus write");
        let mut bus = self.bus.lock();
        bus.writes.push(frame.to_vec());
        if frame.len() == EVENT_FRAME_LEN {
            let exact: &[u8; EVENT_FRAME_LEN] = frame.try_into().expect("length checked");
            if let Some(event) = codec::decode_event(exact) {
                bus.handle_event(event);
            }
        } else if frame.len() == CONFIG_FRAME_LEN {
            let exact: &[u8; CONFIG_FRAME_LEN] = frame.try_into().expect("length checked");
            if let Some(event) = codec::decode_config_event(exact) {
                bus.config_frames.push(event);
            }
        }
        Ok(frame.len())
    }
}

#[cfg(test)]
mod tests {
    use pinbus_core::codec::encode_event;

    use super::*;

    fn open_mock() -> MockTransport {
        let mock = MockTransport::new();
        mock.open().unwrap();
        mock
    }

    fn drain_events(mock: &MockTransport) -> Vec<Event> {
        let mut decoder = pinbus_core::FrameDecoder::new();
        while let Ok(Some(byte)) = mock.read_byte(Duration::ZERO) {
            decoder.push_byte(byte);
        }
        let mut events = Vec::new();
        while let Some(event) = decoder.next_event() {
            events.push(event);
        }
        events
    }

    #[test]
    fn ping_then_poll_yields_pong_and_null() {
        let mock = open_mock();
        mock.add_board(SimulatedBoard::new(4));
        mock.write(&encode_event(&Event::ping())).unwrap();
        mock.write(&encode_event(&Event::poll_request(4))).unwrap();

        let events = drain_events(&mock);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], Event::new(event_source::PONG, 1, 4));
        assert_eq!(events[1].source_id, event_source::NULL);
    }

    #[test]
    fn silent_board_replies_null_but_no_pong() {
        let mock = open_mock();
        mock.add_board(SimulatedBoard::silent(3));
        mock.write(&encode_event(&Event::ping())).unwrap();
        mock.write(&encode_event(&Event::poll_request(3))).unwrap();

        let events = drain_events(&mock);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].source_id, event_source::NULL);
    }

    #[test]
    fn absent_board_stays_silent() {
        let mock = open_mock();
        mock.write(&encode_event(&Event::poll_request(9))).unwrap();
        assert_eq!(mock.available(), 0);
    }

    #[test]
    fn poll_drains_queued_switch_events_in_order() {
        let mock = open_mock();
        mock.add_board(SimulatedBoard::new(1));
        mock.queue_switch_event(1, 10, 1);
        mock.queue_switch_event(1, 10, 0);
        mock.write(&encode_event(&Event::poll_request(1))).unwrap();

        let events = drain_events(&mock);
        assert_eq!(events[0], Event::new(event_source::SWITCH, 10, 1));
        assert_eq!(events[1], Event::new(event_source::SWITCH, 10, 0));
        assert_eq!(events[2].source_id, event_source::NULL);
    }

    #[test]
    fn closed_transport_refuses_io() {
        let mock = MockTransport::new();
        assert!(mock.write(&[0u8; 6]).is_err());
        assert!(mock.read_byte(Duration::ZERO).is_err());
    }
}
