//! The master loop: command delivery interleaved with round-robin polling
//!
//! Exactly one instance runs, on a dedicated background thread started
//! after connect (and the configuration phase) completes. Each tick
//! transmits at most one pending command, then polls the next
//! registered board in cyclic order. Sending first guarantees command
//! delivery is never starved by polling; polling one board per tick
//! bounds per-board poll latency to roughly the registered-board count
//! in milliseconds.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use pinbus_core::ids::event_source;
use pinbus_core::{Event, FrameDecoder, SwitchState};
use tracing::{debug, info, trace, warn};

use crate::config::Timings;
use crate::error::DriverError;
use crate::io;
use crate::queue::{EventQueue, SwitchQueue};
use crate::registry::BoardRegistry;
use crate::transport::BusTransport;

/// State owned by the master loop thread.
///
/// The registry moves in here at spawn time, which is what confines
/// all active-flag writes to this thread.
pub struct MasterLoop {
    transport: Arc<dyn BusTransport>,
    outbound: Arc<EventQueue>,
    switches: Arc<SwitchQueue>,
    registry: BoardRegistry,
    timings: Timings,
    cursor: usize,
    decoder: FrameDecoder,
}

impl MasterLoop {
    pub fn new(
        transport: Arc<dyn BusTransport>,
        outbound: Arc<EventQueue>,
        switches: Arc<SwitchQueue>,
        registry: BoardRegistry,
        timings: Timings,
    ) -> Self {
        Self {
            transport,
            outbound,
            switches,
            registry,
            timings,
            cursor: 0,
            decoder: FrameDecoder::new(),
        }
    }

    /// Spawn the worker thread. The handle must be joined after the
    /// transport closes to guarantee no access to torn-down state.
    pub fn spawn(self) -> Result<JoinHandle<()>, DriverError> {
        thread::Builder::new()
            .name("pinbus-master".into())
            .spawn(move || self.run())
            .map_err(|e| DriverError::Spawn(e.to_string()))
    }

    fn run(mut self) {
        info!("master loop started");
        while self.transport.is_open() {
            self.tick();
            thread::sleep(self.timings.tick_sleep());
        }
        info!("master loop finished");
    }

    fn tick(&mut self) {
        // 1. At most one pending command, ahead of this tick's poll.
        if let Some(event) = self.outbound.pop() {
            if let Err(e) = io::send_event(&*self.transport, &event) {
                // No retry: the command is lost, the bus moves on.
                warn!(
                    source_id = event.source_id,
                    event_id = event.event_id,
                    error = %e,
                    "command transmit failed, event dropped"
                );
            }
        }

        // 2. Poll the board under the round-robin cursor.
        if let Some(board) = self.advance_cursor() {
            if self.registry.is_active(board) {
                self.poll_board(board);
            }
        }
    }

    /// Next registered address in cyclic order. Inactive boards still
    /// occupy a slot: fairness is over the registered list.
    fn advance_cursor(&mut self) -> Option<u8> {
        let registered = self.registry.registered();
        if registered.is_empty() {
            return None;
        }
        let board = registered[self.cursor % registered.len()];
        self.cursor = (self.cursor + 1) % registered.len();
        Some(board)
    }

    /// One poll exchange: request, then drain replies until the board
    /// terminates the burst with NULL or the deadline elapses.
    fn poll_board(&mut self, board: u8) {
        if let Err(e) = io::send_event(&*self.transport, &Event::poll_request(board)) {
            warn!(board, error = %e, "poll request transmit failed");
            return;
        }

        loop {
            match io::receive_event(&*self.transport, &mut self.decoder, self.timings.poll_timeout())
            {
                Ok(Some(event)) => match event.source_id {
                    event_source::SWITCH => {
                        trace!(board, number = event.event_id, state = event.value, "switch");
                        self.switches
                            .push(SwitchState::new(event.event_id, event.value));
                    }
                    event_source::NULL => return,
                    event_source::PONG => {
                        // Only meaningful during discovery; accepted
                        // and ignored here.
                    }
                    other => {
                        // Reserved for future diagnostic or fault
                        // reports; accepted and discarded.
                        debug!(board, source_id = other, "discarding poll reply");
                    }
                },
                Ok(None) => return,
                Err(e) => {
                    debug!(board, error = %e, "poll read failed");
                    return;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::transport::{MockTransport, SimulatedBoard};

    struct Fixture {
        transport: Arc<MockTransport>,
        outbound: Arc<EventQueue>,
        switches: Arc<SwitchQueue>,
        master: MasterLoop,
    }

    fn fixture(boards: &[u8], active: &[u8]) -> Fixture {
        let transport = Arc::new(MockTransport::new());
        transport.open().unwrap();
        let mut registry = BoardRegistry::new();
        for &b in boards {
            transport.add_board(SimulatedBoard::new(b));
            registry.register(b);
        }
        for &b in active {
            registry.mark_active(b);
        }
        let outbound = Arc::new(EventQueue::new());
        let switches = Arc::new(SwitchQueue::new());
        let master = MasterLoop::new(
            transport.clone(),
            outbound.clone(),
            switches.clone(),
            registry,
            Timings::fast(),
        );
        Fixture {
            transport,
            outbound,
            switches,
            master,
        }
    }

    #[test]
    fn ticks_poll_active_boards_in_cyclic_order() {
        let mut f = fixture(&[1, 2, 3], &[1, 2, 3]);
        for _ in 0..6 {
            f.master.tick();
        }
        assert_eq!(f.transport.polled_addresses(), vec![1, 2, 3, 1, 2, 3]);
    }

    #[test]
    fn inactive_board_occupies_a_slot_but_is_not_polled() {
        let mut f = fixture(&[1, 2, 3], &[1, 3]);
        for _ in 0..6 {
            f.master.tick();
        }
        assert_eq!(f.transport.polled_addresses(), vec![1, 3, 1, 3]);
    }

    #[test]
    fn one_command_per_tick_ahead_of_the_poll() {
        let mut f = fixture(&[4], &[4]);
        f.outbound.push(Event::solenoid(12, true));
        f.outbound.push(Event::lamp(7, false));

        f.master.tick();
        let events = f.transport.written_events();
        assert_eq!(events[0], Event::solenoid(12, true));
        assert_eq!(events[1], Event::poll_request(4));
        assert_eq!(f.outbound.len(), 1);

        f.master.tick();
        let events = f.transport.written_events();
        assert_eq!(events[2], Event::lamp(7, false));
        assert!(f.outbound.is_empty());
    }

    #[test]
    fn poll_replies_land_in_the_switch_queue_in_order() {
        let mut f = fixture(&[2], &[2]);
        f.transport.queue_switch_event(2, 31, 1);
        f.transport.queue_switch_event(2, 31, 0);
        f.master.tick();

        assert_eq!(f.switches.pop(), Some(SwitchState::new(31, 1)));
        assert_eq!(f.switches.pop(), Some(SwitchState::new(31, 0)));
        assert_eq!(f.switches.pop(), None);
    }

    #[test]
    fn unknown_reply_sources_are_discarded() {
        let mut f = fixture(&[2], &[2]);
        // A diagnostic report kind this driver does not know yet.
        f.transport.queue_board_event(2, Event::new(66, 1, 1));
        f.transport.queue_switch_event(2, 9, 1);
        f.master.tick();

        assert_eq!(f.switches.pop(), Some(SwitchState::new(9, 1)));
        assert_eq!(f.switches.pop(), None);
    }

    #[test]
    fn loop_exits_when_transport_closes() {
        let f = fixture(&[1], &[1]);
        let transport = f.transport.clone();
        let handle = f.master.spawn().unwrap();
        transport.close();
        handle.join().unwrap();
    }
}
