//! One-shot board discovery
//!
//! Runs synchronously inside connect, after the transport opens.
//! Boards need a settle period after power-up, then the whole chain is
//! reset and pinged; each address is probed individually and marked
//! active on a PONG reply. Unresponsive addresses simply stay
//! inactive — discovery can degrade the bus but never fail the
//! connection.

use std::thread;

use pinbus_core::ids::event_source;
use pinbus_core::{Event, FrameDecoder, MAX_BOARDS};
use tracing::{debug, info, warn};

use crate::config::Timings;
use crate::io;
use crate::registry::BoardRegistry;
use crate::transport::BusTransport;

/// Reset the bus, ping it, and probe every address in 0..=15.
///
/// Sequence: boot settle, broadcast RESET, reset settle, broadcast
/// PING, ping settle, then one bounded poll exchange per address in
/// ascending order. A PONG reply marks the address active; a NULL
/// reply or an elapsed deadline ends that address's probe. Transport
/// closure is observed between probes, never within one.
pub fn run(transport: &dyn BusTransport, registry: &mut BoardRegistry, timings: &Timings) {
    let mut decoder = FrameDecoder::new();

    thread::sleep(timings.boot_settle());
    if let Err(e) = io::send_event(transport, &Event::reset()) {
        warn!(error = %e, "failed to broadcast bus reset");
    }
    thread::sleep(timings.reset_settle());
    if let Err(e) = io::send_event(transport, &Event::ping()) {
        warn!(error = %e, "failed to broadcast discovery ping");
    }
    thread::sleep(timings.ping_settle());

    for address in 0..MAX_BOARDS as u8 {
        if !transport.is_open() {
            debug!("transport closed, abandoning discovery");
            return;
        }
        probe(transport, registry, &mut decoder, timings, address);
    }

    info!(active = ?registry.active_addresses(), "board discovery complete");
}

fn probe(
    transport: &dyn BusTransport,
    registry: &mut BoardRegistry,
    decoder: &mut FrameDecoder,
    timings: &Timings,
    address: u8,
) {
    if let Err(e) = io::send_event(transport, &Event::poll_request(address)) {
        warn!(address, error = %e, "discovery probe transmit failed");
        return;
    }

    loop {
        match io::receive_event(transport, decoder, timings.poll_timeout()) {
            Ok(Some(event)) => match event.source_id {
                event_source::PONG => {
                    debug!(address, "pong received, board active");
                    registry.mark_active(address);
                }
                event_source::NULL => return,
                other => {
                    debug!(address, source_id = other, "discarding probe reply");
                }
            },
            Ok(None) => return,
            Err(e) => {
                debug!(address, error = %e, "probe read failed");
                return;
            }
        }
    }
}
