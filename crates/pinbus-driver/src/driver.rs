//! Client facade over the bus master engine
//!
//! Lifecycle: `connect` opens the transport and runs discovery;
//! `send_config_burst` dispatches configuration records while the bus
//! is otherwise quiet; `start` spawns the master loop; `disconnect`
//! closes the transport, lets the loop observe closure and joins the
//! worker thread. Command enqueueing and switch polling are legal from
//! any thread and never block.

use std::sync::Arc;
use std::thread::JoinHandle;

use parking_lot::Mutex;
use pinbus_core::{ConfigEvent, Event, SwitchState};
use tracing::{debug, info, warn};

use crate::config::DriverConfig;
use crate::discovery;
use crate::error::DriverError;
use crate::io;
use crate::queue::{EventQueue, SwitchQueue};
use crate::registry::BoardRegistry;
use crate::scheduler::MasterLoop;
use crate::transport::{create_transport, BusTransport};

/// Link state between connect and disconnect.
struct Link {
    /// Present from connect until start, when it moves into the worker.
    registry: Option<BoardRegistry>,
    worker: Option<JoinHandle<()>>,
}

/// RS485 bus master for a chain of pinball I/O boards.
pub struct BusDriver {
    config: DriverConfig,
    transport: Arc<dyn BusTransport>,
    outbound: Arc<EventQueue>,
    switches: Arc<SwitchQueue>,
    /// Boards registered for polling; read at connect time.
    registered: Mutex<Vec<u8>>,
    /// Discovery snapshot; written once per connect.
    active: Mutex<Vec<u8>>,
    link: Mutex<Option<Link>>,
}

impl BusDriver {
    /// Create a driver, building the transport from configuration.
    pub fn new(config: DriverConfig) -> Self {
        let transport = create_transport(&config.transport);
        Self::with_transport(config, transport)
    }

    /// Create a driver over a caller-supplied transport (tests script
    /// the mock bus this way).
    pub fn with_transport(config: DriverConfig, transport: Arc<dyn BusTransport>) -> Self {
        let registered = config.boards.clone();
        Self {
            config,
            transport,
            outbound: Arc::new(EventQueue::new()),
            switches: Arc::new(SwitchQueue::new()),
            registered: Mutex::new(registered),
            active: Mutex::new(Vec::new()),
            link: Mutex::new(None),
        }
    }

    /// Register a board address for switch polling. Only effective
    /// before [`connect`](Self::connect); beyond 16 boards this is a
    /// silent no-op.
    pub fn register_board(&self, address: u8) {
        self.registered.lock().push(address);
    }

    /// Open the transport and discover the board chain.
    ///
    /// Fails only if the transport fails to open; unresponsive boards
    /// simply remain inactive. Inactive boards are never re-probed on
    /// a live link — reconnect to re-run discovery.
    pub fn connect(&self) -> Result<(), DriverError> {
        let mut link = self.link.lock();
        if link.is_some() {
            return Err(DriverError::AlreadyConnected);
        }

        self.transport.open()?;

        let mut registry = BoardRegistry::new();
        for &address in self.registered.lock().iter() {
            registry.register(address);
        }

        discovery::run(&*self.transport, &mut registry, &self.config.timings);
        *self.active.lock() = registry.active_addresses();

        *link = Some(Link {
            registry: Some(registry),
            worker: None,
        });
        Ok(())
    }

    /// Transmit one configuration record as an uninterrupted burst of
    /// frames, in the given order.
    ///
    /// Only legal between [`connect`](Self::connect) and
    /// [`start`](Self::start): once the master loop runs, its polling
    /// traffic would interleave with the burst.
    pub fn send_config_burst(&self, burst: &[ConfigEvent]) -> Result<(), DriverError> {
        let link = self.link.lock();
        let link = link.as_ref().ok_or(DriverError::NotConnected)?;
        if link.worker.is_some() {
            return Err(DriverError::ConfigPhaseOver);
        }

        for event in burst {
            io::send_config_event(&*self.transport, event)?;
        }
        debug!(frames = burst.len(), "config burst dispatched");
        Ok(())
    }

    /// Spawn the master loop. The configuration phase ends here.
    pub fn start(&self) -> Result<(), DriverError> {
        let mut link = self.link.lock();
        let link = link.as_mut().ok_or(DriverError::NotConnected)?;
        if link.worker.is_some() {
            return Err(DriverError::AlreadyConnected);
        }

        let registry = link
            .registry
            .take()
            .expect("registry present until start");
        let master = MasterLoop::new(
            self.transport.clone(),
            self.outbound.clone(),
            self.switches.clone(),
            registry,
            self.config.timings.clone(),
        );
        link.worker = Some(master.spawn()?);
        Ok(())
    }

    /// Close the link and join the master loop. Idempotent.
    pub fn disconnect(&self) {
        let mut link = self.link.lock();
        self.transport.close();
        if let Some(link) = link.take() {
            if let Some(worker) = link.worker {
                // The loop observes closure at its next iteration
                // boundary; joining here guarantees it never touches
                // torn-down state afterwards.
                if worker.join().is_err() {
                    warn!("master loop thread panicked");
                }
            }
            info!("disconnected");
        }
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_open()
    }

    /// Enqueue any event for transmission. Never blocks, never fails;
    /// there is no backpressure.
    pub fn queue_event(&self, event: Event) {
        self.outbound.push(event);
    }

    /// Enqueue a solenoid state command.
    pub fn set_solenoid_state(&self, number: u16, on: bool) {
        self.queue_event(Event::solenoid(number, on));
    }

    /// Enqueue a lamp state command.
    pub fn set_lamp_state(&self, number: u16, on: bool) {
        self.queue_event(Event::lamp(number, on));
    }

    /// Ask all boards to report their current switch states, e.g. to
    /// learn that the coin door starts out closed.
    pub fn request_switch_snapshot(&self) {
        self.queue_event(Event::read_switches());
    }

    /// Next decoded switch transition, or `None` if none is pending.
    /// Non-blocking; an empty queue is a valid silent result.
    pub fn next_switch_state(&self) -> Option<SwitchState> {
        self.switches.pop()
    }

    /// Addresses confirmed reachable by the last discovery run.
    pub fn active_boards(&self) -> Vec<u8> {
        self.active.lock().clone()
    }
}

impl Drop for BusDriver {
    fn drop(&mut self) {
        self.disconnect();
    }
}
