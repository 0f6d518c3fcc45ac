//! Integration tests for the RS485 pinball I/O driver
//!
//! The tests in `tests/` exercise the full stack against the
//! in-memory mock bus: discovery, the configuration phase, the
//! round-robin master loop and switch event delivery. No hardware is
//! required.
//!
//! # Test Structure
//!
//! - `driver_e2e_test.rs` - lifecycle, discovery and runtime traffic
//! - `machine_config_test.rs` - machine file to config burst pipeline

use std::sync::Arc;
use std::time::{Duration, Instant};

use pinbus_driver::transport::SimulatedBoard;
use pinbus_driver::{BusDriver, DriverConfig, MockTransport, Timings};

/// A driver over a fresh mock bus carrying the given boards, with the
/// settle waits reduced so tests run in milliseconds. Every board is
/// also registered for polling.
pub fn mock_driver(boards: Vec<SimulatedBoard>) -> (BusDriver, Arc<MockTransport>) {
    let transport = Arc::new(MockTransport::new());
    let mut config = DriverConfig::mock();
    config.timings = Timings::fast();
    for board in boards {
        config.boards.push(board.address());
        transport.add_board(board);
    }
    let driver = BusDriver::with_transport(config, transport.clone());
    (driver, transport)
}

/// Poll `condition` until it holds or the deadline passes. The master
/// loop runs on its own thread, so assertions about its traffic have
/// to wait for it.
pub fn wait_for(deadline: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let start = Instant::now();
    while start.elapsed() < deadline {
        if condition() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
    condition()
}
