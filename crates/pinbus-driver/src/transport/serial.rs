//! Physical RS485 link through a UART or USB-serial bridge

use std::io::{Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use serialport::{DataBits, Parity, SerialPort, StopBits};
use tracing::{debug, info};

use super::{BusTransport, TransportError};
use crate::config::SerialConfig;

/// Default per-call timeout; individual reads override it.
const WRITE_TIMEOUT: Duration = Duration::from_millis(8);

/// [`BusTransport`] over the `serialport` crate.
///
/// The line always runs 8 data bits, one stop bit, no parity — the
/// parameters the board firmware is built with.
pub struct SerialPortTransport {
    config: SerialConfig,
    open: AtomicBool,
    port: Mutex<Option<Box<dyn SerialPort>>>,
}

impl SerialPortTransport {
    pub fn new(config: SerialConfig) -> Self {
        Self {
            config,
            open: AtomicBool::new(false),
            port: Mutex::new(None),
        }
    }
}

impl BusTransport for SerialPortTransport {
    fn open(&self) -> Result<(), TransportError> {
        let port = serialport::new(&self.config.device, self.config.baud_rate)
            .data_bits(DataBits::Eight)
            .stop_bits(StopBits::One)
            .parity(Parity::None)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(|e| TransportError::OpenFailed {
                device: self.config.device.clone(),
                reason: e.to_string(),
            })?;

        info!(
            device = %self.config.device,
            baud = self.config.baud_rate,
            "serial link open"
        );
        *self.port.lock() = Some(port);
        self.open.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn close(&self) {
        self.open.store(false, Ordering::SeqCst);
        if self.port.lock().take().is_some() {
            debug!(device = %self.config.device, "serial link closed");
        }
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }

    fn available(&self) -> usize {
        match self.port.lock().as_ref() {
            Some(port) => port.bytes_to_read().unwrap_or(0) as usize,
            None => 0,
        }
    }

    fn read_byte(&self, timeout: Duration) -> Result<Option<u8>, TransportError> {
        let mut guard = self.port.lock();
        let port = guard.as_mut().ok_or(TransportError::Closed)?;
        port.set_timeout(timeout)
            .map_err(|e| TransportError::ReadFailed(e.to_string()))?;

        let mut byte = [0u8; 1];
        match port.read_exact(&mut byte) {
            Ok(()) => Ok(Some(byte[0])),
            Err(e) if e.kind() == std::io::ErrorKind::TimedOut => Ok(None),
            Err(e) => Err(TransportError::ReadFailed(e.to_string())),
        }
    }

    fn write(&self, frame: &[u8]) -> Result<usize, TransportError> {
        let mut guard = self.port.lock();
        let port = guard.as_mut().ok_or(TransportError::Closed)?;
        port.write_all(frame)
            .map_err(|e| TransportError::WriteFailed(e.to_string()))?;
        Ok(frame.len())
    }
}
