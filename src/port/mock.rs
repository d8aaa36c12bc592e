//! Mock serial port implementation for testing.
//!
//! `MockSerialPort` simulates a device without hardware. Clones share one
//! state, which mirrors how `try_clone` works on a real port: bytes queued
//! through any handle are read by any other, and writes from every handle
//! land in the same log.

use super::error::PortError;
use super::selection::PortSelection;
use super::traits::{PortOpener, SerialPortAdapter};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Default)]
struct MockPortState {
    /// Bytes to be returned by read operations.
    read_queue: VecDeque<u8>,
    /// Every write call, in order.
    write_log: Vec<Vec<u8>>,
    /// Whether the next read/write should time out.
    should_timeout: bool,
    /// Report a device loss once the read queue runs dry.
    disconnect_when_drained: bool,
    /// Fail every write with this kind.
    write_error: Option<std::io::ErrorKind>,
    /// Cap on bytes returned per read; `None` fills the caller's buffer.
    max_chunk: Option<usize>,
    /// Number of upcoming opens that fail as if the port were busy.
    failing_opens: usize,
    timeout: Duration,
}

/// Mock serial port implementation for testing.
///
/// # Example
/// ```
/// use serial_line_monitor::port::{MockSerialPort, SerialPortAdapter};
///
/// let mut port = MockSerialPort::new("MOCK0");
/// port.enqueue_read(b"+23,50\n");
///
/// let mut buffer = [0u8; 16];
/// let n = port.read_bytes(&mut buffer).unwrap();
/// assert_eq!(&buffer[..n], b"+23,50\n");
///
/// port.write_bytes(b"ping\n").unwrap();
/// assert_eq!(port.get_write_log(), vec![b"ping\n".to_vec()]);
/// ```
#[derive(Clone)]
pub struct MockSerialPort {
    name: String,
    state: Arc<Mutex<MockPortState>>,
}

impl MockSerialPort {
    /// Create a new mock serial port with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Arc::new(Mutex::new(MockPortState {
                timeout: Duration::from_millis(5),
                ..Default::default()
            })),
        }
    }

    /// Enqueue bytes to be returned by subsequent read operations.
    pub fn enqueue_read(&self, data: &[u8]) {
        self.state.lock().read_queue.extend(data);
    }

    /// Get a copy of every write made to the port.
    pub fn get_write_log(&self) -> Vec<Vec<u8>> {
        self.state.lock().write_log.clone()
    }

    /// All written bytes concatenated.
    pub fn written_bytes(&self) -> Vec<u8> {
        self.state.lock().write_log.concat()
    }

    /// Make the next read or write report a timeout.
    pub fn set_should_timeout(&self, should_timeout: bool) {
        self.state.lock().should_timeout = should_timeout;
    }

    /// Once the queued bytes are consumed, fail reads as if the device was unplugged.
    pub fn set_disconnect_when_drained(&self, disconnect: bool) {
        self.state.lock().disconnect_when_drained = disconnect;
    }

    /// Fail every write with the given I/O error kind.
    pub fn set_write_error(&self, kind: Option<std::io::ErrorKind>) {
        self.state.lock().write_error = kind;
    }

    /// Return at most `n` bytes per read call.
    pub fn set_max_chunk(&self, n: Option<usize>) {
        self.state.lock().max_chunk = n;
    }

    /// Make the next `n` opens through [`MockPortOpener`] fail with [`PortError::Busy`].
    pub fn set_failing_opens(&self, n: usize) {
        self.state.lock().failing_opens = n;
    }

    /// Get the number of bytes available to read.
    pub fn available_bytes(&self) -> usize {
        self.state.lock().read_queue.len()
    }
}

impl SerialPortAdapter for MockSerialPort {
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }
        if let Some(kind) = state.write_error {
            return Err(PortError::Io(std::io::Error::new(kind, "mock write failure")));
        }

        state.write_log.push(data.to_vec());
        Ok(data.len())
    }

    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError> {
        let mut state = self.state.lock();

        if state.should_timeout {
            state.should_timeout = false;
            return Err(PortError::timeout(state.timeout));
        }

        let limit = state.max_chunk.unwrap_or(buffer.len()).min(buffer.len());
        let mut bytes_read = 0;
        for byte in buffer.iter_mut().take(limit) {
            match state.read_queue.pop_front() {
                Some(queued) => {
                    *byte = queued;
                    bytes_read += 1;
                }
                None => break,
            }
        }

        if bytes_read > 0 {
            return Ok(bytes_read);
        }
        if state.disconnect_when_drained {
            return Err(PortError::Io(std::io::Error::new(
                std::io::ErrorKind::BrokenPipe,
                "mock device disconnected",
            )));
        }

        // Behave like a real port waiting out its read timeout.
        let timeout = state.timeout;
        drop(state);
        std::thread::sleep(timeout);
        Err(PortError::Io(std::io::Error::new(
            std::io::ErrorKind::TimedOut,
            "No data available",
        )))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError> {
        self.state.lock().timeout = timeout;
        Ok(())
    }

    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        Ok(Box::new(self.clone()))
    }
}

impl std::fmt::Debug for MockSerialPort {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockSerialPort")
            .field("name", &self.name)
            .field("available_bytes", &self.available_bytes())
            .finish()
    }
}

/// Hands out registered mock ports by name.
///
/// Opening an unknown name fails with [`PortError::NotFound`], like a
/// missing device would.
#[derive(Debug, Clone, Default)]
pub struct MockPortOpener {
    ports: Vec<MockSerialPort>,
}

impl MockPortOpener {
    pub fn new(ports: impl IntoIterator<Item = MockSerialPort>) -> Self {
        Self {
            ports: ports.into_iter().collect(),
        }
    }
}

impl PortOpener for MockPortOpener {
    fn open(
        &self,
        selection: &PortSelection,
        timeout: Duration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError> {
        let mut port = self
            .ports
            .iter()
            .find(|p| p.name == selection.port)
            .cloned()
            .ok_or_else(|| PortError::not_found(&selection.port))?;
        {
            let mut state = port.state.lock();
            if state.failing_opens > 0 {
                state.failing_opens -= 1;
                return Err(PortError::Busy(selection.port.clone()));
            }
        }
        port.set_timeout(timeout)?;
        Ok(Box::new(port))
    }

    fn available_ports(&self) -> Result<Vec<String>, PortError> {
        Ok(self.ports.iter().map(|p| p.name.clone()).collect())
    }
}
