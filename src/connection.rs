//! Connection manager: port enumeration, connect, send and close.
//!
//! The manager keeps the write handle on the UI thread and gives the line
//! reader its own cloned handle, so reads and writes never share a lock.

use crate::error::{ConnectError, SendError};
use crate::port::{PortError, PortOpener, PortSelection, SerialPortAdapter, SystemPortOpener};
use crate::reader::{LineReader, ReaderEvent, LINE_TERMINATOR};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// An open port with its reader thread.
#[derive(Debug)]
pub struct Connection {
    selection: PortSelection,
    writer: Box<dyn SerialPortAdapter>,
    open: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
    opened_at: Instant,
}

impl Connection {
    pub fn selection(&self) -> &PortSelection {
        &self.selection
    }

    /// False once closed, or once the reader saw the device fail.
    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    pub fn opened_at(&self) -> Instant {
        self.opened_at
    }

    /// Signal the reader to stop and wait for it.
    ///
    /// The reader notices within one read timeout.
    fn close(&mut self) {
        self.open.store(false, Ordering::Release);
        if let Some(handle) = self.reader.take() {
            if handle.join().is_err() {
                warn!(port = %self.selection.port, "line reader panicked");
            }
        }
        info!(port = %self.selection.port, "connection closed");
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if self.reader.is_some() {
            self.close();
        }
    }
}

pub struct ConnectionManager {
    opener: Box<dyn PortOpener>,
    read_timeout: Duration,
    connection: Option<Connection>,
    events_tx: Sender<ReaderEvent>,
    events_rx: Receiver<ReaderEvent>,
}

impl ConnectionManager {
    /// A manager that opens real serial ports.
    pub fn new(read_timeout: Duration) -> Self {
        Self::with_opener(Box::new(SystemPortOpener), read_timeout)
    }

    pub fn with_opener(opener: Box<dyn PortOpener>, read_timeout: Duration) -> Self {
        let (events_tx, events_rx) = mpsc::channel();
        Self {
            opener,
            read_timeout,
            connection: None,
            events_tx,
            events_rx,
        }
    }

    /// Enumerate the ports present right now.
    pub fn list_ports(&self) -> Result<Vec<String>, PortError> {
        let ports = self.opener.available_ports()?;
        debug!(count = ports.len(), "enumerated serial ports");
        Ok(ports)
    }

    /// Open `selection` and start reading from it.
    ///
    /// On success the current connection, if any, is closed and replaced.
    /// On failure it is left as it was. Ports are opened exclusively, so
    /// reconnecting to the port already in use releases it first; if the
    /// new settings then fail, the previous ones are reopened, and only if
    /// that fails too is the lost selection reported in the error.
    pub fn connect(&mut self, selection: PortSelection) -> Result<(), ConnectError> {
        let same_port = self
            .connection
            .as_ref()
            .filter(|c| c.selection.port == selection.port)
            .map(|c| c.selection.clone());
        if same_port.is_some() {
            self.close();
        }

        let (writer, reader_port) = match self.open_handles(&selection) {
            Ok(handles) => handles,
            Err(source) => {
                let previous_closed = same_port.and_then(|previous| self.restore(previous));
                return Err(ConnectError {
                    port: selection.port,
                    source,
                    previous_closed,
                });
            }
        };

        self.close();
        self.start(selection, writer, reader_port)
            .map_err(|(port, source)| ConnectError {
                port,
                source,
                previous_closed: None,
            })
    }

    fn open_handles(
        &self,
        selection: &PortSelection,
    ) -> Result<(Box<dyn SerialPortAdapter>, Box<dyn SerialPortAdapter>), PortError> {
        let writer = self.opener.open(selection, self.read_timeout)?;
        let reader_port = writer.try_clone_adapter()?;
        Ok((writer, reader_port))
    }

    fn start(
        &mut self,
        selection: PortSelection,
        writer: Box<dyn SerialPortAdapter>,
        reader_port: Box<dyn SerialPortAdapter>,
    ) -> Result<(), (String, PortError)> {
        let open = Arc::new(AtomicBool::new(true));
        let reader = LineReader::new(reader_port, open.clone(), self.events_tx.clone())
            .spawn()
            .map_err(|e| (selection.port.clone(), PortError::Io(e)))?;

        info!(port = %selection.port, baud = %selection.baud, "connected");
        self.connection = Some(Connection {
            selection,
            writer,
            open,
            reader: Some(reader),
            opened_at: Instant::now(),
        });
        Ok(())
    }

    /// Reopen `previous` after a failed reconnect. Returns it if that fails.
    fn restore(&mut self, previous: PortSelection) -> Option<PortSelection> {
        let restored = self
            .open_handles(&previous)
            .and_then(|(writer, reader_port)| {
                self.start(previous.clone(), writer, reader_port)
                    .map_err(|(_, e)| e)
            });
        match restored {
            Ok(()) => {
                info!(port = %previous.port, baud = %previous.baud, "previous connection restored");
                None
            }
            Err(e) => {
                warn!(port = %previous.port, error = %e, "could not restore previous connection");
                Some(previous)
            }
        }
    }

    /// Send `text` followed by a newline.
    ///
    /// Returns the number of bytes written, or `None` when nothing is open.
    pub fn send(&mut self, text: &str) -> Result<Option<usize>, SendError> {
        let Some(conn) = self.connection.as_mut().filter(|c| c.is_open()) else {
            debug!("send ignored, no open connection");
            return Ok(None);
        };
        if !text.is_ascii() {
            return Err(SendError::NonAscii);
        }

        let mut payload = Vec::with_capacity(text.len() + 1);
        payload.extend_from_slice(text.as_bytes());
        payload.push(LINE_TERMINATOR);

        let written = conn.writer.write_all_bytes(&payload)?;
        debug!(port = %conn.selection.port, bytes = written, "sent line");
        Ok(Some(written))
    }

    /// Close the current connection, if any.
    pub fn close(&mut self) {
        if let Some(mut conn) = self.connection.take() {
            conn.close();
        }
    }

    /// Drop a connection whose reader stopped on its own.
    pub fn reap_closed(&mut self) -> Option<PortSelection> {
        if self.connection.as_ref().is_some_and(|c| !c.is_open()) {
            let conn = self.connection.take()?;
            let selection = conn.selection.clone();
            drop(conn);
            return Some(selection);
        }
        None
    }

    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.as_ref().is_some_and(Connection::is_open)
    }

    /// Events delivered so far, in order, without blocking.
    pub fn drain_events(&self) -> Vec<ReaderEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Wait up to `timeout` for the next event.
    pub fn next_event(&self, timeout: Duration) -> Option<ReaderEvent> {
        self.events_rx.recv_timeout(timeout).ok()
    }
}

impl Drop for ConnectionManager {
    fn drop(&mut self) {
        self.close();
    }
}
