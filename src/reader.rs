//! Background line reader.
//!
//! Polls an open port with a bounded per-read timeout, splits the byte
//! stream on `\n` and hands each completed line to the UI thread over an
//! mpsc channel. One event per terminator, in arrival order. Bytes after the
//! last terminator are dropped when the connection closes.

use crate::error::DecodeError;
use crate::port::SerialPortAdapter;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

/// Line terminator on the wire.
pub const LINE_TERMINATOR: u8 = b'\n';

const READ_CHUNK: usize = 256;

/// Messages from the reader thread to the UI thread.
#[derive(Debug, Clone, PartialEq)]
pub enum ReaderEvent {
    /// A complete line, terminator included.
    Line(String),
    /// A completed line that was not ASCII. Reading continues.
    Undecodable(DecodeError),
    /// The device failed; the reader has stopped and the connection is closed.
    Disconnected { port: String, reason: String },
}

/// Splits a byte stream into `\n`-terminated lines.
///
/// Feeding bytes one at a time or in chunks of any size yields the same
/// lines.
#[derive(Debug, Default)]
pub struct LineFramer {
    buffer: Vec<u8>,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `data` and return every line it completes.
    pub fn feed(&mut self, mut data: &[u8]) -> Vec<Vec<u8>> {
        let mut lines = Vec::new();
        while let Some(pos) = memchr::memchr(LINE_TERMINATOR, data) {
            let (head, tail) = data.split_at(pos + 1);
            self.buffer.extend_from_slice(head);
            lines.push(std::mem::take(&mut self.buffer));
            data = tail;
        }
        self.buffer.extend_from_slice(data);
        lines
    }

    /// Bytes received since the last terminator.
    pub fn pending(&self) -> &[u8] {
        &self.buffer
    }
}

/// Decode one framed line as ASCII.
pub fn decode_line(bytes: Vec<u8>) -> Result<String, DecodeError> {
    DecodeError::check(&bytes)?;
    Ok(bytes.into_iter().map(char::from).collect())
}

/// Reads lines from a port until `open` is cleared or the device fails.
pub struct LineReader {
    port: Box<dyn SerialPortAdapter>,
    open: Arc<AtomicBool>,
    events: Sender<ReaderEvent>,
    framer: LineFramer,
}

impl LineReader {
    pub fn new(
        port: Box<dyn SerialPortAdapter>,
        open: Arc<AtomicBool>,
        events: Sender<ReaderEvent>,
    ) -> Self {
        Self {
            port,
            open,
            events,
            framer: LineFramer::new(),
        }
    }

    /// Run the read loop on a dedicated thread.
    pub fn spawn(self) -> std::io::Result<JoinHandle<()>> {
        let name = format!("line-reader:{}", self.port.name());
        thread::Builder::new().name(name).spawn(move || self.run())
    }

    /// Run the read loop on the current thread.
    pub fn run(mut self) {
        let port_name = self.port.name().to_string();
        info!(port = %port_name, "line reader started");

        let mut chunk = [0u8; READ_CHUNK];
        while self.open.load(Ordering::Acquire) {
            let n = match self.port.read_bytes(&mut chunk) {
                Ok(n) => n,
                Err(e) if e.is_no_data() => continue,
                Err(e) => {
                    warn!(port = %port_name, error = %e, "serial read failed, stopping reader");
                    // Queue the event first so it is drained before the connection is reaped.
                    let _ = self.events.send(ReaderEvent::Disconnected {
                        port: port_name.clone(),
                        reason: e.to_string(),
                    });
                    self.open.store(false, Ordering::Release);
                    break;
                }
            };

            for raw in self.framer.feed(&chunk[..n]) {
                let event = match decode_line(raw) {
                    Ok(line) => ReaderEvent::Line(line),
                    Err(e) => {
                        warn!(port = %port_name, error = %e, "dropping undecodable line");
                        ReaderEvent::Undecodable(e)
                    }
                };
                if self.events.send(event).is_err() {
                    debug!(port = %port_name, "event receiver gone, stopping reader");
                    return;
                }
            }
        }

        if !self.framer.pending().is_empty() {
            debug!(
                port = %port_name,
                discarded = self.framer.pending().len(),
                "discarding partial line at close"
            );
        }
        info!(port = %port_name, "line reader stopped");
    }
}
