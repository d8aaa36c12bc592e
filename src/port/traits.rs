//! Core traits for serial port abstraction.
//!
//! `SerialPortAdapter` lets real ports and the in-crate mock be used
//! interchangeably; `PortOpener` is the seam the connection manager opens
//! ports through.

use super::error::PortError;
use super::selection::{BaudRate, PortSelection};
use std::time::Duration;

/// Read timeout used when none is configured.
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(1);

/// Parameters a port is opened with. Framing is always 8N1, no flow control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortConfiguration {
    /// Baud rate.
    pub baud_rate: BaudRate,

    /// Per-read timeout. A read that sees no byte within this window
    /// returns "no data" instead of blocking.
    pub timeout: Duration,
}

impl Default for PortConfiguration {
    fn default() -> Self {
        Self {
            baud_rate: BaudRate::default(),
            timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

/// Trait for serial port I/O operations.
pub trait SerialPortAdapter: Send + std::fmt::Debug {
    /// Write bytes to the serial port.
    ///
    /// Returns the number of bytes actually written.
    fn write_bytes(&mut self, data: &[u8]) -> Result<usize, PortError>;

    /// Read bytes from the serial port into the provided buffer.
    ///
    /// Returns the number of bytes actually read. `Ok(0)` and errors for
    /// which [`PortError::is_no_data`] holds both mean nothing arrived.
    fn read_bytes(&mut self, buffer: &mut [u8]) -> Result<usize, PortError>;

    /// Get the name/path of this serial port.
    fn name(&self) -> &str;

    /// Set the read/write timeout for this port.
    fn set_timeout(&mut self, timeout: Duration) -> Result<(), PortError>;

    /// Open a second handle onto the same device.
    ///
    /// One handle may read while the other writes from a different thread.
    fn try_clone_adapter(&self) -> Result<Box<dyn SerialPortAdapter>, PortError>;

    /// Write the whole buffer, looping over short writes.
    fn write_all_bytes(&mut self, mut data: &[u8]) -> Result<usize, PortError> {
        let total = data.len();
        while !data.is_empty() {
            match self.write_bytes(data)? {
                0 => {
                    return Err(PortError::Io(std::io::Error::new(
                        std::io::ErrorKind::WriteZero,
                        "serial port accepted no bytes",
                    )))
                }
                n => data = &data[n..],
            }
        }
        Ok(total)
    }
}

/// Opens ports by name. The system implementation goes through `serialport`;
/// tests substitute one that hands out mocks.
pub trait PortOpener: Send {
    /// Open `selection` with the given per-read timeout.
    fn open(
        &self,
        selection: &PortSelection,
        timeout: Duration,
    ) -> Result<Box<dyn SerialPortAdapter>, PortError>;

    /// Names of the ports currently present.
    fn available_ports(&self) -> Result<Vec<String>, PortError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::MockSerialPort;

    #[test]
    fn test_default_configuration() {
        let config = PortConfiguration::default();
        assert_eq!(config.baud_rate, BaudRate::B9600);
        assert_eq!(config.timeout, Duration::from_secs(1));
    }

    #[test]
    fn test_write_all_bytes_logs_whole_payload() {
        let mut port = MockSerialPort::new("MOCK0");
        let n = port.write_all_bytes(b"hello\n").unwrap();
        assert_eq!(n, 6);
        assert_eq!(port.written_bytes(), b"hello\n");
    }
}
