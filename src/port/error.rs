//! Port-specific error types.
//!
//! Kept apart from the monitor-level errors so the serial layer can be
//! used and tested on its own.

use thiserror::Error;

/// Errors that can occur during serial port operations.
#[derive(Debug, Error)]
pub enum PortError {
    /// The specified serial port was not found on the system.
    #[error("Serial port not found: {0}")]
    NotFound(String),

    /// The OS refused access to the port.
    #[error("Permission denied opening {0}")]
    PermissionDenied(String),

    /// The port exists but another process holds it.
    #[error("Serial port busy: {0}")]
    Busy(String),

    /// An I/O error occurred during port operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Port configuration failed.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Operation timed out.
    #[error("Operation timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// A serialport-specific error occurred.
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),
}

impl PortError {
    /// Create a NotFound error from a port name.
    pub fn not_found(port_name: impl Into<String>) -> Self {
        Self::NotFound(port_name.into())
    }

    /// Create a Config error from a message.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a Timeout error from a duration.
    pub fn timeout(duration: std::time::Duration) -> Self {
        Self::Timeout(duration)
    }

    /// Classify an error from `serialport::SerialPortBuilder::open`.
    pub fn from_open(port_name: &str, err: serialport::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            serialport::ErrorKind::NoDevice => Self::not_found(port_name),
            serialport::ErrorKind::InvalidInput => Self::config(err.to_string()),
            serialport::ErrorKind::Io(ErrorKind::NotFound) => Self::not_found(port_name),
            serialport::ErrorKind::Io(ErrorKind::PermissionDenied) => {
                Self::PermissionDenied(port_name.to_string())
            }
            _ if err.description.to_lowercase().contains("busy") => {
                Self::Busy(port_name.to_string())
            }
            _ => Self::Serial(err),
        }
    }

    /// Whether a read failure only means "nothing arrived within the timeout".
    pub fn is_no_data(&self) -> bool {
        match self {
            Self::Timeout(_) => true,
            Self::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
                    | std::io::ErrorKind::Interrupted
            ),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PortError::not_found("/dev/ttyUSB0");
        assert_eq!(err.to_string(), "Serial port not found: /dev/ttyUSB0");

        let err = PortError::config("Invalid baud rate");
        assert_eq!(err.to_string(), "Configuration error: Invalid baud rate");

        let err = PortError::Busy("COM3".into());
        assert_eq!(err.to_string(), "Serial port busy: COM3");
    }

    #[test]
    fn test_timeout_error() {
        let duration = std::time::Duration::from_millis(500);
        let err = PortError::timeout(duration);
        assert!(err.to_string().contains("500ms"));
        assert!(err.is_no_data());
    }

    #[test]
    fn test_no_data_classification() {
        let timed_out = PortError::Io(std::io::Error::new(std::io::ErrorKind::TimedOut, "t"));
        assert!(timed_out.is_no_data());

        let would_block = PortError::Io(std::io::Error::new(std::io::ErrorKind::WouldBlock, "w"));
        assert!(would_block.is_no_data());

        let broken = PortError::Io(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "b"));
        assert!(!broken.is_no_data());
        assert!(!PortError::not_found("x").is_no_data());
    }

    #[test]
    fn test_from_open_no_device() {
        let err = serialport::Error::new(serialport::ErrorKind::NoDevice, "gone");
        assert!(matches!(
            PortError::from_open("COM9", err),
            PortError::NotFound(name) if name == "COM9"
        ));
    }

    #[test]
    fn test_from_open_permission_denied() {
        let err = serialport::Error::new(
            serialport::ErrorKind::Io(std::io::ErrorKind::PermissionDenied),
            "denied",
        );
        assert!(matches!(
            PortError::from_open("/dev/ttyS0", err),
            PortError::PermissionDenied(_)
        ));
    }

    #[test]
    fn test_from_open_busy() {
        let err = serialport::Error::new(serialport::ErrorKind::Unknown, "Device or resource busy");
        assert!(matches!(PortError::from_open("/dev/ttyS0", err), PortError::Busy(_)));
    }
}
