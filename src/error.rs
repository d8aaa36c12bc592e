//! Monitor-level error types.
//!
//! Every failure the monitor reports is local and non-fatal: it ends up on
//! the status bar or in the log, never as a crash.

use crate::config::ConfigError;
use crate::port::{PortError, PortSelection};
use thiserror::Error;

/// Opening a port failed. The previous connection, if any, is untouched.
#[derive(Debug, Error)]
#[error("Failed to connect to {port}: {source}")]
pub struct ConnectError {
    pub port: String,
    #[source]
    pub source: PortError,
    /// Set when the attempt released a connection that could not be reopened.
    pub previous_closed: Option<PortSelection>,
}

/// A received line is not a decimal number.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Could not convert {line:?} to a number")]
pub struct ParseError {
    pub line: String,
}

/// Received bytes are not ASCII text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Received {} bytes that are not ASCII (first bad byte 0x{bad_byte:02X} at offset {offset})", .bytes.len())]
pub struct DecodeError {
    pub bytes: Vec<u8>,
    pub offset: usize,
    pub bad_byte: u8,
}

impl DecodeError {
    /// Check that `bytes` is pure ASCII.
    pub fn check(bytes: &[u8]) -> Result<(), DecodeError> {
        match bytes.iter().position(|b| !b.is_ascii()) {
            None => Ok(()),
            Some(offset) => Err(DecodeError {
                bytes: bytes.to_vec(),
                offset,
                bad_byte: bytes[offset],
            }),
        }
    }
}

/// Sending a line to the port failed.
#[derive(Debug, Error)]
pub enum SendError {
    /// The text contains characters outside ASCII.
    #[error("Cannot send non-ASCII text")]
    NonAscii,

    /// The write itself failed.
    #[error("Write failed: {0}")]
    Port(#[from] PortError),
}

/// Top-level error for the binary.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error(transparent)]
    Port(#[from] PortError),

    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to initialise logging: {0}")]
    Logging(String),
}

pub type MonitorResult<T> = Result<T, MonitorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_check_accepts_ascii() {
        assert!(DecodeError::check(b"+23,50\r\n").is_ok());
        assert!(DecodeError::check(b"").is_ok());
    }

    #[test]
    fn test_decode_check_reports_first_bad_byte() {
        let err = DecodeError::check(b"ab\xC3\xA9\n").unwrap_err();
        assert_eq!(err.offset, 2);
        assert_eq!(err.bad_byte, 0xC3);
        assert_eq!(err.bytes.len(), 5);
        assert!(err.to_string().contains("0xC3"));
    }

    #[test]
    fn test_connect_error_display() {
        let err = ConnectError {
            port: "COM7".into(),
            source: PortError::not_found("COM7"),
            previous_closed: None,
        };
        assert_eq!(
            err.to_string(),
            "Failed to connect to COM7: Serial port not found: COM7"
        );
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError { line: "abc\n".into() };
        assert_eq!(err.to_string(), "Could not convert \"abc\\n\" to a number");
    }
}
