//! Serial line monitor library.
//!
//! Opens a serial port, reads `\n`-terminated ASCII lines on a background
//! thread, keeps a scrollback of everything received and plots the lines
//! that parse as numbers.
//!
//! # Modules
//!
//! - `config`: TOML configuration with environment overrides
//! - `port`: serial port abstraction, real and mock
//! - `reader`: line framing and the background reader thread
//! - `connection`: connect, send and close
//! - `sink`: scrollback and numeric series
//! - `logging`: tracing subscriber setup
//! - `tui`: terminal UI (when the `tui` feature is enabled)

pub mod config;
pub mod connection;
pub mod error;
pub mod logging;
pub mod port;
pub mod reader;
pub mod sink;

#[cfg(feature = "tui")]
pub mod tui;

pub use config::{Config, ConfigError, ConfigLoader, ConfigResult};
pub use connection::{Connection, ConnectionManager};
pub use error::{ConnectError, DecodeError, MonitorError, MonitorResult, ParseError, SendError};
pub use port::{
    BaudRate, MockPortOpener, MockSerialPort, PortConfiguration, PortError, PortOpener,
    PortSelection, SerialPortAdapter, SyncSerialPort, SystemPortOpener,
};
pub use reader::{LineFramer, LineReader, ReaderEvent};
pub use sink::{parse_sample, ClearBehavior, ScrollbackEntry, Sink};
