//! Port abstraction layer for serial communication.
//!
//! Traits and implementations for serial I/O, with a mock for tests.

pub mod error;
pub mod mock;
pub mod selection;
pub mod sync_port;
pub mod traits;

pub use error::PortError;
pub use mock::{MockPortOpener, MockSerialPort};
pub use selection::{BaudRate, PortSelection};
pub use sync_port::*;
pub use traits::*;
