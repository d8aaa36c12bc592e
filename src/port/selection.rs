//! Port selection: which device to open and at what speed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::PortError;

/// Baud rates offered by the monitor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum BaudRate {
    B4800,
    B9600,
    B19200,
    B38400,
    B115200,
}

impl BaudRate {
    /// Every supported rate, slowest first.
    pub const ALL: [BaudRate; 5] = [
        BaudRate::B4800,
        BaudRate::B9600,
        BaudRate::B19200,
        BaudRate::B38400,
        BaudRate::B115200,
    ];

    /// Bits per second.
    pub const fn bps(self) -> u32 {
        match self {
            BaudRate::B4800 => 4800,
            BaudRate::B9600 => 9600,
            BaudRate::B19200 => 19200,
            BaudRate::B38400 => 38400,
            BaudRate::B115200 => 115200,
        }
    }

    /// Next faster rate, wrapping around to the slowest.
    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|b| *b == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    /// Next slower rate, wrapping around to the fastest.
    pub fn previous(self) -> Self {
        let idx = Self::ALL.iter().position(|b| *b == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl Default for BaudRate {
    fn default() -> Self {
        Self::B9600
    }
}

impl TryFrom<u32> for BaudRate {
    type Error = PortError;

    fn try_from(bps: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|b| b.bps() == bps)
            .ok_or_else(|| PortError::config(format!("unsupported baud rate {bps}")))
    }
}

impl From<BaudRate> for u32 {
    fn from(baud: BaudRate) -> Self {
        baud.bps()
    }
}

impl fmt::Display for BaudRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.bps())
    }
}

/// A port identifier paired with the baud rate to open it at.
///
/// Fixed for the lifetime of the connection it was used to open.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortSelection {
    pub port: String,
    pub baud: BaudRate,
}

impl PortSelection {
    pub fn new(port: impl Into<String>, baud: BaudRate) -> Self {
        Self {
            port: port.into(),
            baud,
        }
    }
}

impl fmt::Display for PortSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {}", self.port, self.baud)
    }
}
