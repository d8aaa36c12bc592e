//! Configuration schema definitions.
//!
//! Every section carries `#[serde(default)]`, so a config file only needs
//! the keys it wants to change.

use super::error::{ConfigError, ConfigResult};
use crate::port::BaudRate;
use crate::sink::ClearBehavior;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Longest accepted per-read timeout. Closing a connection waits up to this long.
pub const MAX_READ_TIMEOUT_MS: u64 = 5_000;

/// Root configuration structure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Serial port configuration
    pub serial: SerialConfig,
    /// Chart configuration
    pub plot: PlotConfig,
    /// TUI configuration
    pub tui: TuiConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Serial port configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SerialConfig {
    /// Port preselected in the port list
    pub default_port: Option<String>,
    /// Baud rate preselected in the baud selector
    pub default_baud: BaudRate,
    /// Per-read timeout in milliseconds
    pub read_timeout_ms: u64,
    /// Port aliases for convenience
    pub port_aliases: HashMap<String, String>,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            default_port: None,
            default_baud: BaudRate::B9600,
            read_timeout_ms: 1000,
            port_aliases: HashMap::new(),
        }
    }
}

impl Config {
    /// Check values that deserialize fine but cannot be used.
    pub fn validate(&self) -> ConfigResult<()> {
        self.serial.validate()
    }
}

impl SerialConfig {
    /// The reader polls with this timeout, so zero would spin and a large
    /// value would stall `close()`.
    pub fn validate(&self) -> ConfigResult<()> {
        if !(1..=MAX_READ_TIMEOUT_MS).contains(&self.read_timeout_ms) {
            return Err(ConfigError::validation(
                "serial.read_timeout_ms",
                format!(
                    "{} is outside 1..={}",
                    self.read_timeout_ms, MAX_READ_TIMEOUT_MS
                ),
            ));
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Resolve a port name through aliases
    pub fn resolve_port(&self, name: &str) -> String {
        self.port_aliases
            .get(name)
            .cloned()
            .unwrap_or_else(|| name.to_string())
    }
}

/// Chart configuration section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlotConfig {
    /// What the Clear action does to the plotted series
    pub clear_behavior: ClearBehavior,
    /// Point marker used by the chart
    pub marker: PlotMarker,
}

/// Chart point marker.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlotMarker {
    #[default]
    Braille,
    Dot,
}

/// TUI configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TuiConfig {
    /// Theme name: "dark", "light", "nord"
    pub theme: String,
    /// Refresh rate in Hz
    pub refresh_rate_hz: u32,
    /// Show local receive time next to each line
    pub show_timestamps: bool,
}

impl Default for TuiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            refresh_rate_hz: 30,
            show_timestamps: true,
        }
    }
}

impl TuiConfig {
    /// Get refresh interval as Duration
    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(1000 / u64::from(self.refresh_rate_hz.max(1)))
    }
}

/// Logging configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log file path. Without one, logs are discarded while the TUI runs.
    pub file: Option<PathBuf>,
    /// Filter directive used when `RUST_LOG` is unset
    pub level: String,
    /// Log format: "json", "pretty", "compact"
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: None,
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON format
    Json,
    /// Pretty format with colors
    #[default]
    Pretty,
    /// Compact format
    Compact,
}
