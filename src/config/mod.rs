//! Configuration module.
//!
//! TOML-based configuration with environment variable overrides.
//!
//! # Configuration Resolution
//!
//! 1. `--config <path>` on the command line
//! 2. `SERIAL_MONITOR_CONFIG` environment variable (explicit path)
//! 3. `./serial-monitor.toml` (current directory)
//! 4. `<platform config dir>/serial-monitor/config.toml`
//! 5. Built-in defaults (no file required)
//!
//! # Environment Overrides
//!
//! The pattern is `SERIAL_MONITOR_<SECTION>_<KEY>`:
//! - `SERIAL_MONITOR_SERIAL_DEFAULT_PORT=/dev/ttyUSB0`
//! - `SERIAL_MONITOR_SERIAL_DEFAULT_BAUD=115200`
//! - `SERIAL_MONITOR_SERIAL_READ_TIMEOUT_MS=500`
//! - `SERIAL_MONITOR_TUI_THEME=nord`
//! - `SERIAL_MONITOR_LOGGING_LEVEL=debug`
//!
//! # Example
//!
//! ```toml
//! [serial]
//! default_port = "arduino"
//! default_baud = 115200
//!
//! [serial.port_aliases]
//! arduino = "/dev/ttyACM0"
//!
//! [plot]
//! clear_behavior = "reset_series"
//! ```

mod error;
mod loader;
mod schema;

pub use error::{ConfigError, ConfigResult};
pub use loader::{
    get_default_config_dir, get_default_config_path, resolve_config_path, ConfigLoader,
};
pub use schema::{Config, LogFormat, LoggingConfig, PlotConfig, PlotMarker, SerialConfig, TuiConfig};
