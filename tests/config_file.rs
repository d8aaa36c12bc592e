//! Loading a configuration file and applying it to the monitor.

use serial_line_monitor::config::{ConfigError, ConfigLoader, PlotMarker};
use serial_line_monitor::port::BaudRate;
use serial_line_monitor::sink::{ClearBehavior, Sink};
use serial_test::serial;
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
#[serial]
fn file_settings_drive_the_sink() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[serial]
default_port = "arduino"
default_baud = 115200

[serial.port_aliases]
arduino = "/dev/ttyACM0"

[plot]
clear_behavior = "reset_series"
marker = "dot"
"#
    )
    .unwrap();

    let config = ConfigLoader::load_from(file.path()).unwrap().into_config();
    assert_eq!(config.serial.default_baud, BaudRate::B115200);
    assert_eq!(config.serial.resolve_port("arduino"), "/dev/ttyACM0");
    assert_eq!(config.plot.marker, PlotMarker::Dot);

    let mut sink = Sink::new(config.plot.clear_behavior);
    assert_eq!(sink.clear_behavior(), ClearBehavior::ResetSeries);
    sink.on_line("1\n".into()).unwrap();
    sink.clear();
    assert!(sink.series().is_empty());
}

#[test]
#[serial]
fn unsupported_baud_in_file_is_rejected() {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "[serial]\ndefault_baud = 300").unwrap();

    let err = ConfigLoader::load_from(file.path()).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError(_)));
}

#[test]
#[serial]
fn explicit_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ConfigLoader::load_from(dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}
