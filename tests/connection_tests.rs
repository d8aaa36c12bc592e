//! Connection lifecycle against mock and absent devices.

mod common;

use common::{collect_events, lines, mock_manager};
use serial_line_monitor::connection::ConnectionManager;
use serial_line_monitor::error::SendError;
use serial_line_monitor::port::{BaudRate, MockSerialPort, PortError, PortSelection};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

#[test]
fn connecting_to_missing_port_fails() {
    let mut manager = ConnectionManager::new(Duration::from_millis(50));
    let err = manager
        .connect(PortSelection::new("COM-NONEXISTENT", BaudRate::B9600))
        .unwrap_err();

    assert_eq!(err.port, "COM-NONEXISTENT");
    assert!(err.to_string().starts_with("Failed to connect to COM-NONEXISTENT"));
    assert!(!manager.is_connected());
}

#[test]
fn send_without_connection_is_a_no_op() {
    let port = MockSerialPort::new("MOCK0");
    let mut manager = mock_manager(&[&port]);

    assert!(manager.send("hello").unwrap().is_none());
    assert!(port.written_bytes().is_empty());
}

#[test]
fn send_writes_text_and_newline() {
    let port = MockSerialPort::new("MOCK0");
    let mut manager = mock_manager(&[&port]);
    manager
        .connect(PortSelection::new("MOCK0", BaudRate::B115200))
        .unwrap();

    manager.send("SET 1").unwrap();
    manager.send("").unwrap();
    assert_eq!(port.written_bytes(), b"SET 1\n\n");
}

#[test]
fn write_failure_is_reported() {
    let port = MockSerialPort::new("MOCK0");
    port.set_write_error(Some(std::io::ErrorKind::BrokenPipe));
    let mut manager = mock_manager(&[&port]);
    manager
        .connect(PortSelection::new("MOCK0", BaudRate::B9600))
        .unwrap();

    let err = manager.send("x").unwrap_err();
    assert!(matches!(err, SendError::Port(PortError::Io(_))));
}

#[test]
fn reconnect_replaces_previous_connection() {
    let first = MockSerialPort::new("MOCK0");
    let second = MockSerialPort::new("MOCK1");
    let mut manager = mock_manager(&[&first, &second]);

    manager
        .connect(PortSelection::new("MOCK0", BaudRate::B9600))
        .unwrap();
    manager
        .connect(PortSelection::new("MOCK1", BaudRate::B38400))
        .unwrap();

    let selection = manager.connection().unwrap().selection().clone();
    assert_eq!(selection, PortSelection::new("MOCK1", BaudRate::B38400));

    // Only the new port feeds the reader now.
    first.enqueue_read(b"1\n");
    second.enqueue_read(b"2\n");
    let events = collect_events(&manager, 1, WAIT);
    assert_eq!(lines(&events), vec!["2\n"]);
    assert_eq!(first.available_bytes(), 2);
}

#[test]
fn close_stops_reader_and_is_repeatable() {
    let port = MockSerialPort::new("MOCK0");
    let mut manager = mock_manager(&[&port]);
    manager
        .connect(PortSelection::new("MOCK0", BaudRate::B9600))
        .unwrap();

    manager.close();
    manager.close();
    assert!(!manager.is_connected());

    port.enqueue_read(b"9\n");
    assert!(manager.next_event(Duration::from_millis(50)).is_none());
}

#[test]
fn list_ports_reports_mock_names() {
    let a = MockSerialPort::new("MOCK0");
    let b = MockSerialPort::new("MOCK1");
    let manager = mock_manager(&[&a, &b]);
    assert_eq!(manager.list_ports().unwrap(), vec!["MOCK0", "MOCK1"]);
}
