//! Device bytes through the reader thread into the sink.

mod common;

use common::{collect_events, lines, mock_manager};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serial_line_monitor::connection::ConnectionManager;
use serial_line_monitor::port::{BaudRate, MockSerialPort, PortSelection, SerialPortAdapter};
use serial_line_monitor::reader::ReaderEvent;
use serial_line_monitor::sink::{ClearBehavior, Sink};
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(2);

fn connect(port: &MockSerialPort) -> ConnectionManager {
    let mut manager = mock_manager(&[port]);
    manager
        .connect(PortSelection::new(port.name(), BaudRate::B9600))
        .unwrap();
    manager
}

#[test]
fn numeric_line_reaches_scrollback_and_series() {
    let port = MockSerialPort::new("MOCK0");
    let manager = connect(&port);
    port.enqueue_read(b"+23,50\n");

    let events = collect_events(&manager, 1, WAIT);
    let mut sink = Sink::new(ClearBehavior::AppendZero);
    for line in lines(&events) {
        let _ = sink.on_line(line);
    }

    assert_eq!(sink.scrollback().len(), 1);
    assert_eq!(sink.scrollback()[0].display_text(), "Received: +23,50\n");
    assert_eq!(sink.series(), &[23.5]);
}

#[test]
fn non_numeric_line_only_in_scrollback() {
    let port = MockSerialPort::new("MOCK0");
    let manager = connect(&port);
    port.enqueue_read(b"1\nabc\n2\n");

    let events = collect_events(&manager, 3, WAIT);
    let mut sink = Sink::new(ClearBehavior::AppendZero);
    let parsed: Vec<bool> = lines(&events)
        .into_iter()
        .map(|line| sink.on_line(line).is_ok())
        .collect();

    assert_eq!(parsed, vec![true, false, true]);
    assert_eq!(sink.scrollback().len(), 3);
    assert_eq!(sink.series(), &[1.0, 2.0]);
}

#[test]
fn clear_appends_zero_after_stream() {
    let port = MockSerialPort::new("MOCK0");
    let manager = connect(&port);
    port.enqueue_read(b"5\n-1,25\n");

    let mut sink = Sink::new(ClearBehavior::AppendZero);
    for line in lines(&collect_events(&manager, 2, WAIT)) {
        sink.on_line(line).unwrap();
    }
    sink.clear();

    assert!(sink.scrollback().is_empty());
    assert_eq!(sink.series(), &[5.0, -1.25, 0.0]);
}

#[test]
fn lines_split_across_reads_are_reassembled() {
    let port = MockSerialPort::new("MOCK0");
    port.set_max_chunk(Some(3));
    let manager = connect(&port);
    port.enqueue_read(b"12.5\n-7\n100,75\n");

    let events = collect_events(&manager, 3, WAIT);
    assert_eq!(lines(&events), vec!["12.5\n", "-7\n", "100,75\n"]);
}

#[test]
fn undecodable_line_does_not_stop_reading() {
    let port = MockSerialPort::new("MOCK0");
    let manager = connect(&port);
    port.enqueue_read(b"\xFF\xFE\n3\n");

    let events = collect_events(&manager, 2, WAIT);
    assert!(matches!(events[0], ReaderEvent::Undecodable(_)));
    assert_eq!(events[1], ReaderEvent::Line("3\n".into()));
    assert!(manager.is_connected());
}

#[test]
fn trailing_partial_line_is_not_delivered() {
    let port = MockSerialPort::new("MOCK0");
    port.enqueue_read(b"1\n2");
    port.set_disconnect_when_drained(true);
    let manager = connect(&port);

    let events = collect_events(&manager, 2, WAIT);
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], ReaderEvent::Line("1\n".into()));
    assert!(matches!(events[1], ReaderEvent::Disconnected { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn one_delivery_per_terminator(
        payload in proptest::collection::vec(
            prop_oneof![Just(b'\n'), Just(b'\r'), any::<u8>()],
            0..200,
        ),
        chunk in 1usize..16,
    ) {
        let port = MockSerialPort::new("MOCK0");
        port.set_max_chunk(Some(chunk));
        port.enqueue_read(&payload);
        port.set_disconnect_when_drained(true);
        let manager = connect(&port);

        let frames: Vec<&[u8]> = payload.split_inclusive(|b| *b == b'\n')
            .filter(|frame| frame.ends_with(b"\n"))
            .collect();
        // Every frame plus the disconnect marker.
        let events = collect_events(&manager, frames.len() + 1, WAIT);
        let deliveries: Vec<&ReaderEvent> = events
            .iter()
            .filter(|e| !matches!(e, ReaderEvent::Disconnected { .. }))
            .collect();
        prop_assert_eq!(deliveries.len(), frames.len());
        prop_assert!(matches!(events.last(), Some(ReaderEvent::Disconnected { .. })), "last event must be Disconnected");

        for (event, frame) in deliveries.iter().zip(&frames) {
            match event {
                ReaderEvent::Line(line) => {
                    prop_assert!(frame.is_ascii());
                    prop_assert_eq!(line.as_bytes(), *frame);
                }
                ReaderEvent::Undecodable(e) => {
                    prop_assert!(!frame.is_ascii());
                    prop_assert_eq!(e.bytes.as_slice(), *frame);
                }
                ReaderEvent::Disconnected { .. } => unreachable!(),
            }
        }
    }
}
