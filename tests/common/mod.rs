//! Shared helpers for the integration tests.

#![allow(dead_code)]

use serial_line_monitor::connection::ConnectionManager;
use serial_line_monitor::port::{MockPortOpener, MockSerialPort};
use serial_line_monitor::reader::ReaderEvent;
use std::time::{Duration, Instant};

/// Read timeout used for mock connections; short so tests stay fast.
pub const MOCK_TIMEOUT: Duration = Duration::from_millis(5);

/// A manager that can only open the given mock ports.
pub fn mock_manager(ports: &[&MockSerialPort]) -> ConnectionManager {
    let opener = MockPortOpener::new(ports.iter().map(|p| (*p).clone()));
    ConnectionManager::with_opener(Box::new(opener), MOCK_TIMEOUT)
}

/// Collect reader events until `count` have arrived or `timeout` passes.
pub fn collect_events(
    manager: &ConnectionManager,
    count: usize,
    timeout: Duration,
) -> Vec<ReaderEvent> {
    let deadline = Instant::now() + timeout;
    let mut events = Vec::with_capacity(count);
    while events.len() < count {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            break;
        }
        match manager.next_event(remaining) {
            Some(event) => events.push(event),
            None => break,
        }
    }
    events
}

/// Just the line payloads out of a batch of events.
pub fn lines(events: &[ReaderEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            ReaderEvent::Line(line) => Some(line.clone()),
            _ => None,
        })
        .collect()
}
