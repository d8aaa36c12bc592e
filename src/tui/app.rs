//! TUI application state and main loop.

use crate::config::Config;
use crate::connection::ConnectionManager;
use crate::port::{BaudRate, PortSelection};
use crate::reader::ReaderEvent;
use crate::sink::Sink;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::io;
use tracing::{info, warn};

use super::event::{Event, EventHandler};
use super::theme::Theme;
use super::ui;

/// Number of lines PageUp/PageDown moves the scrollback.
const PAGE: usize = 10;

/// Input history kept for Up/Down recall.
const HISTORY_SIZE: usize = 100;

/// Application mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    /// Navigation and shortcuts
    #[default]
    Normal,
    /// Typing a line to send
    Insert,
    /// vim-like `:` commands
    Command,
    /// Help overlay
    Help,
}

/// Focus area in the UI.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FocusArea {
    #[default]
    PortList,
    Scrollback,
    Input,
}

/// Application run state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Running,
    Quitting,
}

/// Main TUI application.
pub struct App {
    pub state: AppState,
    pub mode: Mode,
    pub theme: Theme,
    pub focus: FocusArea,
    pub config: Config,

    pub manager: ConnectionManager,
    pub sink: Sink,

    /// Current input text
    pub input: String,
    /// Cursor position in input, in characters
    pub cursor_pos: usize,
    pub history: Vec<String>,
    /// Current history index (for up/down navigation)
    pub history_index: Option<usize>,

    pub available_ports: Vec<String>,
    pub selected_port: usize,
    pub baud: BaudRate,

    pub status_message: Option<String>,

    /// Lines scrolled back from the newest entry
    pub scroll_offset: usize,

    pub parse_failures: u64,
    pub decode_failures: u64,
}

impl App {
    /// Create the application and enumerate ports once.
    pub fn new(config: Config, manager: ConnectionManager) -> Self {
        let theme = Theme::by_name(&config.tui.theme)
            .cloned()
            .unwrap_or_default();
        let sink = Sink::new(config.plot.clear_behavior);
        let baud = config.serial.default_baud;

        let mut app = Self {
            state: AppState::Running,
            mode: Mode::Normal,
            theme,
            focus: FocusArea::PortList,
            config,
            manager,
            sink,
            input: String::new(),
            cursor_pos: 0,
            history: Vec::new(),
            history_index: None,
            available_ports: Vec::new(),
            selected_port: 0,
            baud,
            status_message: None,
            scroll_offset: 0,
            parse_failures: 0,
            decode_failures: 0,
        };
        app.refresh_ports();

        if let Some(default_port) = app.config.serial.default_port.clone() {
            let resolved = app.config.serial.resolve_port(&default_port);
            if let Some(idx) = app.available_ports.iter().position(|p| *p == resolved) {
                app.selected_port = idx;
            }
        }
        app
    }

    /// Run the application main loop.
    pub fn run(&mut self) -> io::Result<()> {
        let mut terminal = ui::setup_terminal()?;
        let events = EventHandler::new(self.config.tui.refresh_interval());

        while self.state == AppState::Running {
            terminal.draw(|frame| ui::render(self, frame))?;

            match events.next() {
                Ok(Event::Tick) => self.on_tick(),
                Ok(Event::Key(key)) => self.handle_key(key),
                Ok(Event::Resize(_, _)) => {}
                Ok(Event::Error(err)) => {
                    warn!(error = %err, "terminal input error");
                    self.status_message = Some(format!("Error: {}", err));
                }
                Err(_) => self.state = AppState::Quitting,
            }
        }

        self.manager.close();
        ui::restore_terminal(terminal)?;
        Ok(())
    }

    /// Deliver everything the reader produced since the last tick.
    pub fn on_tick(&mut self) {
        for event in self.manager.drain_events() {
            match event {
                ReaderEvent::Line(line) => {
                    if self.sink.on_line(line).is_err() {
                        self.parse_failures += 1;
                    }
                    if self.scroll_offset > 0 {
                        // Keep the same lines in view while scrolled back.
                        self.scroll_offset += 1;
                    }
                }
                ReaderEvent::Undecodable(e) => {
                    self.decode_failures += 1;
                    self.status_message = Some(e.to_string());
                }
                ReaderEvent::Disconnected { port, reason } => {
                    self.status_message = Some(format!("Disconnected from {}: {}", port, reason));
                }
            }
        }
        self.manager.reap_closed();
    }

    /// Handle keyboard input.
    pub fn handle_key(&mut self, key: KeyEvent) {
        match self.mode {
            Mode::Normal => self.handle_normal_key(key),
            Mode::Insert => self.handle_insert_key(key),
            Mode::Command => self.handle_command_key(key),
            Mode::Help => self.handle_help_key(key),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.state = AppState::Quitting,
            KeyCode::Char('l') if key.modifiers.contains(KeyModifiers::CONTROL) => self.clear(),
            KeyCode::Char('i') => {
                self.mode = Mode::Insert;
                self.focus = FocusArea::Input;
            }
            KeyCode::Char(':') => {
                self.mode = Mode::Command;
                self.input.clear();
                self.cursor_pos = 0;
            }
            KeyCode::F(1) | KeyCode::Char('?') => self.mode = Mode::Help,
            KeyCode::Tab => self.cycle_focus(),
            KeyCode::Char('b') => self.baud = self.baud.next(),
            KeyCode::Char('B') => self.baud = self.baud.previous(),
            KeyCode::Char('c') => self.connect_selected_port(),
            KeyCode::Char('d') => self.disconnect(),
            KeyCode::Char('r') => self.refresh_ports(),
            KeyCode::Enter => match self.focus {
                FocusArea::PortList => self.connect_selected_port(),
                _ => {
                    self.mode = Mode::Insert;
                    self.focus = FocusArea::Input;
                }
            },
            KeyCode::Char('j') | KeyCode::Down => match self.focus {
                FocusArea::PortList => self.move_selection_down(),
                _ => self.scroll_down(1),
            },
            KeyCode::Char('k') | KeyCode::Up => match self.focus {
                FocusArea::PortList => self.move_selection_up(),
                _ => self.scroll_up(1),
            },
            KeyCode::PageUp => self.scroll_up(PAGE),
            KeyCode::PageDown => self.scroll_down(PAGE),
            KeyCode::End => self.scroll_offset = 0,
            _ => {}
        }
    }

    fn handle_insert_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.focus = FocusArea::PortList;
            }
            KeyCode::Enter => self.send_input(),
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    self.cursor_pos -= 1;
                    let at = self.input_byte_index();
                    self.input.remove(at);
                }
            }
            KeyCode::Delete => {
                if self.cursor_pos < self.input.chars().count() {
                    let at = self.input_byte_index();
                    self.input.remove(at);
                }
            }
            KeyCode::Left => self.cursor_pos = self.cursor_pos.saturating_sub(1),
            KeyCode::Right => {
                self.cursor_pos = (self.cursor_pos + 1).min(self.input.chars().count());
            }
            KeyCode::Home => self.cursor_pos = 0,
            KeyCode::End => self.cursor_pos = self.input.chars().count(),
            KeyCode::Up => self.history_previous(),
            KeyCode::Down => self.history_next(),
            KeyCode::Char(c) => self.insert_char(c),
            _ => {}
        }
    }

    fn handle_command_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.mode = Mode::Normal;
                self.input.clear();
                self.cursor_pos = 0;
            }
            KeyCode::Enter => {
                self.mode = Mode::Normal;
                self.execute_command();
            }
            KeyCode::Backspace => {
                if self.cursor_pos > 0 {
                    self.cursor_pos -= 1;
                    let at = self.input_byte_index();
                    self.input.remove(at);
                }
                if self.input.is_empty() {
                    self.mode = Mode::Normal;
                }
            }
            KeyCode::Char(c) => self.insert_char(c),
            _ => {}
        }
    }

    fn handle_help_key(&mut self, key: KeyEvent) {
        if matches!(key.code, KeyCode::Esc | KeyCode::F(1) | KeyCode::Char('q')) {
            self.mode = Mode::Normal;
        }
    }

    fn input_byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    fn insert_char(&mut self, c: char) {
        let at = self.input_byte_index();
        self.input.insert(at, c);
        self.cursor_pos += 1;
    }

    fn cycle_focus(&mut self) {
        self.focus = match self.focus {
            FocusArea::PortList => FocusArea::Scrollback,
            FocusArea::Scrollback => FocusArea::Input,
            FocusArea::Input => FocusArea::PortList,
        };
    }

    fn move_selection_up(&mut self) {
        self.selected_port = self.selected_port.saturating_sub(1);
    }

    fn move_selection_down(&mut self) {
        if self.selected_port < self.available_ports.len().saturating_sub(1) {
            self.selected_port += 1;
        }
    }

    fn scroll_up(&mut self, lines: usize) {
        let max = self.sink.scrollback().len().saturating_sub(1);
        self.scroll_offset = (self.scroll_offset + lines).min(max);
    }

    fn scroll_down(&mut self, lines: usize) {
        self.scroll_offset = self.scroll_offset.saturating_sub(lines);
    }

    fn history_previous(&mut self) {
        if self.history.is_empty() {
            return;
        }

        let idx = match self.history_index {
            None => self.history.len() - 1,
            Some(i) => i.saturating_sub(1),
        };
        self.input = self.history[idx].clone();
        self.cursor_pos = self.input.chars().count();
        self.history_index = Some(idx);
    }

    fn history_next(&mut self) {
        if let Some(idx) = self.history_index {
            if idx + 1 >= self.history.len() {
                self.input.clear();
                self.cursor_pos = 0;
                self.history_index = None;
            } else {
                self.history_index = Some(idx + 1);
                self.input = self.history[idx + 1].clone();
                self.cursor_pos = self.input.chars().count();
            }
        }
    }

    /// Send the current input as one line. Without a connection nothing happens.
    pub fn send_input(&mut self) {
        let text = self.input.clone();
        match self.manager.send(&text) {
            Ok(Some(_)) => {
                if self.history.last() != Some(&text) {
                    self.history.push(text.clone());
                    if self.history.len() > HISTORY_SIZE {
                        self.history.remove(0);
                    }
                }
                self.history_index = None;
                self.input.clear();
                self.cursor_pos = 0;
                self.status_message = Some(format!("Sent: {}", text));
            }
            Ok(None) => {}
            Err(e) => {
                warn!(error = %e, "send failed");
                self.status_message = Some(format!("Send failed: {}", e));
            }
        }
    }

    /// Empty the scrollback and apply the configured series reset.
    pub fn clear(&mut self) {
        self.sink.clear();
        self.scroll_offset = 0;
    }

    fn execute_command(&mut self) {
        let line = std::mem::take(&mut self.input);
        self.cursor_pos = 0;
        let mut parts = line.split_whitespace();
        let cmd = parts.next().unwrap_or_default().to_lowercase();
        let arg = parts.next();

        match (cmd.as_str(), arg) {
            ("q" | "quit", _) => self.state = AppState::Quitting,
            ("clear", _) => self.clear(),
            ("help", _) => self.mode = Mode::Help,
            ("refresh", _) => self.refresh_ports(),
            ("disconnect", _) => self.disconnect(),
            ("connect", None) => self.connect_selected_port(),
            ("connect", Some(name)) => self.connect_to(name),
            ("baud", Some(value)) => match value.parse::<u32>().map(BaudRate::try_from) {
                Ok(Ok(baud)) => self.baud = baud,
                _ => self.status_message = Some(format!("Unsupported baud rate: {}", value)),
            },
            ("", _) => {}
            _ => self.status_message = Some(format!("Unknown command: {}", line.trim())),
        }
    }

    /// Re-enumerate the serial ports.
    pub fn refresh_ports(&mut self) {
        match self.manager.list_ports() {
            Ok(ports) => {
                self.available_ports = ports;
                if self.selected_port >= self.available_ports.len() {
                    self.selected_port = self.available_ports.len().saturating_sub(1);
                }
            }
            Err(e) => {
                warn!(error = %e, "port enumeration failed");
                self.status_message = Some(format!("Failed to list ports: {}", e));
            }
        }
    }

    /// Connect to the port highlighted in the list.
    pub fn connect_selected_port(&mut self) {
        match self.available_ports.get(self.selected_port).cloned() {
            Some(port) => self.connect_to(&port),
            None => self.status_message = Some("No ports available".to_string()),
        }
    }

    /// Connect to `name` (or the port it aliases) at the selected baud rate.
    pub fn connect_to(&mut self, name: &str) {
        let port = self.config.serial.resolve_port(name);
        let selection = PortSelection::new(port.clone(), self.baud);
        match self.manager.connect(selection) {
            Ok(()) => {
                self.status_message = Some(format!(
                    "Connected to {} with Baudrate {}",
                    port, self.baud
                ));
            }
            Err(e) => {
                warn!(error = %e, "connect failed");
                let mut status = format!("Failed to connect: {}", e.source);
                if let Some(previous) = &e.previous_closed {
                    status.push_str(&format!(" (previous connection {} closed)", previous));
                }
                self.status_message = Some(status);
            }
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(conn) = self.manager.connection() {
            let port = conn.selection().port.clone();
            self.manager.close();
            info!(port = %port, "disconnected by user");
            self.status_message = Some(format!("Disconnected from {}", port));
        }
    }

    /// Time since the current connection was opened, as HH:MM:SS.
    pub fn uptime_string(&self) -> String {
        match self.manager.connection().filter(|c| c.is_open()) {
            Some(conn) => {
                let secs = conn.opened_at().elapsed().as_secs();
                format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
            }
            None => "--:--:--".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::port::{MockPortOpener, MockSerialPort};
    use std::time::{Duration, Instant};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn app_with(mock: &MockSerialPort) -> App {
        let manager = ConnectionManager::with_opener(
            Box::new(MockPortOpener::new([mock.clone()])),
            Duration::from_millis(5),
        );
        App::new(Config::default(), manager)
    }

    /// Tick until `done` holds or two seconds pass.
    fn tick_until(app: &mut App, done: impl Fn(&App) -> bool) {
        let deadline = Instant::now() + Duration::from_secs(2);
        while !done(app) && Instant::now() < deadline {
            app.on_tick();
            std::thread::sleep(Duration::from_millis(5));
        }
    }

    #[test]
    fn test_ports_enumerated_at_startup() {
        let app = app_with(&MockSerialPort::new("MOCK0"));
        assert_eq!(app.available_ports, vec!["MOCK0"]);
        assert_eq!(app.baud, BaudRate::B9600);
    }

    #[test]
    fn test_connect_and_plot_lines() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.manager.is_connected());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Connected to MOCK0 with Baudrate 9600")
        );

        mock.enqueue_read(b"+23,50\nabc\n-1.5\n");
        tick_until(&mut app, |a| a.sink.scrollback().len() == 3);

        assert_eq!(app.sink.series(), &[23.5, -1.5]);
        assert_eq!(app.parse_failures, 1);
        assert_eq!(app.sink.scrollback()[0].display_text(), "Received: +23,50\n");
    }

    #[test]
    fn test_connect_failure_reports_status() {
        let mut app = app_with(&MockSerialPort::new("MOCK0"));
        app.connect_to("COM-NONEXISTENT");
        assert!(!app.manager.is_connected());
        assert!(app
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Failed to connect:"));
    }

    #[test]
    fn test_lost_connection_named_in_status() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.connect_selected_port();

        mock.set_failing_opens(2);
        app.baud = BaudRate::B115200;
        app.connect_selected_port();

        assert!(app.manager.connection().is_none());
        assert_eq!(
            app.status_message.as_deref(),
            Some("Failed to connect: Serial port busy: MOCK0 (previous connection MOCK0 @ 9600 closed)")
        );
    }

    #[test]
    fn test_insert_mode_sends_line() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.connect_selected_port();

        app.handle_key(key(KeyCode::Char('i')));
        for c in "hello".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        app.handle_key(key(KeyCode::Enter));

        assert_eq!(mock.written_bytes(), b"hello\n");
        assert!(app.input.is_empty());
        assert_eq!(app.history, vec!["hello"]);
    }

    #[test]
    fn test_send_without_connection_keeps_input() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.input = "hello".into();
        app.send_input();
        assert_eq!(app.input, "hello");
        assert!(app.status_message.is_none());
        assert!(mock.get_write_log().is_empty());
    }

    #[test]
    fn test_ctrl_l_clears() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.sink.on_line("5\n".into()).unwrap();

        app.handle_key(KeyEvent::new(KeyCode::Char('l'), KeyModifiers::CONTROL));
        assert!(app.sink.scrollback().is_empty());
        assert_eq!(app.sink.series(), &[5.0, 0.0]);
    }

    #[test]
    fn test_baud_command_and_cycling() {
        let mut app = app_with(&MockSerialPort::new("MOCK0"));
        app.input = "baud 115200".into();
        app.execute_command();
        assert_eq!(app.baud, BaudRate::B115200);

        app.handle_key(key(KeyCode::Char('b')));
        assert_eq!(app.baud, BaudRate::B4800);

        app.input = "baud 300".into();
        app.execute_command();
        assert_eq!(app.baud, BaudRate::B4800);
        assert!(app.status_message.unwrap().contains("300"));
    }

    #[test]
    fn test_device_loss_is_reported() {
        let mock = MockSerialPort::new("MOCK0");
        let mut app = app_with(&mock);
        app.connect_selected_port();
        mock.enqueue_read(b"1\n");
        mock.set_disconnect_when_drained(true);

        tick_until(&mut app, |a| a.manager.connection().is_none());
        assert_eq!(app.sink.series(), &[1.0]);
        assert!(app
            .status_message
            .as_deref()
            .unwrap()
            .starts_with("Disconnected from MOCK0"));
    }

    #[test]
    fn test_history_recall() {
        let mut app = app_with(&MockSerialPort::new("MOCK0"));
        app.history = vec!["one".into(), "two".into()];
        app.mode = Mode::Insert;

        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input, "two");
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.input, "one");
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.input, "two");
        app.handle_key(key(KeyCode::Down));
        assert!(app.input.is_empty());
    }

    #[test]
    fn test_quit() {
        let mut app = app_with(&MockSerialPort::new("MOCK0"));
        app.handle_key(key(KeyCode::Char('q')));
        assert_eq!(app.state, AppState::Quitting);
    }
}
