//! UI rendering for the TUI.

use super::app::{App, FocusArea, Mode};
use crate::config::PlotMarker;
use crate::port::BaudRate;
use crate::sink::ScrollbackEntry;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{self, Stdout};

/// Set up the terminal for TUI rendering.
pub fn setup_terminal() -> io::Result<Terminal<CrosstermBackend<Stdout>>> {
    crossterm::terminal::enable_raw_mode()?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, crossterm::terminal::EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    Terminal::new(backend)
}

/// Restore the terminal to normal mode.
pub fn restore_terminal(mut terminal: Terminal<CrosstermBackend<Stdout>>) -> io::Result<()> {
    crossterm::terminal::disable_raw_mode()?;
    crossterm::execute!(
        terminal.backend_mut(),
        crossterm::terminal::LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;
    Ok(())
}

/// Render the entire UI.
pub fn render(app: &App, frame: &mut Frame) {
    let size = frame.area();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(10),   // Body
            Constraint::Length(3), // Input
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    render_header(app, frame, chunks[0]);
    render_body(app, frame, chunks[1]);
    render_input(app, frame, chunks[2]);
    render_status_bar(app, frame, chunks[3]);

    if app.mode == Mode::Help {
        render_help_overlay(app, frame, size);
    }
}

fn border_style(app: &App, focused: bool) -> Style {
    if focused {
        Style::default().fg(app.theme.accent)
    } else {
        Style::default().fg(app.theme.border)
    }
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let open = app.manager.connection().filter(|c| c.is_open());

    let port_info = match open {
        Some(conn) => conn.selection().to_string(),
        None => "Not connected".to_string(),
    };
    let (status, status_color) = match open {
        Some(_) => ("Connected", app.theme.success_color),
        None => ("Disconnected", app.theme.inactive),
    };

    let header = Line::from(vec![
        Span::styled(
            " Serial Monitor ",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" | "),
        Span::styled(port_info, Style::default().fg(app.theme.fg)),
        Span::raw(" | "),
        Span::styled(status, Style::default().fg(status_color)),
        Span::raw(" | "),
        Span::styled(app.uptime_string(), Style::default().fg(app.theme.fg)),
        Span::raw(" | "),
        Span::styled(
            format!("rx {}", app.sink.received_count()),
            Style::default().fg(app.theme.rx_color),
        ),
    ]);

    frame.render_widget(
        Paragraph::new(header).style(Style::default().bg(app.theme.selection)),
        area,
    );
}

fn render_body(app: &App, frame: &mut Frame, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(22), Constraint::Min(40)])
        .split(area);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(3),
            Constraint::Length(BaudRate::ALL.len() as u16 + 2),
        ])
        .split(columns[0]);

    let right = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(columns[1]);

    render_port_list(app, frame, left[0]);
    render_baud_list(app, frame, left[1]);
    render_scrollback(app, frame, right[0]);
    render_chart(app, frame, right[1]);
}

fn render_port_list(app: &App, frame: &mut Frame, area: Rect) {
    let connected = app
        .manager
        .connection()
        .filter(|c| c.is_open())
        .map(|c| c.selection().port.as_str());

    let items: Vec<ListItem> = if app.available_ports.is_empty() {
        vec![ListItem::new("  (none, r to refresh)")
            .style(Style::default().fg(app.theme.inactive))]
    } else {
        app.available_ports
            .iter()
            .enumerate()
            .map(|(i, port)| {
                let is_connected = connected == Some(port.as_str());
                let style = if i == app.selected_port {
                    Style::default()
                        .fg(app.theme.fg)
                        .bg(app.theme.selection)
                        .add_modifier(Modifier::BOLD)
                } else if is_connected {
                    Style::default().fg(app.theme.success_color)
                } else {
                    Style::default().fg(app.theme.fg)
                };

                let prefix = if is_connected {
                    "● "
                } else if i == app.selected_port {
                    "> "
                } else {
                    "  "
                };

                ListItem::new(format!("{}{}", prefix, port)).style(style)
            })
            .collect()
    };

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, app.focus == FocusArea::PortList))
            .title(" Ports "),
    );

    frame.render_widget(list, area);
}

fn render_baud_list(app: &App, frame: &mut Frame, area: Rect) {
    let items: Vec<ListItem> = BaudRate::ALL
        .iter()
        .map(|baud| {
            if *baud == app.baud {
                ListItem::new(format!("> {}", baud)).style(
                    Style::default()
                        .fg(app.theme.accent)
                        .add_modifier(Modifier::BOLD),
                )
            } else {
                ListItem::new(format!("  {}", baud)).style(Style::default().fg(app.theme.fg))
            }
        })
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, false))
            .title(" Baud (b/B) "),
    );

    frame.render_widget(list, area);
}

fn render_scrollback(app: &App, frame: &mut Frame, area: Rect) {
    let visible = area.height.saturating_sub(2) as usize;
    let entries = app.sink.scrollback();
    let end = entries.len().saturating_sub(app.scroll_offset);
    let start = end.saturating_sub(visible);

    let lines: Vec<Line> = entries[start..end]
        .iter()
        .map(|entry| format_entry(app, entry))
        .collect();

    let title = if app.scroll_offset > 0 {
        format!(" Received (-{}) ", app.scroll_offset)
    } else {
        " Received ".to_string()
    };

    let widget = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, app.focus == FocusArea::Scrollback))
            .title(title),
    );

    frame.render_widget(widget, area);
}

fn format_entry<'a>(app: &App, entry: &ScrollbackEntry) -> Line<'a> {
    let mut spans = Vec::with_capacity(2);
    if app.config.tui.show_timestamps {
        spans.push(Span::styled(
            entry.received_at.format("%H:%M:%S%.3f ").to_string(),
            Style::default().fg(app.theme.axis),
        ));
    }
    let text = entry.display_text();
    spans.push(Span::styled(
        text.trim_end_matches(['\r', '\n']).to_string(),
        Style::default().fg(app.theme.rx_color),
    ));
    Line::from(spans)
}

fn render_chart(app: &App, frame: &mut Frame, area: Rect) {
    let points = app.sink.chart_points();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style(app, false));

    let Some((lo, hi)) = app.sink.value_range() else {
        let placeholder = Paragraph::new("Waiting for numeric lines...")
            .style(Style::default().fg(app.theme.inactive))
            .block(block.title(" Plot "));
        frame.render_widget(placeholder, area);
        return;
    };

    // A flat series still needs a non-empty y range.
    let pad = ((hi - lo) * 0.05).max(0.5);
    let (y_min, y_max) = (lo - pad, hi + pad);
    let x_max = (app.sink.series().len().saturating_sub(1) as f64).max(1.0);
    let latest = app.sink.series().last().copied().unwrap_or_default();

    let marker = match app.config.plot.marker {
        PlotMarker::Braille => symbols::Marker::Braille,
        PlotMarker::Dot => symbols::Marker::Dot,
    };

    let dataset = Dataset::default()
        .marker(marker)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(app.theme.plot_color))
        .data(&points);

    let chart = Chart::new(vec![dataset])
        .block(block.title(format!(
            " Plot  {} samples  last {:.2} ",
            app.sink.series().len(),
            latest
        )))
        .x_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.axis))
                .bounds([0.0, x_max])
                .labels(vec![Line::from("0"), Line::from(format!("{}", x_max as u64))]),
        )
        .y_axis(
            Axis::default()
                .style(Style::default().fg(app.theme.axis))
                .bounds([y_min, y_max])
                .labels(vec![
                    Line::from(format!("{lo:.2}")),
                    Line::from(format!("{hi:.2}")),
                ]),
        );

    frame.render_widget(chart, area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let is_focused = app.focus == FocusArea::Input || app.mode == Mode::Insert;

    let mode_indicator = match app.mode {
        Mode::Normal => "[NORMAL]",
        Mode::Insert => "[INSERT]",
        Mode::Command => "[COMMAND]",
        Mode::Help => "",
    };

    let input_content = if app.mode == Mode::Command {
        format!(":{}", app.input)
    } else {
        app.input.clone()
    };

    let input_widget = Paragraph::new(input_content).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style(app, is_focused))
            .title(format!(" Send {} ", mode_indicator)),
    );

    frame.render_widget(input_widget, area);

    if matches!(app.mode, Mode::Insert | Mode::Command) {
        frame.set_cursor_position(input_cursor(area, app.mode, app.cursor_pos));
    }
}

/// Cursor cell for the input box, kept inside its borders.
fn input_cursor(area: Rect, mode: Mode, cursor_pos: usize) -> (u16, u16) {
    let prompt = u16::from(mode == Mode::Command);
    let column = u16::try_from(cursor_pos)
        .unwrap_or(u16::MAX)
        .min(area.width.saturating_sub(3 + prompt));
    (
        area.x.saturating_add(1 + prompt).saturating_add(column),
        area.y.saturating_add(1),
    )
}

fn render_status_bar(app: &App, frame: &mut Frame, area: Rect) {
    let status_text = app.status_message.as_deref().unwrap_or("Ready");
    let status_color = if status_text.starts_with("Failed") || status_text.starts_with("Disconnected from") {
        app.theme.error_color
    } else {
        app.theme.fg
    };

    let mut spans = vec![Span::styled(
        format!(" {} ", status_text),
        Style::default().fg(status_color),
    )];
    if app.parse_failures + app.decode_failures > 0 {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            format!(
                "skipped {} non-numeric, {} undecodable",
                app.parse_failures, app.decode_failures
            ),
            Style::default().fg(app.theme.warning_color),
        ));
    }
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        "q:quit  c:connect  i:send  Ctrl+L:clear  F1:help",
        Style::default().fg(app.theme.inactive),
    ));

    frame.render_widget(
        Paragraph::new(Line::from(spans)).style(Style::default().bg(app.theme.selection)),
        area,
    );
}

fn render_help_overlay(app: &App, frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 70, area);

    frame.render_widget(Clear, popup_area);

    let help_text = vec![
        Line::from(Span::styled(
            "Keybindings",
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from("Normal Mode:"),
        Line::from("  q          - Quit"),
        Line::from("  j/k        - Select port / scroll"),
        Line::from("  b / B      - Next / previous baud rate"),
        Line::from("  c, Enter   - Connect to selected port"),
        Line::from("  d          - Disconnect"),
        Line::from("  r          - Refresh port list"),
        Line::from("  i          - Type a line to send"),
        Line::from("  Ctrl+L     - Clear scrollback"),
        Line::from("  Tab        - Cycle focus"),
        Line::from("  PgUp/PgDn  - Scroll received lines"),
        Line::from("  F1 / ?     - Show help"),
        Line::from(""),
        Line::from("Insert Mode:"),
        Line::from("  Enter      - Send line"),
        Line::from("  Up/Down    - History"),
        Line::from("  Esc        - Back to normal"),
        Line::from(""),
        Line::from("Commands (:)"),
        Line::from("  :connect [port]  :disconnect  :baud <rate>"),
        Line::from("  :clear  :refresh  :help  :quit"),
        Line::from(""),
        Line::from(Span::styled(
            "Press Esc or F1 to close",
            Style::default().fg(app.theme.inactive),
        )),
    ];

    let help_widget = Paragraph::new(help_text)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.accent))
                .title(" Help ")
                .style(Style::default().bg(app.theme.bg)),
        )
        .wrap(Wrap { trim: false });

    frame.render_widget(help_widget, popup_area);
}

/// Create a centered rectangle with the given percentage of the parent area.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
