//! Display/plot sink.
//!
//! Owns the scrollback log and the numeric series. Lives on the UI thread
//! and is fed one delivered line at a time, in delivery order.

use crate::error::ParseError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Prefix shown before every received line.
pub const RECEIVED_PREFIX: &str = "Received: ";

/// What `clear()` does to the numeric series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearBehavior {
    /// Keep the series and plot the reset line counter (always zero) as a new point.
    #[default]
    AppendZero,
    /// Empty the series along with the scrollback.
    ResetSeries,
}

/// One received line as shown in the scrollback.
#[derive(Debug, Clone, PartialEq)]
pub struct ScrollbackEntry {
    pub received_at: DateTime<Local>,
    /// The line exactly as delivered, terminator included.
    pub line: String,
}

impl ScrollbackEntry {
    pub fn display_text(&self) -> String {
        format!("{RECEIVED_PREFIX}{}", self.line)
    }
}

/// Parse a line as a decimal number, accepting `,` as the fractional separator.
///
/// Surrounding whitespace, including the line terminator, is ignored.
pub fn parse_sample(line: &str) -> Result<f64, ParseError> {
    line.replace(',', ".")
        .trim()
        .parse::<f64>()
        .map_err(|_| ParseError {
            line: line.to_string(),
        })
}

#[derive(Debug, Default)]
pub struct Sink {
    scrollback: Vec<ScrollbackEntry>,
    series: Vec<f64>,
    /// Lines received since the last clear.
    received_count: u64,
    clear_behavior: ClearBehavior,
}

impl Sink {
    pub fn new(clear_behavior: ClearBehavior) -> Self {
        Self {
            clear_behavior,
            ..Default::default()
        }
    }

    /// Record a delivered line.
    ///
    /// The line always goes to the scrollback. If it parses, the value is
    /// appended to the series and returned; otherwise the series is left
    /// alone and the parse error is logged and returned.
    pub fn on_line(&mut self, line: String) -> Result<f64, ParseError> {
        let parsed = parse_sample(&line);
        self.scrollback.push(ScrollbackEntry {
            received_at: Local::now(),
            line,
        });
        self.received_count += 1;

        match parsed {
            Ok(value) => {
                self.series.push(value);
                Ok(value)
            }
            Err(e) => {
                warn!(error = %e, "sample not plotted");
                Err(e)
            }
        }
    }

    /// Empty the scrollback and reset the line counter.
    pub fn clear(&mut self) {
        self.scrollback.clear();
        self.received_count = 0;
        match self.clear_behavior {
            ClearBehavior::AppendZero => self.series.push(self.received_count as f64),
            ClearBehavior::ResetSeries => self.series.clear(),
        }
        debug!(behavior = ?self.clear_behavior, samples = self.series.len(), "sink cleared");
    }

    pub fn scrollback(&self) -> &[ScrollbackEntry] {
        &self.scrollback
    }

    pub fn series(&self) -> &[f64] {
        &self.series
    }

    pub fn received_count(&self) -> u64 {
        self.received_count
    }

    pub fn clear_behavior(&self) -> ClearBehavior {
        self.clear_behavior
    }

    /// The whole series as chart points, x = arrival index.
    pub fn chart_points(&self) -> Vec<(f64, f64)> {
        self.series
            .iter()
            .enumerate()
            .filter(|(_, y)| y.is_finite())
            .map(|(i, y)| (i as f64, *y))
            .collect()
    }

    /// Min and max over the finite samples, or `None` if there are none.
    pub fn value_range(&self) -> Option<(f64, f64)> {
        self.series
            .iter()
            .copied()
            .filter(|v| v.is_finite())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }
}
