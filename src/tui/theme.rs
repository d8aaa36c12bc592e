//! Color themes.
//!
//! Each palette keeps the plot trace in a different hue from the received
//! text, so the chart reads apart from the scrollback above it.

use ratatui::style::Color;

#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,

    pub bg: Color,
    pub fg: Color,

    /// Received lines in the scrollback
    pub rx_color: Color,
    /// Chart trace
    pub plot_color: Color,
    /// Chart axes and labels, timestamps
    pub axis: Color,

    pub error_color: Color,
    pub success_color: Color,
    pub warning_color: Color,

    pub border: Color,
    /// Header, status bar and list selection background
    pub selection: Color,
    /// Placeholders and key hints
    pub inactive: Color,
    /// Focused borders and titles
    pub accent: Color,
}

impl Theme {
    pub const fn dark() -> Self {
        Self {
            name: "dark",
            bg: Color::Rgb(22, 24, 29),
            fg: Color::Rgb(220, 223, 228),
            rx_color: Color::Rgb(152, 195, 121),
            plot_color: Color::Rgb(255, 184, 76),
            axis: Color::Rgb(120, 128, 140),
            error_color: Color::Rgb(239, 96, 96),
            success_color: Color::Rgb(110, 200, 140),
            warning_color: Color::Rgb(229, 192, 123),
            border: Color::Rgb(62, 68, 81),
            selection: Color::Rgb(40, 44, 52),
            inactive: Color::Rgb(92, 99, 112),
            accent: Color::Rgb(97, 175, 239),
        }
    }

    pub const fn light() -> Self {
        Self {
            name: "light",
            bg: Color::Rgb(250, 250, 248),
            fg: Color::Rgb(40, 42, 46),
            rx_color: Color::Rgb(30, 110, 60),
            plot_color: Color::Rgb(200, 60, 20),
            axis: Color::Rgb(110, 114, 122),
            error_color: Color::Rgb(190, 20, 40),
            success_color: Color::Rgb(30, 130, 70),
            warning_color: Color::Rgb(170, 110, 0),
            border: Color::Rgb(190, 192, 198),
            selection: Color::Rgb(226, 228, 232),
            inactive: Color::Rgb(150, 153, 160),
            accent: Color::Rgb(20, 90, 200),
        }
    }

    /// Nord-inspired: frost blue text, aurora orange trace.
    pub const fn nord() -> Self {
        Self {
            name: "nord",
            bg: Color::Rgb(46, 52, 64),
            fg: Color::Rgb(229, 233, 240),
            rx_color: Color::Rgb(136, 192, 208),
            plot_color: Color::Rgb(208, 135, 112),
            axis: Color::Rgb(129, 161, 193),
            error_color: Color::Rgb(191, 97, 106),
            success_color: Color::Rgb(163, 190, 140),
            warning_color: Color::Rgb(235, 203, 139),
            border: Color::Rgb(76, 86, 106),
            selection: Color::Rgb(59, 66, 82),
            inactive: Color::Rgb(97, 110, 136),
            accent: Color::Rgb(180, 142, 173),
        }
    }

    /// Look up a theme, ignoring case.
    pub fn by_name(name: &str) -> Option<&'static Theme> {
        THEMES.iter().find(|t| t.name.eq_ignore_ascii_case(name))
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

pub static THEMES: &[Theme] = &[Theme::dark(), Theme::light(), Theme::nord()];
