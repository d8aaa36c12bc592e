//! Terminal user interface.
//!
//! One screen: port and baud pickers on the left, received lines above a
//! live plot of the numeric ones on the right, and a send line at the bottom.
//! Reader events are drained on every tick of the UI loop.

mod app;
mod event;
mod theme;
mod ui;

pub use app::{App, AppState, FocusArea, Mode};
pub use event::{Event, EventHandler};
pub use theme::{Theme, THEMES};
pub use ui::render;
