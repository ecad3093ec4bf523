//! UI modules for the World Picker application.
//!
//! The UI is split into:
//! - Top bar: selection count, clear button and save status
//! - Central canvas: the interactive world map
//! - Notification window: load and save failures

mod canvas;
mod colors;
mod notification;
mod top_bar;

pub use canvas::{render_canvas, CanvasInput};
pub use notification::render_notification;
pub use top_bar::render_top_bar;
