//! TUI module: Terminal User Interface using Ratatui.
//!
//! A single screen with:
//! - Seven habit sliders
//! - The prediction result and advice

mod app;
mod styles;
mod ui;

pub use app::App;
pub use styles::FocusTheme;
