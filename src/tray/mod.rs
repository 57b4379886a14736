//! System tray front end
//!
//! Tray icon with a small menu, a native settings window, and the startup
//! flow that resolves port conflicts before the listener starts.

mod app;
mod dialog;
mod icon;
mod menu;
mod settings_window;

pub use app::TrayApp;
pub use dialog::show_error;
pub use settings_window::{SettingsSlot, SettingsWindow};
