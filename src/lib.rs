//! vlc-mpc-helper - Open in VLC / MPC-HC Windows Helper
//!
//! Background helper exposing a local HTTP endpoint that launches browser
//! media links in VLC or MPC-HC, with a system tray icon and settings window.

pub mod config;
pub mod error;
pub mod instance;
pub mod player;
pub mod server;
pub mod service;

#[cfg(all(windows, feature = "tray"))]
pub mod tray;

pub use error::{HelperError, Result};
pub use service::HelperService;

/// Library version, reported by `/status`
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
