//! Helper service: configuration plus launch listener lifecycle
//!
//! [`HelperService`] is the single owner of the shared configuration and the
//! listener handle. The tray, the settings window and the headless CLI all
//! drive the helper through it.

pub mod autostart;
pub mod settings;

pub use settings::{SettingsError, SettingsForm, RESTRICTED_PORTS};

use crate::config::{ConfigStore, HelperConfig, SharedConfig, DEFAULT_PORT};
use crate::error::Result;
use crate::instance::LOCK_FILE_NAME;
use crate::player::{PlayerLocator, RegistryReader};
use crate::server::{is_port_in_use, AppState, LaunchService, Launcher, ProcessLauncher};
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{error, info};

/// Display name used for windows, tooltips and dialogs
pub const APP_DISPLAY_NAME: &str = "Open in VLC / MPC-HC Windows Helper";

/// Outcome of an accepted settings save
#[derive(Debug)]
pub struct SaveOutcome {
    /// Configuration now in effect
    pub config: HelperConfig,
    /// Background listener restart, present when the port changed
    pub restart: Option<JoinHandle<()>>,
}

/// Writes the login entry; swapped out in tests
pub type AutoStartFn = fn(bool) -> Result<()>;

/// Owns configuration and the launch listener
pub struct HelperService {
    config: SharedConfig,
    listener: Arc<Mutex<LaunchService>>,
    auto_start: AutoStartFn,
}

impl HelperService {
    /// Service spawning real player processes
    pub fn new(config: SharedConfig) -> Self {
        Self::with_launcher(config, Arc::new(ProcessLauncher))
    }

    /// Service with a custom launcher
    pub fn with_launcher(config: SharedConfig, launcher: Arc<dyn Launcher>) -> Self {
        let state = AppState::new(config.clone(), launcher);
        Self {
            config,
            listener: Arc::new(Mutex::new(LaunchService::new(state))),
            auto_start: autostart::set_auto_start,
        }
    }

    /// Replace the function that writes the login entry
    pub fn with_auto_start(mut self, auto_start: AutoStartFn) -> Self {
        self.auto_start = auto_start;
        self
    }

    /// Load configuration from `store` and build a service
    pub fn load(store: ConfigStore) -> Self {
        Self::new(SharedConfig::load(store))
    }

    /// Shared configuration
    pub fn config(&self) -> &SharedConfig {
        &self.config
    }

    /// Instance lock path, next to the configuration file
    pub fn lock_path(&self) -> PathBuf {
        self.config.store().folder().join(LOCK_FILE_NAME)
    }

    /// Fill empty player paths from known install locations and repair a zero port
    pub fn detect_missing_players<R: RegistryReader>(&self, locator: &PlayerLocator<R>) {
        let mut candidate = self.config.snapshot();
        let mut changed = locator.fill_missing(&mut candidate);
        if candidate.port == 0 {
            candidate.port = DEFAULT_PORT;
            changed = true;
        }

        if !changed {
            return;
        }

        if let Err(e) = self.config.update(|c| {
            c.mpc_path = candidate.mpc_path.clone();
            c.vlc_path = candidate.vlc_path.clone();
            c.port = candidate.port;
        }) {
            error!("Error saving config: {}", e);
        }
    }

    /// Configured port is currently bound by something else
    pub fn configured_port_in_use(&self) -> bool {
        let port = self.config.snapshot().port;
        self.listener_port() != Some(port) && is_port_in_use(port)
    }

    /// Start the listener on the configured port
    pub fn start_listener(&self) -> Result<()> {
        let port = self.config.snapshot().port;
        self.listener.lock().start(port)
    }

    /// Port the listener is bound to, if running
    pub fn listener_port(&self) -> Option<u16> {
        self.listener.lock().port()
    }

    /// Stop the listener and wait until its port is released
    pub fn stop_listener(&self) {
        self.listener.lock().stop();
    }

    /// Restart the listener on `port` without blocking the caller
    pub fn restart_listener_in_background(&self, port: u16) -> JoinHandle<()> {
        let listener = Arc::clone(&self.listener);
        thread::spawn(move || {
            if let Err(e) = listener.lock().restart(port) {
                error!("Failed to restart HTTP server on port {}: {}", port, e);
            }
        })
    }

    /// Register or unregister the login entry from the current configuration
    pub fn apply_auto_start(&self) {
        let enabled = self.config.snapshot().auto_start;
        if let Err(e) = (self.auto_start)(enabled) {
            error!("Error setting auto-start with Windows: {}", e);
        }
    }

    /// Validate and persist a settings form
    ///
    /// On rejection nothing changes. On success the configuration is saved,
    /// the auto-start entry updated, and the listener restarted in the
    /// background when the port changed.
    pub fn apply_settings(
        &self,
        form: &SettingsForm,
    ) -> std::result::Result<SaveOutcome, SettingsError> {
        let current = self.config.snapshot();
        let next = settings::validate(form, &current, is_port_in_use)?;

        let config = match self.config.update(|c| *c = next.clone()) {
            Ok(config) => config,
            Err(e) => {
                error!("Error saving config: {}", e);
                next
            }
        };
        self.apply_auto_start();

        let restart = (config.port != current.port).then(|| {
            info!("Port changed from {} to {}", current.port, config.port);
            self.restart_listener_in_background(config.port)
        });

        Ok(SaveOutcome { config, restart })
    }

    /// Stop the listener; used on quit
    pub fn shutdown(&self) {
        self.stop_listener();
    }
}
