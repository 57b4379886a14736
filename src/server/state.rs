use std::sync::Arc;

use crate::config::SharedConfig;
use crate::server::launcher::Launcher;

/// State injected into route handlers via axum::extract::State.
/// Handlers only read the configuration; writes belong to the settings path.
#[derive(Clone)]
pub struct AppState {
    pub config: SharedConfig,
    pub launcher: Arc<dyn Launcher>,
}

impl AppState {
    pub fn new(config: SharedConfig, launcher: Arc<dyn Launcher>) -> Self {
        Self { config, launcher }
    }
}
