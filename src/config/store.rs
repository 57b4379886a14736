//! Configuration file support

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Port the listener uses when none is configured
pub const DEFAULT_PORT: u16 = 26270;

/// Folder under the user's Documents that holds config and lock files
pub const APP_FOLDER_NAME: &str = "Open_In_VLC_MPC_Config";

/// Configuration file name inside the app folder
pub const CONFIG_FILE_NAME: &str = "helper_config.json";

/// Helper configuration persisted as JSON
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HelperConfig {
    /// Full path to the MPC-HC executable (empty = not configured)
    pub mpc_path: String,

    /// Full path to the VLC executable (empty = not configured)
    pub vlc_path: String,

    /// Port the launch listener binds
    pub port: u16,

    /// Register the helper to start at login
    pub auto_start: bool,
}

impl Default for HelperConfig {
    fn default() -> Self {
        Self {
            mpc_path: String::new(),
            vlc_path: String::new(),
            port: DEFAULT_PORT,
            auto_start: true,
        }
    }
}

impl HelperConfig {
    /// Build from a parsed JSON object, field by field
    ///
    /// A missing or malformed field takes its default; the other fields keep
    /// their stored values.
    pub fn from_document(document: &Map<String, Value>) -> Self {
        let defaults = Self::default();
        Self {
            mpc_path: field(document, "mpc_path", defaults.mpc_path),
            vlc_path: field(document, "vlc_path", defaults.vlc_path),
            port: field(document, "port", defaults.port),
            auto_start: field(document, "auto_start", defaults.auto_start),
        }
    }

    /// Both players have a path set
    pub fn players_configured(&self) -> bool {
        !self.mpc_path.is_empty() && !self.vlc_path.is_empty()
    }
}

fn field<T: DeserializeOwned>(document: &Map<String, Value>, key: &str, default: T) -> T {
    let Some(value) = document.get(key) else {
        return default;
    };

    match T::deserialize(value) {
        Ok(parsed) => parsed,
        Err(e) => {
            warn!("Invalid '{}' in config ({}), using default", key, e);
            default
        }
    }
}

/// Configuration error types
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading/writing config file
    #[error("Failed to access config file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Error parsing JSON
    #[error("Failed to parse config file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Error serializing config
    #[error("Failed to serialize config: {0}")]
    Serialize(#[source] serde_json::Error),
}

/// Reads and writes the configuration document at a fixed location
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl ConfigStore {
    /// Store backed by an explicit file
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at `<Documents>/Open_In_VLC_MPC_Config/helper_config.json`
    pub fn default_location() -> Self {
        Self::new(app_folder().join(CONFIG_FILE_NAME))
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Folder holding the config file; the instance lock lives here too
    pub fn folder(&self) -> PathBuf {
        self.path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Load configuration, falling back to defaults on any error
    pub fn load(&self) -> HelperConfig {
        if !self.path.exists() {
            debug!("Config file not found at {:?}, using defaults", self.path);
            return HelperConfig::default();
        }

        match self.try_load() {
            Ok(config) => {
                info!("Loaded config from {:?}", self.path);
                config
            }
            Err(e) => {
                error!("Error loading config: {}", e);
                HelperConfig::default()
            }
        }
    }

    /// Load configuration, surfacing read and parse errors
    pub fn try_load(&self) -> Result<HelperConfig, ConfigError> {
        let content = std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io {
            path: self.path.to_string_lossy().to_string(),
            source: e,
        })?;

        let parse_error = |e| ConfigError::Parse {
            path: self.path.to_string_lossy().to_string(),
            source: e,
        };
        let document: Map<String, Value> =
            serde_json::from_str(&content).map_err(parse_error)?;

        Ok(HelperConfig::from_document(&document))
    }

    /// Save configuration, replacing the file through a temporary sibling
    pub fn save(&self, config: &HelperConfig) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(config).map_err(ConfigError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                    path: parent.to_string_lossy().to_string(),
                    source: e,
                })?;
            }
        }

        let tmp_path = self.path.with_extension("json.tmp");
        std::fs::write(&tmp_path, content).map_err(|e| ConfigError::Io {
            path: tmp_path.to_string_lossy().to_string(),
            source: e,
        })?;
        std::fs::rename(&tmp_path, &self.path).map_err(|e| ConfigError::Io {
            path: self.path.to_string_lossy().to_string(),
            source: e,
        })?;

        info!("Configuration values saved.");
        Ok(())
    }
}

/// Per-user folder for helper state
///
/// Resolves to the Documents folder when the platform reports one, otherwise
/// `<home>/Documents`, otherwise the current directory.
pub fn app_folder() -> PathBuf {
    dirs::document_dir()
        .or_else(|| dirs::home_dir().map(|home| home.join("Documents")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_FOLDER_NAME)
}
