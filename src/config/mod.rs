//! Command line and persisted configuration

mod args;
mod shared;
mod store;

pub use args::{Args, Command};
pub use shared::SharedConfig;
pub use store::{
    app_folder, ConfigError, ConfigStore, HelperConfig, APP_FOLDER_NAME, CONFIG_FILE_NAME,
    DEFAULT_PORT,
};
