//! Supported media players and install-path discovery

mod locator;
mod registry;

pub use locator::{InstallCandidate, PlayerLocator};
pub use registry::{Hive, RegistryReader, SystemRegistry};

use crate::config::HelperConfig;
use std::fmt;
use std::str::FromStr;

/// Media players the helper can launch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    /// Media Player Classic - Home Cinema
    Mpc,
    /// VideoLAN VLC
    Vlc,
}

impl Player {
    /// All supported players
    pub const ALL: [Player; 2] = [Player::Mpc, Player::Vlc];

    /// Human readable name
    pub fn display_name(self) -> &'static str {
        match self {
            Player::Mpc => "MPC-HC",
            Player::Vlc => "VLC",
        }
    }

    /// Configured executable path, `None` when unset
    pub fn configured_path(self, config: &HelperConfig) -> Option<&str> {
        let path = match self {
            Player::Mpc => config.mpc_path.as_str(),
            Player::Vlc => config.vlc_path.as_str(),
        };
        (!path.is_empty()).then_some(path)
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Player name outside `mpc`/`vlc`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported player '{0}'")]
pub struct UnknownPlayer(pub String);

impl FromStr for Player {
    type Err = UnknownPlayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "mpc" => Ok(Player::Mpc),
            "vlc" => Ok(Player::Vlc),
            _ => Err(UnknownPlayer(s.to_string())),
        }
    }
}
