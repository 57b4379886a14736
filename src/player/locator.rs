//! Player install-path detection

use crate::config::HelperConfig;
use crate::player::registry::{Hive, RegistryReader, SystemRegistry};
use crate::player::Player;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One place a player may be installed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallCandidate {
    /// Registry value holding a directory or full executable path
    Registry {
        hive: Hive,
        key: &'static str,
        value: &'static str,
        /// Executable to append when the value names a directory
        exe_name: Option<&'static str>,
    },
    /// Fixed filesystem location
    Path {
        path: &'static str,
        exe_name: Option<&'static str>,
    },
}

const VLC_KEY: &str = r"SOFTWARE\VideoLAN\VLC";
const VLC_KEY_WOW64: &str = r"SOFTWARE\WOW6432Node\VideoLAN\VLC";
const MPC_KEY: &str = r"SOFTWARE\MPC-HC\MPC-HC";
const MPC_KEY_WOW64: &str = r"SOFTWARE\WOW6432Node\MPC-HC\MPC-HC";

const VLC_CANDIDATES: &[InstallCandidate] = &[
    vlc_registry(Hive::CurrentUser, VLC_KEY),
    vlc_registry(Hive::CurrentUser, VLC_KEY_WOW64),
    vlc_registry(Hive::LocalMachine, VLC_KEY),
    vlc_registry(Hive::LocalMachine, VLC_KEY_WOW64),
    InstallCandidate::Path {
        path: r"C:\Program Files\VideoLAN\VLC",
        exe_name: Some("vlc.exe"),
    },
    InstallCandidate::Path {
        path: r"C:\Program Files (x86)\VideoLAN\VLC",
        exe_name: Some("vlc.exe"),
    },
];

const MPC_CANDIDATES: &[InstallCandidate] = &[
    mpc_registry(Hive::CurrentUser, MPC_KEY),
    mpc_registry(Hive::CurrentUser, MPC_KEY_WOW64),
    mpc_registry(Hive::LocalMachine, MPC_KEY),
    mpc_registry(Hive::LocalMachine, MPC_KEY_WOW64),
    mpc_exe(r"C:\Program Files\MPC-HC\mpc-hc64.exe"),
    mpc_exe(r"C:\Program Files (x86)\MPC-HC\mpc-hc.exe"),
    mpc_exe(r"C:\Program Files\Media Player Classic - Home Cinema\mpc-hc64.exe"),
    mpc_exe(r"C:\Program Files (x86)\Media Player Classic - Home Cinema\mpc-hc.exe"),
    mpc_exe(r"C:\Program Files (x86)\K-Lite Codec Pack\MPC-HC64\mpc-hc64.exe"),
];

const fn vlc_registry(hive: Hive, key: &'static str) -> InstallCandidate {
    InstallCandidate::Registry {
        hive,
        key,
        value: "InstallDir",
        exe_name: Some("vlc.exe"),
    }
}

const fn mpc_registry(hive: Hive, key: &'static str) -> InstallCandidate {
    InstallCandidate::Registry {
        hive,
        key,
        value: "ExePath",
        exe_name: None,
    }
}

const fn mpc_exe(path: &'static str) -> InstallCandidate {
    InstallCandidate::Path {
        path,
        exe_name: None,
    }
}

impl InstallCandidate {
    /// Ordered candidate list for a player
    pub fn for_player(player: Player) -> &'static [InstallCandidate] {
        match player {
            Player::Mpc => MPC_CANDIDATES,
            Player::Vlc => VLC_CANDIDATES,
        }
    }
}

type ExistsFn = Box<dyn Fn(&Path) -> bool + Send + Sync>;

/// Finds player executables from registry entries and well-known paths
pub struct PlayerLocator<R = SystemRegistry> {
    registry: R,
    exists: ExistsFn,
}

impl PlayerLocator<SystemRegistry> {
    /// Locator over the live registry and filesystem
    pub fn system() -> Self {
        Self::new(SystemRegistry, |p: &Path| p.is_file())
    }
}

impl<R: RegistryReader> PlayerLocator<R> {
    /// Locator with an explicit registry and existence check
    pub fn new<F>(registry: R, exists: F) -> Self
    where
        F: Fn(&Path) -> bool + Send + Sync + 'static,
    {
        Self {
            registry,
            exists: Box::new(exists),
        }
    }

    /// First existing executable for `player`, or an empty string
    pub fn detect(&self, player: Player) -> String {
        for candidate in InstallCandidate::for_player(player) {
            let Some(exe) = self.resolve(candidate) else {
                continue;
            };

            if (self.exists)(&exe) {
                let found = exe.to_string_lossy().to_string();
                info!("{} Path Detected: {}", player, found);
                return found;
            }
            debug!("{} candidate missing: {:?}", player, exe);
        }

        debug!("{} not found in any known location", player);
        String::new()
    }

    /// Detect players whose configured path is empty
    ///
    /// Returns true when the configuration changed.
    pub fn fill_missing(&self, config: &mut HelperConfig) -> bool {
        let mut changed = false;

        if config.mpc_path.is_empty() {
            let found = self.detect(Player::Mpc);
            changed |= !found.is_empty();
            config.mpc_path = found;
        }

        if config.vlc_path.is_empty() {
            let found = self.detect(Player::Vlc);
            changed |= !found.is_empty();
            config.vlc_path = found;
        }

        changed
    }

    fn resolve(&self, candidate: &InstallCandidate) -> Option<PathBuf> {
        let (base, exe_name) = match *candidate {
            InstallCandidate::Registry {
                hive,
                key,
                value,
                exe_name,
            } => (self.registry.read_string(hive, key, value)?, exe_name),
            InstallCandidate::Path { path, exe_name } => (path.to_string(), exe_name),
        };

        let base = PathBuf::from(base);
        Some(match exe_name {
            Some(name) => base.join(name),
            None => base,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};

    #[derive(Default)]
    struct FakeRegistry {
        values: HashMap<(String, String), String>,
        hive: Option<Hive>,
    }

    impl FakeRegistry {
        fn with(hive: Hive, key: &str, value: &str, data: &str) -> Self {
            let mut values = HashMap::new();
            values.insert((key.to_string(), value.to_string()), data.to_string());
            Self {
                values,
                hive: Some(hive),
            }
        }
    }

    impl RegistryReader for FakeRegistry {
        fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String> {
            if self.hive != Some(hive) {
                return None;
            }
            self.values
                .get(&(key.to_string(), value.to_string()))
                .cloned()
        }
    }

    fn locator_with(registry: FakeRegistry, existing: &[PathBuf]) -> PlayerLocator<FakeRegistry> {
        let existing: HashSet<PathBuf> = existing.iter().cloned().collect();
        PlayerLocator::new(registry, move |p: &Path| existing.contains(p))
    }

    #[test]
    fn test_nothing_found_is_empty() {
        let locator = locator_with(FakeRegistry::default(), &[]);
        assert_eq!(locator.detect(Player::Vlc), "");
        assert_eq!(locator.detect(Player::Mpc), "");
    }

    #[test]
    fn test_vlc_registry_dir_gets_exe_appended() {
        let dir = r"D:\Apps\VLC";
        let registry = FakeRegistry::with(Hive::LocalMachine, VLC_KEY, "InstallDir", dir);
        let expected = Path::new(dir).join("vlc.exe");
        let locator = locator_with(registry, &[expected.clone()]);

        assert_eq!(locator.detect(Player::Vlc), expected.to_string_lossy());
    }

    #[test]
    fn test_registry_entry_without_executable_is_skipped() {
        let registry = FakeRegistry::with(Hive::CurrentUser, VLC_KEY, "InstallDir", r"D:\Gone");
        let fallback = Path::new(r"C:\Program Files (x86)\VideoLAN\VLC").join("vlc.exe");
        let locator = locator_with(registry, &[fallback.clone()]);

        assert_eq!(locator.detect(Player::Vlc), fallback.to_string_lossy());
    }

    #[test]
    fn test_registry_wins_over_well_known_path() {
        let exe = r"E:\MPC\mpc-hc64.exe";
        let registry = FakeRegistry::with(Hive::CurrentUser, MPC_KEY_WOW64, "ExePath", exe);
        let well_known = PathBuf::from(r"C:\Program Files\MPC-HC\mpc-hc64.exe");
        let locator = locator_with(registry, &[PathBuf::from(exe), well_known]);

        assert_eq!(locator.detect(Player::Mpc), exe);
    }

    #[test]
    fn test_well_known_paths_in_order() {
        let first = PathBuf::from(r"C:\Program Files (x86)\MPC-HC\mpc-hc.exe");
        let later = PathBuf::from(r"C:\Program Files (x86)\K-Lite Codec Pack\MPC-HC64\mpc-hc64.exe");
        let locator = locator_with(FakeRegistry::default(), &[later, first.clone()]);

        assert_eq!(locator.detect(Player::Mpc), first.to_string_lossy());
    }

    #[test]
    fn test_fill_missing_keeps_configured_paths() {
        let vlc = Path::new(r"C:\Program Files\VideoLAN\VLC").join("vlc.exe");
        let locator = locator_with(FakeRegistry::default(), &[vlc.clone()]);
        let mut config = HelperConfig {
            mpc_path: "custom-mpc.exe".into(),
            ..HelperConfig::default()
        };

        assert!(locator.fill_missing(&mut config));
        assert_eq!(config.mpc_path, "custom-mpc.exe");
        assert_eq!(config.vlc_path, vlc.to_string_lossy());

        assert!(!locator.fill_missing(&mut config));
    }

    #[test]
    fn test_candidate_counts() {
        assert_eq!(InstallCandidate::for_player(Player::Vlc).len(), 6);
        assert_eq!(InstallCandidate::for_player(Player::Mpc).len(), 9);
    }
}
