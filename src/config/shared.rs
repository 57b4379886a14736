//! In-memory configuration shared between the listener and the UI

use crate::config::store::{ConfigError, ConfigStore, HelperConfig};
use parking_lot::RwLock;
use std::sync::Arc;

/// Configuration shared across threads with a single write path
///
/// Readers take cheap snapshots. Writers go through [`SharedConfig::update`],
/// which mutates and persists while holding the write lock, so a concurrent
/// reader never observes a state that differs from the file.
#[derive(Debug, Clone)]
pub struct SharedConfig {
    inner: Arc<RwLock<HelperConfig>>,
    store: ConfigStore,
}

impl SharedConfig {
    /// Wrap an already loaded configuration
    pub fn new(config: HelperConfig, store: ConfigStore) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
            store,
        }
    }

    /// Load from the store and wrap
    pub fn load(store: ConfigStore) -> Self {
        let config = store.load();
        Self::new(config, store)
    }

    /// Copy of the current configuration
    pub fn snapshot(&self) -> HelperConfig {
        self.inner.read().clone()
    }

    /// Backing store
    pub fn store(&self) -> &ConfigStore {
        &self.store
    }

    /// Mutate the configuration and persist the result
    ///
    /// The in-memory value is updated even when the file write fails; the
    /// error is returned so the caller can log it.
    pub fn update<F>(&self, f: F) -> Result<HelperConfig, ConfigError>
    where
        F: FnOnce(&mut HelperConfig),
    {
        let mut guard = self.inner.write();
        f(&mut *guard);
        let updated = guard.clone();
        self.store.save(&updated)?;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let store = ConfigStore::new(dir.path().join("helper_config.json"));
        let shared = SharedConfig::load(store.clone());

        let updated = shared.update(|c| c.port = 40000).unwrap();
        assert_eq!(updated.port, 40000);
        assert_eq!(shared.snapshot().port, 40000);
        assert_eq!(store.load().port, 40000);
    }

    #[test]
    fn test_clones_share_state() {
        let dir = tempfile::tempdir().unwrap();
        let shared = SharedConfig::load(ConfigStore::new(dir.path().join("c.json")));
        let other = shared.clone();

        shared.update(|c| c.vlc_path = "vlc.exe".into()).unwrap();
        assert_eq!(other.snapshot().vlc_path, "vlc.exe");
    }
}
