//! Read-only registry lookups

use tracing::debug;

/// Registry root a lookup starts from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hive {
    /// HKEY_CURRENT_USER
    CurrentUser,
    /// HKEY_LOCAL_MACHINE
    LocalMachine,
}

/// Source of string registry values
///
/// A missing key, a missing value and an access error all yield `None`.
pub trait RegistryReader {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String>;
}

/// The live Windows registry; always empty elsewhere
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRegistry;

#[cfg(windows)]
impl RegistryReader for SystemRegistry {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String> {
        use winreg::enums::{HKEY_CURRENT_USER, HKEY_LOCAL_MACHINE, KEY_READ};
        use winreg::RegKey;

        let root = RegKey::predef(match hive {
            Hive::CurrentUser => HKEY_CURRENT_USER,
            Hive::LocalMachine => HKEY_LOCAL_MACHINE,
        });

        let result = root
            .open_subkey_with_flags(key, KEY_READ)
            .and_then(|k| k.get_value::<String, _>(value));

        match result {
            Ok(data) if !data.is_empty() => Some(data),
            Ok(_) => None,
            Err(e) => {
                debug!("Registry value {:?}\\{}\\{} not found: {}", hive, key, value, e);
                None
            }
        }
    }
}

#[cfg(not(windows))]
impl RegistryReader for SystemRegistry {
    fn read_string(&self, hive: Hive, key: &str, value: &str) -> Option<String> {
        debug!("No registry on this platform: {:?}\\{}\\{}", hive, key, value);
        None
    }
}
