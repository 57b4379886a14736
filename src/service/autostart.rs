//! Login auto-start entry under the current user's Run key

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Registry key holding per-user startup commands
pub const RUN_KEY: &str = r"Software\Microsoft\Windows\CurrentVersion\Run";

/// Value name of the helper's startup entry
pub const RUN_VALUE_NAME: &str = "Open in VLC / MPC-HC Windows Helper";

/// File name of the tray executable the login entry starts
pub const TRAY_EXE_NAME: &str = "vlc-mpc-helper-tray.exe";

/// Quoted command line that starts `exe`
pub fn startup_command(exe: &Path) -> String {
    format!("\"{}\"", exe.display())
}

/// Tray executable installed next to `current_exe`
///
/// The login entry always starts the tray, even when written by the CLI.
pub fn startup_executable(current_exe: &Path) -> PathBuf {
    current_exe.with_file_name(TRAY_EXE_NAME)
}

/// Add or remove the auto-start entry
#[cfg(windows)]
pub fn set_auto_start(enabled: bool) -> Result<()> {
    use crate::error::HelperError;
    use tracing::info;
    use winreg::enums::{HKEY_CURRENT_USER, KEY_QUERY_VALUE, KEY_SET_VALUE};
    use winreg::RegKey;

    let hkcu = RegKey::predef(HKEY_CURRENT_USER);
    let key = hkcu
        .open_subkey_with_flags(RUN_KEY, KEY_SET_VALUE | KEY_QUERY_VALUE)
        .map_err(|e| HelperError::Registry(format!("open {}: {}", RUN_KEY, e)))?;

    if enabled {
        let exe = std::env::current_exe()
            .map_err(|e| HelperError::Registry(format!("current executable: {}", e)))?;
        key.set_value(RUN_VALUE_NAME, &startup_command(&startup_executable(&exe)))
            .map_err(|e| HelperError::Registry(format!("set {}: {}", RUN_VALUE_NAME, e)))?;
        info!("Auto-start with Windows enabled.");
    } else {
        match key.delete_value(RUN_VALUE_NAME) {
            Ok(()) => info!("Auto-start with Windows disabled."),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("Auto-start registry key not found.");
            }
            Err(e) => {
                return Err(HelperError::Registry(format!(
                    "delete {}: {}",
                    RUN_VALUE_NAME, e
                )))
            }
        }
    }

    Ok(())
}

/// No login entry outside Windows
#[cfg(not(windows))]
pub fn set_auto_start(enabled: bool) -> Result<()> {
    tracing::debug!("Auto-start ({}) is only supported on Windows", enabled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_entry_targets_tray_from_cli() {
        let cli = Path::new("apps").join("vlc-mpc-helper.exe");
        assert_eq!(
            startup_executable(&cli),
            Path::new("apps").join(TRAY_EXE_NAME)
        );

        let tray = Path::new("apps").join(TRAY_EXE_NAME);
        assert_eq!(startup_executable(&tray), tray);
    }

    #[test]
    fn test_startup_command_is_quoted() {
        let exe = Path::new("helper dir").join(TRAY_EXE_NAME);
        let command = startup_command(&exe);
        assert!(command.starts_with('"') && command.ends_with('"'));
        assert!(command.contains("helper dir"));
    }
}
