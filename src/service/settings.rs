//! Validation and application of the settings form

use crate::config::HelperConfig;
use thiserror::Error;

/// Ports the listener may never use
pub const RESTRICTED_PORTS: [u16; 5] = [80, 443, 21, 22, 8080];

/// Maximum number of digits accepted in the port field
pub const PORT_MAX_DIGITS: usize = 5;

/// Values entered in the settings window
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsForm {
    pub mpc_path: String,
    pub vlc_path: String,
    /// Raw text of the port field
    pub port: String,
    pub auto_start: bool,
}

impl SettingsForm {
    /// Form pre-filled from the current configuration
    pub fn from_config(config: &HelperConfig) -> Self {
        Self {
            mpc_path: config.mpc_path.clone(),
            vlc_path: config.vlc_path.clone(),
            port: config.port.to_string(),
            auto_start: config.auto_start,
        }
    }

    /// Parse the port field
    pub fn parse_port(&self) -> Result<u16, SettingsError> {
        let text = self.port.trim();
        if text.is_empty() || !is_valid_port_input(text) {
            return Err(SettingsError::InvalidPort(self.port.clone()));
        }
        match text.parse::<u16>() {
            Ok(0) | Err(_) => Err(SettingsError::InvalidPort(self.port.clone())),
            Ok(port) => Ok(port),
        }
    }
}

/// Keystroke filter for the port field: empty, or at most five digits
pub fn is_valid_port_input(text: &str) -> bool {
    text.len() <= PORT_MAX_DIGITS && text.chars().all(|c| c.is_ascii_digit())
}

/// Reasons a settings save is rejected
///
/// The display text is shown to the user as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettingsError {
    #[error("'{0}' is not a valid port.\nEnter a number between 1 and 65535.")]
    InvalidPort(String),

    #[error("Port {0} is not allowed.\nPorts 80, 443, 21, 22, and 8080 are restricted.")]
    RestrictedPort(u16),

    #[error("Port {0} is already in use by another application.\nPlease choose another port.")]
    PortInUse(u16),
}

impl SettingsError {
    /// Caption for the error dialog
    pub fn title(&self) -> &'static str {
        match self {
            SettingsError::InvalidPort(_) => "Invalid Port",
            SettingsError::RestrictedPort(_) => "Restricted Port Used",
            SettingsError::PortInUse(_) => "Port In Use",
        }
    }
}

/// Check a form against the current configuration
///
/// `port_in_use` is only consulted when the port changes.
pub fn validate<F>(
    form: &SettingsForm,
    current: &HelperConfig,
    port_in_use: F,
) -> Result<HelperConfig, SettingsError>
where
    F: Fn(u16) -> bool,
{
    let port = form.parse_port()?;

    if RESTRICTED_PORTS.contains(&port) {
        return Err(SettingsError::RestrictedPort(port));
    }

    if port != current.port && port_in_use(port) {
        return Err(SettingsError::PortInUse(port));
    }

    Ok(HelperConfig {
        mpc_path: form.mpc_path.trim().to_string(),
        vlc_path: form.vlc_path.trim().to_string(),
        port,
        auto_start: form.auto_start,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(port: &str) -> SettingsForm {
        SettingsForm {
            mpc_path: "mpc.exe".into(),
            vlc_path: " vlc.exe ".into(),
            port: port.into(),
            auto_start: false,
        }
    }

    #[test]
    fn test_port_input_filter() {
        assert!(is_valid_port_input(""));
        assert!(is_valid_port_input("26270"));
        assert!(!is_valid_port_input("262701"));
        assert!(!is_valid_port_input("12a"));
        assert!(!is_valid_port_input("-1"));
    }

    #[test]
    fn test_invalid_port_text() {
        let current = HelperConfig::default();
        for text in ["", "0", "70000", "abc"] {
            assert!(
                matches!(validate(&form(text), &current, |_| false), Err(SettingsError::InvalidPort(_))),
                "{text} should be rejected"
            );
        }
    }

    #[test]
    fn test_restricted_ports_rejected() {
        let current = HelperConfig::default();
        for port in RESTRICTED_PORTS {
            let err = validate(&form(&port.to_string()), &current, |_| false).unwrap_err();
            assert_eq!(err, SettingsError::RestrictedPort(port));
            assert_eq!(err.title(), "Restricted Port Used");
        }
    }

    #[test]
    fn test_busy_port_rejected_only_when_changed() {
        let current = HelperConfig::default();

        let err = validate(&form("30000"), &current, |_| true).unwrap_err();
        assert_eq!(err, SettingsError::PortInUse(30000));
        assert!(err.to_string().starts_with("Port 30000 is already in use"));

        let same = current.port.to_string();
        assert!(validate(&form(&same), &current, |_| true).is_ok());
    }

    #[test]
    fn test_valid_form_builds_config() {
        let config = validate(&form("30000"), &HelperConfig::default(), |_| false).unwrap();
        assert_eq!(config.port, 30000);
        assert_eq!(config.vlc_path, "vlc.exe");
        assert_eq!(config.mpc_path, "mpc.exe");
        assert!(!config.auto_start);
    }

    #[test]
    fn test_form_from_config() {
        let config = HelperConfig::default();
        let form = SettingsForm::from_config(&config);
        assert_eq!(form.parse_port(), Ok(config.port));
    }
}
