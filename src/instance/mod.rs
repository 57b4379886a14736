//! Single-instance guard

mod lock;

pub use lock::{is_process_running, InstanceLock, LockOutcome, LOCK_FILE_NAME};

/// Title of the settings window, used to find it from a second process
pub const SETTINGS_WINDOW_TITLE: &str = "Settings - Open in VLC / MPC-HC Windows Helper";

/// Bring the running instance's settings window to the foreground, if open
#[cfg(windows)]
pub fn bring_settings_window_to_front() {
    use windows::core::{HSTRING, PCWSTR};
    use windows::Win32::UI::WindowsAndMessaging::{FindWindowW, SetForegroundWindow};

    let title = HSTRING::from(SETTINGS_WINDOW_TITLE);
    unsafe {
        match FindWindowW(PCWSTR::null(), &title) {
            Ok(hwnd) if !hwnd.is_invalid() => {
                let _ = SetForegroundWindow(hwnd);
            }
            Ok(_) => {}
            Err(e) => tracing::debug!("Settings window not open in running instance: {}", e),
        }
    }
}

/// No window to focus outside Windows
#[cfg(not(windows))]
pub fn bring_settings_window_to_front() {
    tracing::debug!("Focusing the settings window is only supported on Windows");
}
