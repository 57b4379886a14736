//! Message boxes and file pickers

use std::path::{Path, PathBuf};
use windows::core::HSTRING;
use windows::Win32::Foundation::{BOOL, HWND};
use windows::Win32::UI::Input::KeyboardAndMouse::EnableWindow;
use windows::Win32::UI::WindowsAndMessaging::{
    MessageBoxW, SetForegroundWindow, MB_ICONERROR, MB_OK, MB_SETFOREGROUND,
};

/// Modal error box, owned by `owner` when given
pub fn show_error(owner: Option<HWND>, title: &str, message: &str) {
    unsafe {
        MessageBoxW(
            owner.unwrap_or_default(),
            &HSTRING::from(message),
            &HSTRING::from(title),
            MB_OK | MB_ICONERROR | MB_SETFOREGROUND,
        );
    }
}

/// Keeps a window disabled until dropped
///
/// The file picker has no owner, so its owner-to-be must not take input
/// (or be destroyed) while it is open.
pub struct DisabledWindow(HWND);

impl DisabledWindow {
    pub fn new(hwnd: HWND) -> Self {
        unsafe {
            let _ = EnableWindow(hwnd, BOOL::from(false));
        }
        Self(hwnd)
    }
}

impl Drop for DisabledWindow {
    fn drop(&mut self) {
        unsafe {
            let _ = EnableWindow(self.0, BOOL::from(true));
            let _ = SetForegroundWindow(self.0);
        }
    }
}

/// Ask for an `.exe`, starting in the folder of `current` when it exists
///
/// `owner` is disabled while the picker is open.
pub fn browse_executable(owner: HWND, title: &str, current: &str) -> Option<PathBuf> {
    let _disabled = DisabledWindow::new(owner);

    let mut dialog = rfd::FileDialog::new()
        .set_title(title)
        .add_filter("Executable", &["exe"]);

    if let Some(dir) = Path::new(current).parent().filter(|d| d.is_dir()) {
        dialog = dialog.set_directory(dir);
    }

    dialog.pick_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use windows::core::w;
    use windows::Win32::UI::Input::KeyboardAndMouse::IsWindowEnabled;
    use windows::Win32::UI::WindowsAndMessaging::{
        CreateWindowExW, DestroyWindow, WINDOW_EX_STYLE, WS_OVERLAPPED,
    };

    #[test]
    fn test_window_disabled_while_guard_lives() {
        unsafe {
            let hwnd = CreateWindowExW(
                WINDOW_EX_STYLE::default(),
                w!("STATIC"),
                w!("picker owner"),
                WS_OVERLAPPED,
                0,
                0,
                10,
                10,
                None,
                None,
                None,
                None,
            )
            .unwrap();

            {
                let _disabled = DisabledWindow::new(hwnd);
                assert!(!IsWindowEnabled(hwnd).as_bool());
            }
            assert!(IsWindowEnabled(hwnd).as_bool());

            DestroyWindow(hwnd).unwrap();
        }
    }
}
