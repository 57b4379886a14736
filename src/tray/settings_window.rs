//! Native settings window
//!
//! The window is a plain Win32 top-level window with child controls, pumped by
//! the tray's message loop. [`SettingsSlot`] keeps at most one open.

use crate::instance::SETTINGS_WINDOW_TITLE;
use crate::service::{HelperService, SettingsForm};
use crate::tray::dialog;
use anyhow::Result;
use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::mem::size_of;
use std::rc::Rc;
use std::sync::{Arc, Once};
use std::thread::JoinHandle;
use tracing::{error, info};
use windows::core::{w, HSTRING, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{GetStockObject, GetSysColorBrush, COLOR_BTNFACE, DEFAULT_GUI_FONT};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::*;

const WINDOW_WIDTH: i32 = 640;
const WINDOW_HEIGHT: i32 = 250;

// IDOK / IDCANCEL, so Enter and Escape map to Save and Cancel.
const ID_SAVE: u16 = 1;
const ID_CANCEL: u16 = 2;
const ID_MPC_EDIT: u16 = 101;
const ID_MPC_BROWSE: u16 = 102;
const ID_VLC_EDIT: u16 = 103;
const ID_VLC_BROWSE: u16 = 104;
const ID_PORT_EDIT: u16 = 105;
const ID_AUTO_START: u16 = 106;

const EDIT_AUTOHSCROLL: u32 = 0x0080;
const EDIT_NUMBER: u32 = 0x2000;
const EDIT_LIMIT_TEXT: u32 = 0x00C5;
const BUTTON_DEFPUSH: u32 = 0x0001;
const BUTTON_AUTOCHECKBOX: u32 = 0x0003;
const BUTTON_GET_CHECK: u32 = 0x00F0;
const BUTTON_SET_CHECK: u32 = 0x00F1;
const BUTTON_CHECKED: usize = 1;
const BUTTON_CLICKED: usize = 0;

static REGISTER_CLASS: Once = Once::new();

/// State shared between the window procedure and its owner
#[derive(Default)]
struct WindowShared {
    closed: Cell<bool>,
    restart: RefCell<Option<JoinHandle<()>>>,
}

/// Per-window data stored in GWLP_USERDATA
struct WindowState {
    service: Arc<HelperService>,
    shared: Rc<WindowShared>,
    mpc_edit: HWND,
    vlc_edit: HWND,
    port_edit: HWND,
    auto_start: HWND,
}

/// An open (or recently closed) settings window
pub struct SettingsWindow {
    hwnd: HWND,
    shared: Rc<WindowShared>,
}

impl SettingsWindow {
    /// Create and show the window, pre-filled from the current configuration
    pub fn open(service: Arc<HelperService>) -> Result<Self> {
        unsafe {
            let instance: HINSTANCE = GetModuleHandleW(None)?.into();
            register_class(instance);

            let x = (GetSystemMetrics(SM_CXSCREEN) - WINDOW_WIDTH) / 2;
            let y = (GetSystemMetrics(SM_CYSCREEN) - WINDOW_HEIGHT) / 2;

            let hwnd = CreateWindowExW(
                WS_EX_DLGMODALFRAME,
                w!("VlcMpcHelperSettings"),
                &HSTRING::from(SETTINGS_WINDOW_TITLE),
                WS_OVERLAPPED | WS_CAPTION | WS_SYSMENU | WS_MINIMIZEBOX,
                x,
                y,
                WINDOW_WIDTH,
                WINDOW_HEIGHT,
                None,
                None,
                instance,
                None,
            )?;

            let config = service.config().snapshot();
            let builder = ControlBuilder { parent: hwnd, instance };

            builder.label("MPC-HC Path:", 15, 20, 120)?;
            let mpc_edit = builder.edit(ID_MPC_EDIT, &config.mpc_path, 140, 16, 380, 0)?;
            builder.button(ID_MPC_BROWSE, "Browse", 530, 15, 80, 0)?;

            builder.label("VLC Path:", 15, 56, 120)?;
            let vlc_edit = builder.edit(ID_VLC_EDIT, &config.vlc_path, 140, 52, 380, 0)?;
            builder.button(ID_VLC_BROWSE, "Browse", 530, 51, 80, 0)?;

            builder.label("Connection Port:", 15, 92, 120)?;
            let port_edit =
                builder.edit(ID_PORT_EDIT, &config.port.to_string(), 140, 88, 70, EDIT_NUMBER)?;
            SendMessageW(
                port_edit,
                EDIT_LIMIT_TEXT,
                WPARAM(crate::service::settings::PORT_MAX_DIGITS),
                LPARAM(0),
            );

            let auto_start = builder.button(
                ID_AUTO_START,
                "Auto-start helper app in background when windows starts.",
                15,
                124,
                500,
                BUTTON_AUTOCHECKBOX,
            )?;
            if config.auto_start {
                SendMessageW(auto_start, BUTTON_SET_CHECK, WPARAM(BUTTON_CHECKED), LPARAM(0));
            }

            builder.button(ID_SAVE, "Save Settings", 190, 165, 120, BUTTON_DEFPUSH)?;
            builder.button(ID_CANCEL, "Cancel", 330, 165, 120, 0)?;

            let shared = Rc::new(WindowShared::default());
            let state = Box::new(WindowState {
                service,
                shared: Rc::clone(&shared),
                mpc_edit,
                vlc_edit,
                port_edit,
                auto_start,
            });
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, Box::into_raw(state) as isize);

            let _ = ShowWindow(hwnd, SW_SHOW);
            let _ = SetForegroundWindow(hwnd);
            info!("Settings window opened");

            Ok(Self { hwnd, shared })
        }
    }

    /// Window has not been destroyed yet
    pub fn is_open(&self) -> bool {
        !self.shared.closed.get()
    }

    /// Restore and bring to the foreground
    pub fn focus(&self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_RESTORE);
            let _ = SetForegroundWindow(self.hwnd);
        }
    }

    /// Take the listener restart scheduled by the last save, if any
    fn take_restart(&self) -> Option<JoinHandle<()>> {
        self.shared.restart.borrow_mut().take()
    }
}

/// Holds at most one settings window
pub struct SettingsSlot {
    service: Arc<HelperService>,
    window: Option<SettingsWindow>,
}

impl SettingsSlot {
    pub fn new(service: Arc<HelperService>) -> Self {
        Self {
            service,
            window: None,
        }
    }

    /// Focus the open window, or open a new one
    pub fn open_or_focus(&mut self) -> Result<()> {
        if let Some(window) = self.window.as_ref().filter(|w| w.is_open()) {
            window.focus();
            return Ok(());
        }

        self.window = Some(SettingsWindow::open(Arc::clone(&self.service))?);
        Ok(())
    }

    /// A settings window is currently shown
    pub fn is_open(&self) -> bool {
        self.window.as_ref().is_some_and(|w| w.is_open())
    }

    /// Route keyboard navigation (Tab, Enter, Escape) to the open window
    ///
    /// Returns true when the message was consumed.
    pub fn handle_dialog_message(&self, msg: &MSG) -> bool {
        match self.window.as_ref().filter(|w| w.is_open()) {
            Some(window) => unsafe { IsDialogMessageW(window.hwnd, msg).as_bool() },
            None => false,
        }
    }

    /// Pump messages until the window is closed
    pub fn run_until_closed(&mut self) {
        unsafe {
            let mut msg = MSG::default();
            while self.is_open() {
                if !GetMessageW(&mut msg, None, 0, 0).as_bool() {
                    break;
                }
                if !self.handle_dialog_message(&msg) {
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }
        }
    }

    /// Wait for a listener restart triggered by the last save
    pub fn join_pending_restart(&mut self) {
        if let Some(handle) = self.window.as_ref().and_then(SettingsWindow::take_restart) {
            let _ = handle.join();
        }
    }
}

struct ControlBuilder {
    parent: HWND,
    instance: HINSTANCE,
}

impl ControlBuilder {
    unsafe fn create(
        &self,
        class: PCWSTR,
        text: &str,
        style: u32,
        ex_style: WINDOW_EX_STYLE,
        rect: (i32, i32, i32, i32),
        id: u16,
    ) -> windows::core::Result<HWND> {
        let (x, y, width, height) = rect;
        let hwnd = CreateWindowExW(
            ex_style,
            class,
            &HSTRING::from(text),
            WS_CHILD | WS_VISIBLE | WINDOW_STYLE(style),
            x,
            y,
            width,
            height,
            self.parent,
            HMENU(id as usize as *mut c_void),
            self.instance,
            None,
        )?;
        let font = GetStockObject(DEFAULT_GUI_FONT);
        SendMessageW(hwnd, WM_SETFONT, WPARAM(font.0 as usize), LPARAM(1));
        Ok(hwnd)
    }

    unsafe fn label(&self, text: &str, x: i32, y: i32, width: i32) -> windows::core::Result<HWND> {
        self.create(w!("STATIC"), text, 0, WINDOW_EX_STYLE(0), (x, y, width, 20), 0)
    }

    unsafe fn edit(
        &self,
        id: u16,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        style: u32,
    ) -> windows::core::Result<HWND> {
        self.create(
            w!("EDIT"),
            text,
            WS_TABSTOP.0 | EDIT_AUTOHSCROLL | style,
            WS_EX_CLIENTEDGE,
            (x, y, width, 24),
            id,
        )
    }

    unsafe fn button(
        &self,
        id: u16,
        text: &str,
        x: i32,
        y: i32,
        width: i32,
        style: u32,
    ) -> windows::core::Result<HWND> {
        self.create(
            w!("BUTTON"),
            text,
            WS_TABSTOP.0 | style,
            WINDOW_EX_STYLE(0),
            (x, y, width, 26),
            id,
        )
    }
}

fn register_class(instance: HINSTANCE) {
    REGISTER_CLASS.call_once(|| unsafe {
        let wc = WNDCLASSEXW {
            cbSize: size_of::<WNDCLASSEXW>() as u32,
            lpfnWndProc: Some(window_proc),
            hInstance: instance,
            hCursor: LoadCursorW(None, IDC_ARROW).unwrap_or_default(),
            hbrBackground: GetSysColorBrush(COLOR_BTNFACE),
            lpszClassName: w!("VlcMpcHelperSettings"),
            ..Default::default()
        };
        if RegisterClassExW(&wc) == 0 {
            error!("Failed to register settings window class");
        }
    });
}

fn window_text(hwnd: HWND) -> String {
    unsafe {
        let len = GetWindowTextLengthW(hwnd);
        if len <= 0 {
            return String::new();
        }
        let mut buf = vec![0u16; len as usize + 1];
        let copied = GetWindowTextW(hwnd, &mut buf).max(0) as usize;
        String::from_utf16_lossy(&buf[..copied])
    }
}

impl WindowState {
    fn read_form(&self) -> SettingsForm {
        let checked =
            unsafe { SendMessageW(self.auto_start, BUTTON_GET_CHECK, WPARAM(0), LPARAM(0)) };
        SettingsForm {
            mpc_path: window_text(self.mpc_edit),
            vlc_path: window_text(self.vlc_edit),
            port: window_text(self.port_edit),
            auto_start: checked.0 as usize == BUTTON_CHECKED,
        }
    }

    fn browse(&self, hwnd: HWND, edit: HWND, title: &str) {
        let current = window_text(edit);
        if let Some(path) = dialog::browse_executable(hwnd, title, &current) {
            let text = HSTRING::from(path.to_string_lossy().as_ref());
            unsafe {
                let _ = SetWindowTextW(edit, &text);
            }
        }
    }

    /// Handle a button click; returns true when the window should close
    fn on_command(&self, hwnd: HWND, id: u16) -> bool {
        match id {
            ID_MPC_BROWSE => {
                self.browse(hwnd, self.mpc_edit, "Select MPC-HC executable");
                false
            }
            ID_VLC_BROWSE => {
                self.browse(hwnd, self.vlc_edit, "Select VLC executable");
                false
            }
            ID_SAVE => match self.service.apply_settings(&self.read_form()) {
                Ok(outcome) => {
                    *self.shared.restart.borrow_mut() = outcome.restart;
                    true
                }
                Err(e) => {
                    dialog::show_error(Some(hwnd), e.title(), &e.to_string());
                    false
                }
            },
            ID_CANCEL => true,
            _ => false,
        }
    }
}

unsafe extern "system" fn window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_COMMAND => {
            let id = (wparam.0 & 0xFFFF) as u16;
            let code = (wparam.0 >> 16) & 0xFFFF;
            let state = GetWindowLongPtrW(hwnd, GWLP_USERDATA) as *const WindowState;

            // The borrow of the state ends before DestroyWindow frees it.
            let close = code == BUTTON_CLICKED
                && !state.is_null()
                && (*state).on_command(hwnd, id);
            if close {
                let _ = DestroyWindow(hwnd);
            }
            LRESULT(0)
        }
        WM_CLOSE => {
            let _ = DestroyWindow(hwnd);
            LRESULT(0)
        }
        WM_DESTROY => {
            let state = SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0) as *mut WindowState;
            if !state.is_null() {
                let state = Box::from_raw(state);
                state.shared.closed.set(true);
            }
            info!("Settings window closed");
            LRESULT(0)
        }
        _ => DefWindowProcW(hwnd, msg, wparam, lparam),
    }
}
