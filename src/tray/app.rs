//! Main tray application

use crate::instance::InstanceLock;
use crate::player::PlayerLocator;
use crate::service::{HelperService, APP_DISPLAY_NAME};
use crate::tray::dialog;
use crate::tray::icon::IconManager;
use crate::tray::menu::{MenuAction, MenuManager};
use crate::tray::settings_window::SettingsSlot;
use anyhow::Result;
use crossbeam_channel::{bounded, Receiver, Sender};
use muda::MenuEvent;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tray_icon::{TrayIcon, TrayIconBuilder, TrayIconEvent};
use windows::Win32::UI::WindowsAndMessaging::{
    DispatchMessageW, PeekMessageW, TranslateMessage, MSG, PM_REMOVE,
};

/// Main tray application
pub struct TrayApp {
    service: Arc<HelperService>,
    lock: InstanceLock,
    tray_icon: Option<TrayIcon>,
    menu_manager: MenuManager,
    icon_manager: IconManager,
    settings: SettingsSlot,
    quit_tx: Sender<()>,
    quit_rx: Receiver<()>,
}

impl TrayApp {
    /// Create a tray application owning the instance lock
    pub fn new(service: Arc<HelperService>, lock: InstanceLock) -> Result<Self> {
        let (quit_tx, quit_rx) = bounded(1);
        let icon_manager = IconManager::new()?;
        let settings = SettingsSlot::new(Arc::clone(&service));

        Ok(Self {
            service,
            lock,
            tray_icon: None,
            menu_manager: MenuManager::new(),
            icon_manager,
            settings,
            quit_tx,
            quit_rx,
        })
    }

    /// Sender that asks the event loop to quit, e.g. from a Ctrl+C handler
    pub fn quit_sender(&self) -> Sender<()> {
        self.quit_tx.clone()
    }

    /// Run the tray application
    pub fn run(&mut self) -> Result<()> {
        let menu = self.menu_manager.build_menu()?;
        let tray_icon = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_tooltip(APP_DISPLAY_NAME)
            .with_icon(self.icon_manager.get_icon())
            .build()?;
        self.tray_icon = Some(tray_icon);

        self.service
            .detect_missing_players(&PlayerLocator::system());

        self.ensure_port_available();

        if self.service.listener_port().is_none() {
            if let Err(e) = self.service.start_listener() {
                error!("Failed to start HTTP server: {}", e);
                dialog::show_error(None, "Port In Use", &e.to_string());
                self.exit(1);
            }
        }
        self.service.apply_auto_start();

        if !self.service.config().snapshot().players_configured() {
            info!("Player paths missing, opening settings");
            self.open_settings();
        }

        self.run_event_loop()
    }

    /// Let the user pick another port when the configured one is taken
    fn ensure_port_available(&mut self) {
        if !self.service.configured_port_in_use() {
            return;
        }

        let port = self.service.config().snapshot().port;
        warn!("Port {} is already in use", port);
        dialog::show_error(
            None,
            "Port In Use",
            &format!(
                "Port {} is already in use by another application.\nPlease change it in settings.",
                port
            ),
        );

        self.open_settings();
        self.settings.run_until_closed();
        self.settings.join_pending_restart();

        if self.service.listener_port().is_none() && self.service.configured_port_in_use() {
            let port = self.service.config().snapshot().port;
            error!("Port {} is also in use, exiting", port);
            dialog::show_error(
                None,
                "Port In Use",
                &format!(
                    "New port {} is also in use by another application.\nExiting program. Try again after changing port.",
                    port
                ),
            );
            self.exit(1);
        }
    }

    fn open_settings(&mut self) {
        if let Err(e) = self.settings.open_or_focus() {
            error!("Failed to open settings window: {}", e);
        }
    }

    fn run_event_loop(&mut self) -> Result<()> {
        info!("Tray application event loop started");

        loop {
            unsafe {
                let mut msg: MSG = std::mem::zeroed();

                while PeekMessageW(&mut msg, None, 0, 0, PM_REMOVE).as_bool() {
                    if self.settings.handle_dialog_message(&msg) {
                        continue;
                    }
                    let _ = TranslateMessage(&msg);
                    DispatchMessageW(&msg);
                }
            }

            if let Ok(event) = TrayIconEvent::receiver().try_recv() {
                self.handle_tray_event(event);
            }

            if let Ok(event) = MenuEvent::receiver().try_recv() {
                self.handle_menu_event(event);
            }

            if self.quit_rx.try_recv().is_ok() {
                self.quit();
            }

            std::thread::sleep(Duration::from_millis(10));
        }
    }

    fn handle_tray_event(&mut self, event: TrayIconEvent) {
        if let TrayIconEvent::DoubleClick { .. } = event {
            self.open_settings();
        }
    }

    fn handle_menu_event(&mut self, event: MenuEvent) {
        match self.menu_manager.get_action(event.id()) {
            Some(MenuAction::OpenSettings) => self.open_settings(),
            Some(MenuAction::Quit) => self.quit(),
            None => {}
        }
    }

    /// Stop the listener, drop the lock and leave
    fn quit(&mut self) -> ! {
        self.service.shutdown();
        self.exit(0)
    }

    fn exit(&mut self, code: i32) -> ! {
        self.lock.release();
        self.tray_icon = None;
        info!("Exiting program.");
        std::process::exit(code)
    }
}
