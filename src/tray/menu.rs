//! Menu management for tray application

use muda::{Menu, MenuId, MenuItem, PredefinedMenuItem};
use std::collections::HashMap;

/// Menu actions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    OpenSettings,
    Quit,
}

/// Menu manager for tray application
pub struct MenuManager {
    actions: HashMap<MenuId, MenuAction>,
}

impl MenuManager {
    /// Create a new menu manager
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Build the menu structure
    pub fn build_menu(&mut self) -> Result<Menu, muda::Error> {
        self.actions.clear();

        let menu = Menu::new();

        // Version info (non-clickable)
        let version_item = MenuItem::new(
            format!("Open in VLC / MPC-HC Helper v{}", crate::VERSION),
            false,
            None,
        );
        menu.append(&version_item)?;

        menu.append(&PredefinedMenuItem::separator())?;

        let settings_item = MenuItem::new("Open Settings", true, None);
        self.actions
            .insert(settings_item.id().clone(), MenuAction::OpenSettings);
        menu.append(&settings_item)?;

        let quit_item = MenuItem::new("Quit", true, None);
        self.actions.insert(quit_item.id().clone(), MenuAction::Quit);
        menu.append(&quit_item)?;

        Ok(menu)
    }

    /// Get action for a menu ID
    pub fn get_action(&self, id: &MenuId) -> Option<MenuAction> {
        self.actions.get(id).copied()
    }
}

impl Default for MenuManager {
    fn default() -> Self {
        Self::new()
    }
}
