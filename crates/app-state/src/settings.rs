//! Theme settings toggled from the settings screen

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// Appearance toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThemeSettings {
    /// Dark color scheme
    pub dark: bool,
    /// Dynamic "Material You" palette instead of the standard one
    pub material_you: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            dark: true,
            material_you: false,
        }
    }
}

/// Shared holder of [`ThemeSettings`]
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<ThemeSettings>>,
    changes_tx: Arc<watch::Sender<ThemeSettings>>,
}

impl SettingsStore {
    /// Create a store with default settings
    pub fn new() -> Self {
        Self::with_settings(ThemeSettings::default())
    }

    /// Create a store with `settings`
    pub fn with_settings(settings: ThemeSettings) -> Self {
        let (changes_tx, _) = watch::channel(settings);
        Self {
            settings: Arc::new(RwLock::new(settings)),
            changes_tx: Arc::new(changes_tx),
        }
    }

    /// Current settings
    pub fn get(&self) -> ThemeSettings {
        *self.settings.read()
    }

    /// Flip dark mode, returning the new value
    pub fn toggle_dark(&self) -> bool {
        self.update(|s| s.dark = !s.dark).dark
    }

    /// Flip the Material You palette, returning the new value
    pub fn toggle_material_you(&self) -> bool {
        self.update(|s| s.material_you = !s.material_you).material_you
    }

    /// Subscribe to settings changes
    pub fn subscribe(&self) -> watch::Receiver<ThemeSettings> {
        self.changes_tx.subscribe()
    }

    fn update(&self, apply: impl FnOnce(&mut ThemeSettings)) -> ThemeSettings {
        let updated = {
            let mut settings = self.settings.write();
            apply(&mut *settings);
            *settings
        };
        self.changes_tx.send_replace(updated);
        updated
    }
}

impl Default for SettingsStore {
    fn default() -> Self {
        Self::new()
    }
}
