pub mod actions;
pub mod key;
pub mod keybindings;
pub mod loader;
pub mod resolver;

use std::time::Duration;

pub use actions::*;
use keybindings::KeybindingsConfig;
pub use loader::load;
pub use resolver::KeyResolver;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Catppuccin Mocha".to_string(),
        }
    }
}

/// Timing and behavior of the modal surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModalConfig {
    /// Identifier of the single surface dialogs are mounted into.
    pub surface_id: String,
    /// Grace period between `close()` and the teardown request.
    pub close_debounce_ms: u64,
    pub backdrop_fade_ms: u64,
    pub open_animation_ms: u64,
    pub close_animation_ms: u64,
    pub await_open_animation: bool,
    pub await_close_animation: bool,
    pub disable_focus: bool,
    pub close_on_backdrop_click: bool,
}

impl ModalConfig {
    pub const fn close_debounce(&self) -> Duration {
        Duration::from_millis(self.close_debounce_ms)
    }

    pub const fn backdrop_fade(&self) -> Duration {
        Duration::from_millis(self.backdrop_fade_ms)
    }

    pub const fn open_animation(&self) -> Duration {
        Duration::from_millis(self.open_animation_ms)
    }

    pub const fn close_animation(&self) -> Duration {
        Duration::from_millis(self.close_animation_ms)
    }

    /// Present and dismiss the surface instantly.
    #[must_use]
    pub fn without_animation(mut self) -> Self {
        self.await_open_animation = false;
        self.await_close_animation = false;
        self.backdrop_fade_ms = 0;
        self
    }
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            surface_id: "modal".to_string(),
            close_debounce_ms: 0,
            backdrop_fade_ms: 200,
            open_animation_ms: 180,
            close_animation_ms: 150,
            await_open_animation: true,
            await_close_animation: true,
            disable_focus: true,
            close_on_backdrop_click: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub theme: ThemeConfig,
    #[serde(default)]
    pub modal: ModalConfig,
    #[serde(default)]
    pub keybindings: KeybindingsConfig,
}
