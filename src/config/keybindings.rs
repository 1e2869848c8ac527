use crossterm::event::KeyCode;
use serde::{Deserialize, Serialize};

use crate::config::key::{Key, KeyBinding};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalKeybindings {
    pub quit: KeyBinding,
    pub confirm: KeyBinding,
    pub info: KeyBinding,
    pub swap: KeyBinding,
    pub reopen: KeyBinding,
    pub close: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DialogKeybindings {
    pub confirm: KeyBinding,
    pub cancel: KeyBinding,
    pub dismiss: KeyBinding,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct KeybindingsConfig {
    pub global: GlobalKeybindings,
    pub dialog: DialogKeybindings,
}

impl Default for GlobalKeybindings {
    fn default() -> Self {
        Self {
            quit: Key::new(KeyCode::Char('q')).into(),
            confirm: Key::new(KeyCode::Char('c')).into(),
            info: Key::new(KeyCode::Char('i')).into(),
            swap: Key::new(KeyCode::Char('s')).into(),
            reopen: Key::new(KeyCode::Char('r')).into(),
            close: Key::new(KeyCode::Char('x')).into(),
        }
    }
}

impl Default for DialogKeybindings {
    fn default() -> Self {
        Self {
            confirm: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('y')),
                Key::new(KeyCode::Enter),
            ]),
            cancel: KeyBinding::multiple(vec![
                Key::new(KeyCode::Char('n')),
                Key::new(KeyCode::Esc),
            ]),
            dismiss: KeyBinding::multiple(vec![
                Key::new(KeyCode::Enter),
                Key::new(KeyCode::Esc),
            ]),
        }
    }
}
