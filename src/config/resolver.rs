use std::sync::Arc;

use crossterm::event::KeyEvent;

use crate::config::actions::{DialogAction, GlobalAction};
use crate::config::key::KeyBinding;
use crate::config::keybindings::KeybindingsConfig;

pub struct KeyResolver {
    pub keybindings: Arc<KeybindingsConfig>,
}

impl KeyResolver {
    pub const fn new(keybindings: Arc<KeybindingsConfig>) -> Self {
        Self { keybindings }
    }

    pub fn matches_global(&self, event: &KeyEvent, action: GlobalAction) -> bool {
        self.global(action).matches(event)
    }

    pub fn display_global(&self, action: GlobalAction) -> String {
        self.global(action).display()
    }

    pub fn matches_dialog(&self, event: &KeyEvent, action: DialogAction) -> bool {
        self.dialog(action).matches(event)
    }

    pub fn display_dialog(&self, action: DialogAction) -> String {
        self.dialog(action).display()
    }

    fn global(&self, action: GlobalAction) -> &KeyBinding {
        let kb = &self.keybindings.global;
        match action {
            GlobalAction::Quit => &kb.quit,
            GlobalAction::Confirm => &kb.confirm,
            GlobalAction::Info => &kb.info,
            GlobalAction::Swap => &kb.swap,
            GlobalAction::Reopen => &kb.reopen,
            GlobalAction::Close => &kb.close,
        }
    }

    fn dialog(&self, action: DialogAction) -> &KeyBinding {
        let kb = &self.keybindings.dialog;
        match action {
            DialogAction::Confirm => &kb.confirm,
            DialogAction::Cancel => &kb.cancel,
            DialogAction::Dismiss => &kb.dismiss,
        }
    }
}

impl Default for KeyResolver {
    fn default() -> Self {
        Self::new(Arc::new(KeybindingsConfig::default()))
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyModifiers};

    use super::*;

    #[test]
    fn test_default_bindings() {
        let resolver = KeyResolver::default();
        let esc = KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE);
        let enter = KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE);

        assert!(resolver.matches_dialog(&esc, DialogAction::Cancel));
        assert!(resolver.matches_dialog(&enter, DialogAction::Confirm));
        assert!(!resolver.matches_global(&esc, GlobalAction::Quit));
        assert_eq!(resolver.display_dialog(DialogAction::Confirm), "y/Enter");
        assert_eq!(resolver.display_global(GlobalAction::Swap), "s");
    }
}
