use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::app::App;
use crate::keymap::{KeyBinding, Keymap};

/// Input action that can be performed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Quit,
    ScrollDown,
    ScrollUp,
    PageDown,
    PageUp,
    JumpToTop,
    JumpToBottom,
    /// First press of a double-press binding, waiting for the second
    Pending(char),
    TogglePause,
    Rescan,
    None,
}

/// Handle a key event and return the corresponding action
pub fn handle_key_event(key: KeyEvent, app: &App, keymap: &Keymap) -> Action {
    // Normalise: uppercase chars arrive with SHIFT on some terminals and without on others
    let binding = match key.code {
        KeyCode::Char(c) if c.is_ascii_uppercase() => {
            KeyBinding::new(key.code, key.modifiers | KeyModifiers::SHIFT)
        }
        _ => KeyBinding::new(key.code, key.modifiers),
    };

    if let Some((key, action)) = keymap.chord_for(&binding) {
        if app.pending_key == Some(key) {
            return action.clone();
        }
        return Action::Pending(key);
    }

    keymap.get(&binding).cloned().unwrap_or(Action::None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reelscroll_core::AppConfig;

    fn press(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    #[test]
    fn test_gg_needs_two_presses() {
        let keymap = Keymap::default();
        let mut app = App::new(AppConfig::default(), 80, 41);

        assert_eq!(handle_key_event(press('g'), &app, &keymap), Action::Pending('g'));
        app.pending_key = Some('g');
        assert_eq!(handle_key_event(press('g'), &app, &keymap), Action::JumpToTop);
    }

    #[test]
    fn test_uppercase_without_shift() {
        let keymap = Keymap::default();
        let app = App::new(AppConfig::default(), 80, 41);
        assert_eq!(handle_key_event(press('G'), &app, &keymap), Action::JumpToBottom);
    }
}
