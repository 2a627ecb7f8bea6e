use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyModifiers};
use reelscroll_core::config::KeymapConfig;
use tracing::warn;

use crate::input::Action;

/// A key press as the event loop sees it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    pub fn plain(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(KeyCode::Char(c.to_ascii_lowercase()), KeyModifiers::CONTROL)
    }

    /// Uppercase letters carry SHIFT so `G` and `g` stay distinct
    pub fn from_char(c: char) -> Self {
        if c.is_ascii_uppercase() {
            Self::new(KeyCode::Char(c), KeyModifiers::SHIFT)
        } else {
            Self::plain(KeyCode::Char(c))
        }
    }

    /// Parse one key in the notation `KeymapConfig` documents:
    /// `j`, `G`, `<C-d>`, `<Space>`, `<PageDown>`.
    pub fn parse(notation: &str) -> Option<Self> {
        let notation = notation.trim();
        let Some(inner) = notation
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
        else {
            return lone_char(notation).map(Self::from_char);
        };

        match inner.split_once('-') {
            Some((modifier, key)) if modifier.eq_ignore_ascii_case("c") => {
                lone_char(key).map(Self::ctrl)
            }
            Some(_) => None,
            None => named_key(inner).map(Self::plain),
        }
    }
}

/// Two presses of the same key, like `gg`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Chord {
    key: char,
    action: Action,
}

impl Chord {
    fn parse(notation: &str, action: Action) -> Option<Self> {
        let mut chars = notation.trim().chars();
        match (chars.next(), chars.next(), chars.next()) {
            (Some(a), Some(b), None) if a == b && !a.is_ascii_uppercase() => {
                Some(Self { key: a, action })
            }
            _ => None,
        }
    }
}

/// Key-to-action lookup built from [`KeymapConfig`]
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
    chord: Option<Chord>,
}

impl Default for Keymap {
    fn default() -> Self {
        Self::from_config(&KeymapConfig::default())
    }
}

impl Keymap {
    pub fn from_config(config: &KeymapConfig) -> Self {
        let mut keymap = Self {
            bindings: HashMap::new(),
            chord: None,
        };

        for (notation, action) in [
            (&config.quit, Action::Quit),
            (&config.scroll_down, Action::ScrollDown),
            (&config.scroll_up, Action::ScrollUp),
            (&config.page_down, Action::PageDown),
            (&config.page_up, Action::PageUp),
            (&config.jump_to_top, Action::JumpToTop),
            (&config.jump_to_bottom, Action::JumpToBottom),
            (&config.toggle_pause, Action::TogglePause),
            (&config.rescan, Action::Rescan),
        ] {
            keymap.bind(notation, action);
        }

        // Ctrl+C quits whatever the config says; arrows and paging keys fill gaps
        keymap.bindings.insert(KeyBinding::ctrl('c'), Action::Quit);
        for (code, action) in [
            (KeyCode::Down, Action::ScrollDown),
            (KeyCode::Up, Action::ScrollUp),
            (KeyCode::PageDown, Action::PageDown),
            (KeyCode::PageUp, Action::PageUp),
            (KeyCode::Home, Action::JumpToTop),
            (KeyCode::End, Action::JumpToBottom),
        ] {
            keymap.bindings.entry(KeyBinding::plain(code)).or_insert(action);
        }

        keymap
    }

    fn bind(&mut self, notation: &str, action: Action) {
        if let Some(chord) = Chord::parse(notation, action.clone()) {
            if let Some(existing) = &self.chord {
                warn!(
                    "Only one double-press binding is supported, '{}' stays on {:?}",
                    existing.key, existing.action
                );
            } else {
                self.chord = Some(chord);
            }
            return;
        }

        let Some(binding) = KeyBinding::parse(notation) else {
            warn!("Invalid key binding '{}' for {:?}, ignoring it", notation, action);
            return;
        };
        if let Some(existing) = self.bindings.get(&binding) {
            warn!(
                "Key conflict: '{}' already bound to {:?}, ignoring binding to {:?}",
                notation, existing, action
            );
            return;
        }
        self.bindings.insert(binding, action);
    }

    pub fn get(&self, binding: &KeyBinding) -> Option<&Action> {
        self.bindings.get(binding)
    }

    /// The chord `binding` starts, as its key and the action it completes to
    pub fn chord_for(&self, binding: &KeyBinding) -> Option<(char, &Action)> {
        let chord = self.chord.as_ref()?;
        let starts = binding.code == KeyCode::Char(chord.key) && binding.modifiers.is_empty();
        starts.then_some((chord.key, &chord.action))
    }
}

fn lone_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

fn named_key(name: &str) -> Option<KeyCode> {
    let code = match name.to_ascii_lowercase().as_str() {
        "space" => KeyCode::Char(' '),
        "cr" | "enter" => KeyCode::Enter,
        "esc" => KeyCode::Esc,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(c: char) -> KeyBinding {
        KeyBinding::from_char(c)
    }

    #[test]
    fn test_default_bindings() {
        let keymap = Keymap::default();

        assert_eq!(keymap.get(&key('j')), Some(&Action::ScrollDown));
        assert_eq!(keymap.get(&key('p')), Some(&Action::TogglePause));
        assert_eq!(keymap.get(&key('r')), Some(&Action::Rescan));
        assert_eq!(keymap.get(&key('G')), Some(&Action::JumpToBottom));
        assert_eq!(keymap.get(&KeyBinding::ctrl('u')), Some(&Action::PageUp));
        assert_eq!(keymap.get(&KeyBinding::ctrl('c')), Some(&Action::Quit));
        assert_eq!(
            keymap.get(&KeyBinding::plain(KeyCode::End)),
            Some(&Action::JumpToBottom)
        );
        assert_eq!(keymap.get(&key('g')), None);
    }

    #[test]
    fn test_gg_is_a_chord() {
        let keymap = Keymap::default();
        assert_eq!(keymap.chord_for(&key('g')), Some(('g', &Action::JumpToTop)));
        assert_eq!(keymap.chord_for(&key('G')), None);
        assert_eq!(keymap.chord_for(&KeyBinding::ctrl('g')), None);
    }

    #[test]
    fn test_named_and_ctrl_notation() {
        assert_eq!(
            KeyBinding::parse("<Space>"),
            Some(KeyBinding::plain(KeyCode::Char(' ')))
        );
        assert_eq!(
            KeyBinding::parse("<pagedown>"),
            Some(KeyBinding::plain(KeyCode::PageDown))
        );
        assert_eq!(KeyBinding::parse("<C-D>"), Some(KeyBinding::ctrl('d')));
        assert_eq!(KeyBinding::parse("<A-x>"), None);
        assert_eq!(KeyBinding::parse("<F5>"), None);
        assert_eq!(KeyBinding::parse("jk"), None);
    }

    #[test]
    fn test_custom_bindings_replace_defaults() {
        let config = KeymapConfig {
            page_down: "<Space>".to_string(),
            toggle_pause: "<Esc>".to_string(),
            jump_to_top: "tt".to_string(),
            ..Default::default()
        };
        let keymap = Keymap::from_config(&config);

        assert_eq!(
            keymap.get(&KeyBinding::plain(KeyCode::Char(' '))),
            Some(&Action::PageDown)
        );
        assert_eq!(
            keymap.get(&KeyBinding::plain(KeyCode::Esc)),
            Some(&Action::TogglePause)
        );
        assert_eq!(keymap.get(&key('p')), None);
        assert_eq!(keymap.chord_for(&key('t')), Some(('t', &Action::JumpToTop)));
        assert_eq!(keymap.chord_for(&key('g')), None);
    }

    #[test]
    fn test_conflicting_binding_keeps_first() {
        let config = KeymapConfig {
            rescan: "q".to_string(),
            ..Default::default()
        };
        let keymap = Keymap::from_config(&config);
        assert_eq!(keymap.get(&key('q')), Some(&Action::Quit));
        assert_eq!(keymap.get(&key('r')), None);
    }

    #[test]
    fn test_invalid_binding_is_skipped() {
        let config = KeymapConfig {
            scroll_down: "<Hyper-j>".to_string(),
            ..Default::default()
        };
        let keymap = Keymap::from_config(&config);
        assert_eq!(keymap.get(&key('j')), None);
        // The arrow fallback still scrolls
        assert_eq!(
            keymap.get(&KeyBinding::plain(KeyCode::Down)),
            Some(&Action::ScrollDown)
        );
    }
}
