//! Host input events
//!
//! The host framework translates its native keyboard and pointer events into
//! these types before handing them to a widget. Keys are identified by the
//! names browsers use (`"ArrowDown"`, `"Enter"`, `"Escape"`, ...), so a DOM
//! host can forward `KeyboardEvent.key` verbatim through [`Key::from_name`].

use serde::{Deserialize, Serialize};

use crate::tree::NodeId;

/// A logical key
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    ArrowUp,
    ArrowDown,
    Home,
    End,
    Enter,
    Space,
    Escape,
    Tab,
    Backspace,
    /// A printable character
    Character(char),
    /// Any other named key, kept verbatim
    Other(String),
}

impl Key {
    /// Parse a key name as delivered by the host
    ///
    /// Single-character names become [`Key::Character`]; unknown multi-character
    /// names are preserved in [`Key::Other`].
    pub fn from_name(name: &str) -> Self {
        match name {
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "Home" => Key::Home,
            "End" => Key::End,
            "Enter" | "Return" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "Escape" | "Esc" => Key::Escape,
            "Tab" => Key::Tab,
            "Backspace" => Key::Backspace,
            _ => {
                let mut chars = name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Character(c),
                    _ => Key::Other(name.to_string()),
                }
            }
        }
    }

    /// Check if this key is the given character, ignoring ASCII case
    pub fn is_char_ignore_case(&self, expected: char) -> bool {
        matches!(self, Key::Character(c) if c.eq_ignore_ascii_case(&expected))
    }
}

/// Modifier keys held during a key event
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    pub fn meta() -> Self {
        Self {
            meta: true,
            ..Self::NONE
        }
    }

    /// Ctrl on Linux/Windows, Cmd on macOS. Either counts.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// A key press delivered by the host
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    /// Build an event from a host key name
    pub fn named(name: &str) -> Self {
        Self::new(Key::from_name(name))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Check for a Ctrl/Cmd + `c` chord
    pub fn is_command_chord(&self, c: char) -> bool {
        self.modifiers.command() && self.key.is_char_ignore_case(c)
    }
}

impl From<Key> for KeyEvent {
    fn from(key: Key) -> Self {
        KeyEvent::new(key)
    }
}

/// A pointer-down delivered by the host's document-level listener
///
/// `target` is the node the pointer landed on; widgets test it against their
/// anchor and panel subtrees through a [`Containment`](crate::tree::Containment).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PointerDown {
    pub target: NodeId,
}

impl PointerDown {
    pub fn on(target: NodeId) -> Self {
        Self { target }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_name() {
        assert_eq!(Key::from_name("ArrowDown"), Key::ArrowDown);
        assert_eq!(Key::from_name("ArrowUp"), Key::ArrowUp);
        assert_eq!(Key::from_name("Enter"), Key::Enter);
        assert_eq!(Key::from_name("Escape"), Key::Escape);
        assert_eq!(Key::from_name(" "), Key::Space);
        assert_eq!(Key::from_name("k"), Key::Character('k'));
        assert_eq!(Key::from_name("F5"), Key::Other("F5".to_string()));
    }

    #[test]
    fn test_command_chord() {
        let ctrl_k = KeyEvent::named("k").with_modifiers(Modifiers::ctrl());
        let cmd_k = KeyEvent::named("K").with_modifiers(Modifiers::meta());
        let plain_k = KeyEvent::named("k");

        assert!(ctrl_k.is_command_chord('k'));
        assert!(cmd_k.is_command_chord('k'));
        assert!(!plain_k.is_command_chord('k'));
    }
}
