//! Inbound pointer and keyboard events

use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Modifiers {
    pub shift: bool,
    /// Ctrl on Linux/Windows, Cmd on macOS.
    pub command: bool,
    pub alt: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        command: false,
        alt: false,
    };

    pub fn shift() -> Self {
        Modifiers {
            shift: true,
            ..Modifiers::NONE
        }
    }

    pub fn command() -> Self {
        Modifiers {
            command: true,
            ..Modifiers::NONE
        }
    }
}

/// Pointer position in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointerEvent {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub modifiers: Modifiers,
    /// 1 for a single click, 2 for a double click.
    #[serde(default = "single_click")]
    pub click_count: u8,
}

fn single_click() -> u8 {
    1
}

impl PointerEvent {
    pub fn at(x: f64, y: f64) -> Self {
        PointerEvent {
            x,
            y,
            modifiers: Modifiers::NONE,
            click_count: 1,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn double(mut self) -> Self {
        self.click_count = 2;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Char(char),
    Escape,
    Enter,
    Space,
    Delete,
    Backspace,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Comma,
    Period,
}

impl FromStr for Key {
    type Err = ();

    /// Parse a DOM `KeyboardEvent.key` value.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = match s {
            "Escape" | "Esc" => Key::Escape,
            "Enter" => Key::Enter,
            " " | "Space" | "Spacebar" => Key::Space,
            "Delete" | "Del" => Key::Delete,
            "Backspace" => Key::Backspace,
            "ArrowUp" | "Up" => Key::ArrowUp,
            "ArrowDown" | "Down" => Key::ArrowDown,
            "ArrowLeft" | "Left" => Key::ArrowLeft,
            "ArrowRight" | "Right" => Key::ArrowRight,
            "," => Key::Comma,
            "." => Key::Period,
            other => {
                let mut chars = other.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c.to_ascii_lowercase()),
                    _ => return Err(()),
                }
            }
        };
        Ok(key)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        KeyEvent {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        KeyEvent { key, modifiers }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dom_key_names() {
        assert_eq!("Escape".parse::<Key>(), Ok(Key::Escape));
        assert_eq!(" ".parse::<Key>(), Ok(Key::Space));
        assert_eq!(",".parse::<Key>(), Ok(Key::Comma));
        assert_eq!("Z".parse::<Key>(), Ok(Key::Char('z')));
        assert_eq!("F5".parse::<Key>(), Err(()));
    }
}
