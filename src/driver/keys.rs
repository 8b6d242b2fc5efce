//! Key codes and platform key chords
//!
//! Special keys are encoded as private-use code points (the WebDriver key
//! table) so that a key sequence stays a plain `String`. Modifier keys stay
//! held until [`Key::Null`] or the end of the sequence.

use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// Special keys
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Releases all held modifiers
    Null,
    Backspace,
    Tab,
    Enter,
    Shift,
    Control,
    Alt,
    Escape,
    ArrowLeft,
    ArrowUp,
    ArrowRight,
    ArrowDown,
    Delete,
    Command,
}

impl Key {
    const ALL: [Key; 14] = [
        Key::Null,
        Key::Backspace,
        Key::Tab,
        Key::Enter,
        Key::Shift,
        Key::Control,
        Key::Alt,
        Key::Escape,
        Key::ArrowLeft,
        Key::ArrowUp,
        Key::ArrowRight,
        Key::ArrowDown,
        Key::Delete,
        Key::Command,
    ];

    /// Code point carried in key sequences
    pub const fn code_point(self) -> char {
        match self {
            Key::Null => '\u{E000}',
            Key::Backspace => '\u{E003}',
            Key::Tab => '\u{E004}',
            Key::Enter => '\u{E007}',
            Key::Shift => '\u{E008}',
            Key::Control => '\u{E009}',
            Key::Alt => '\u{E00A}',
            Key::Escape => '\u{E00C}',
            Key::ArrowLeft => '\u{E012}',
            Key::ArrowUp => '\u{E013}',
            Key::ArrowRight => '\u{E014}',
            Key::ArrowDown => '\u{E015}',
            Key::Delete => '\u{E017}',
            Key::Command => '\u{E03D}',
        }
    }

    /// Decode a code point back into a special key
    pub fn from_code_point(ch: char) -> Option<Key> {
        Self::ALL.into_iter().find(|key| key.code_point() == ch)
    }

    /// Whether the key is held rather than typed
    pub const fn is_modifier(self) -> bool {
        matches!(self, Key::Shift | Key::Control | Key::Alt | Key::Command)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code_point())
    }
}

impl From<Key> for String {
    fn from(key: Key) -> Self {
        key.code_point().to_string()
    }
}

/// Host platform, used to pick key chords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Linux,
    Windows,
    Darwin,
}

impl Platform {
    /// Platform of the running process
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" | "ios" => Platform::Darwin,
            "windows" => Platform::Windows,
            _ => Platform::Linux,
        }
    }

    /// Modifier used for editing shortcuts
    pub const fn primary_modifier(self) -> Key {
        match self {
            Platform::Darwin => Key::Command,
            Platform::Linux | Platform::Windows => Key::Control,
        }
    }

    /// Key sequence that selects all text in the focused field
    pub fn select_all_chord(self) -> String {
        format!("{}a{}", self.primary_modifier(), Key::Null)
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(Platform::Linux),
            "windows" => Ok(Platform::Windows),
            "darwin" | "macos" => Ok(Platform::Darwin),
            other => Err(Error::configuration(format!("Unknown platform: {}", other))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_all_chord_per_platform() {
        assert_eq!(Platform::Linux.select_all_chord(), "\u{E009}a\u{E000}");
        assert_eq!(Platform::Windows.select_all_chord(), "\u{E009}a\u{E000}");
        assert_eq!(Platform::Darwin.select_all_chord(), "\u{E03D}a\u{E000}");
    }

    #[test]
    fn test_code_point_round_trip() {
        for key in Key::ALL {
            assert_eq!(Key::from_code_point(key.code_point()), Some(key));
        }
        assert_eq!(Key::from_code_point('a'), None);
    }

    #[test]
    fn test_platform_from_str() {
        assert_eq!("MacOS".parse::<Platform>().unwrap(), Platform::Darwin);
        assert!("beos".parse::<Platform>().is_err());
    }
}
