//! Keyboard and pointer input events.
//!
//! Hosts translate their native events into these types. Keys also have a
//! compact text notation (`j`, `G`, `<tab>`, `<s-tab>`, `<c-d>`) used by key
//! mapping files and the demo binary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{KeynavError, Result};

/// Modifier keys. Pressed on their own they produce a bare modifier event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Modifier {
    Shift,
    Control,
    Alt,
    Meta,
}

/// A logical key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// A printable character, already case-folded by the host.
    Char(char),
    Tab,
    Escape,
    Enter,
    Backspace,
    Space,
    /// A modifier key pressed by itself.
    Modifier(Modifier),
}

/// A key press together with the modifiers held at the time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl KeyEvent {
    /// A key press without modifiers.
    pub fn plain(key: Key) -> Self {
        Self {
            key,
            shift: false,
            ctrl: false,
            alt: false,
            meta: false,
        }
    }

    /// A printable character without modifiers.
    pub fn char(c: char) -> Self {
        Self::plain(Key::Char(c))
    }

    /// The key with Shift held.
    pub fn shifted(key: Key) -> Self {
        Self {
            shift: true,
            ..Self::plain(key)
        }
    }

    /// `true` when only a modifier key went down.
    pub fn is_bare_modifier(&self) -> bool {
        matches!(self.key, Key::Modifier(_))
    }

    /// The ASCII digit this key types, if it is an unmodified digit.
    pub fn digit(&self) -> Option<u32> {
        match self.key {
            Key::Char(c) if !self.ctrl && !self.alt && !self.meta => c.to_digit(10),
            _ => None,
        }
    }

    /// Render the event in key notation.
    ///
    /// Printable characters render as themselves (Shift is already reflected
    /// in the character); everything else uses the `<...>` form with
    /// `c-`, `a-`, `m-`, `s-` prefixes.
    pub fn notation(&self) -> String {
        let mut prefix = String::new();
        if self.ctrl {
            prefix.push_str("c-");
        }
        if self.alt {
            prefix.push_str("a-");
        }
        if self.meta {
            prefix.push_str("m-");
        }
        let named = match self.key {
            Key::Char(c) if prefix.is_empty() => return c.to_string(),
            Key::Char(c) => c.to_string(),
            Key::Tab => "tab".to_string(),
            Key::Escape => "esc".to_string(),
            Key::Enter => "enter".to_string(),
            Key::Backspace => "backspace".to_string(),
            Key::Space => "space".to_string(),
            Key::Modifier(Modifier::Shift) => "shift".to_string(),
            Key::Modifier(Modifier::Control) => "ctrl".to_string(),
            Key::Modifier(Modifier::Alt) => "alt".to_string(),
            Key::Modifier(Modifier::Meta) => "meta".to_string(),
        };
        if self.shift && !matches!(self.key, Key::Char(_)) {
            prefix.push_str("s-");
        }
        format!("<{prefix}{named}>")
    }

    /// Parse a run of key notation (`"gg"`, `"3j"`, `"<s-tab>x"`).
    pub fn parse_sequence(s: &str) -> Result<Vec<KeyEvent>> {
        let mut events = Vec::new();
        let mut rest = s;
        while let Some(c) = rest.chars().next() {
            if c == '<'
                && let Some(end) = rest.find('>')
                && end > 1
            {
                events.push(rest[..=end].parse()?);
                rest = &rest[end + 1..];
                continue;
            }
            events.push(KeyEvent::char(c));
            rest = &rest[c.len_utf8()..];
        }
        Ok(events)
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.notation())
    }
}

impl FromStr for KeyEvent {
    type Err = KeynavError;

    fn from_str(s: &str) -> Result<Self> {
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Ok(KeyEvent::char(c));
        }

        let inner = s
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| KeynavError::Key(s.to_string()))?;

        let mut event = KeyEvent::plain(Key::Space);
        let mut name = inner;
        loop {
            let lower = name.to_ascii_lowercase();
            if lower.starts_with("c-") && name.len() > 2 {
                event.ctrl = true;
            } else if lower.starts_with("a-") && name.len() > 2 {
                event.alt = true;
            } else if lower.starts_with("m-") && name.len() > 2 {
                event.meta = true;
            } else if lower.starts_with("s-") && name.len() > 2 {
                event.shift = true;
            } else {
                break;
            }
            name = &name[2..];
        }

        let mut name_chars = name.chars();
        event.key = match (name_chars.next(), name_chars.next()) {
            (Some(c), None) => Key::Char(c),
            _ => match name.to_ascii_lowercase().as_str() {
                "tab" => Key::Tab,
                "esc" | "escape" => Key::Escape,
                "enter" | "cr" | "return" => Key::Enter,
                "backspace" | "bs" => Key::Backspace,
                "space" => Key::Space,
                "shift" => Key::Modifier(Modifier::Shift),
                "ctrl" | "control" => Key::Modifier(Modifier::Control),
                "alt" => Key::Modifier(Modifier::Alt),
                "meta" => Key::Modifier(Modifier::Meta),
                _ => return Err(KeynavError::Key(s.to_string())),
            },
        };
        Ok(event)
    }
}

/// A platform-agnostic input event delivered to the active mode.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// A key went down.
    Key(KeyEvent),
    /// Pointer click at absolute page position.
    PointerClick { x: i32, y: i32 },
}
