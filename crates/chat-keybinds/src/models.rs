//! Core data models for keybinds

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// Separator between the parts of a canonical binding string
pub const SEPARATOR: char = '+';

/// Represents a keyboard modifier.
///
/// Declaration order is the canonical order used when writing bindings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Meta,
    Control,
    Alt,
    Shift,
}

impl Modifier {
    /// All modifiers in canonical order
    pub const ALL: [Modifier; 4] = [
        Modifier::Meta,
        Modifier::Control,
        Modifier::Alt,
        Modifier::Shift,
    ];

    /// Canonical spelling used inside binding strings
    pub fn name(&self) -> &'static str {
        match self {
            Modifier::Meta => "Meta",
            Modifier::Control => "Control",
            Modifier::Alt => "Alt",
            Modifier::Shift => "Shift",
        }
    }

    /// Every spelling users type for this modifier, canonical first
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            Modifier::Meta => &["Meta", "Cmd", "Command", "Super", "Win", "OS"],
            Modifier::Control => &["Control", "Ctrl", "Ctl"],
            Modifier::Alt => &["Alt", "Option", "Opt"],
            Modifier::Shift => &["Shift"],
        }
    }
}

impl fmt::Display for Modifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Modifier {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Modifier::ALL
            .into_iter()
            .find(|m| m.aliases().iter().any(|a| a.eq_ignore_ascii_case(name)))
            .ok_or_else(|| ParseError::InvalidModifier(s.to_string()))
    }
}

/// Named ASCII punctuation. Spelling punctuation by name keeps `+` free
/// for use as the binding separator.
const PUNCTUATION: &[(char, &str)] = &[
    ('!', "Exclamation"),
    ('@', "At"),
    ('#', "Hash"),
    ('$', "Dollar"),
    ('%', "Percent"),
    ('^', "Caret"),
    ('&', "Ampersand"),
    ('*', "Asterisk"),
    ('(', "ParenLeft"),
    (')', "ParenRight"),
    ('-', "Minus"),
    ('_', "Underscore"),
    ('=', "Equal"),
    ('+', "Plus"),
    ('[', "BracketLeft"),
    (']', "BracketRight"),
    ('{', "BraceLeft"),
    ('}', "BraceRight"),
    ('\\', "Backslash"),
    ('|', "Pipe"),
    (';', "Semicolon"),
    (':', "Colon"),
    ('\'', "Quote"),
    ('"', "DoubleQuote"),
    (',', "Comma"),
    ('.', "Period"),
    ('<', "Less"),
    ('>', "Greater"),
    ('/', "Slash"),
    ('?', "Question"),
    ('`', "Backquote"),
    ('~', "Tilde"),
];

fn punctuation_name(c: char) -> Option<&'static str> {
    PUNCTUATION.iter().find(|(p, _)| *p == c).map(|(_, n)| *n)
}

fn punctuation_by_name(name: &str) -> Option<char> {
    PUNCTUATION
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(p, _)| *p)
}

/// Represents a non-modifier key on the keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Letters (always upper-case), digits and other printable characters
    Char(char),
    /// ASCII punctuation, displayed by name
    Punct(char),
    F(u8),
    Enter,
    Escape,
    Tab,
    Backspace,
    Delete,
    Insert,
    Space,
    Home,
    End,
    PageUp,
    PageDown,
    Up,
    Down,
    Left,
    Right,
}

impl Key {
    /// Human-friendly label: punctuation renders as its glyph
    pub fn label(&self) -> String {
        match self {
            Key::Punct(c) => c.to_string(),
            other => other.to_string(),
        }
    }

    fn from_char(c: char) -> Result<Key, ParseError> {
        if c.is_ascii_alphabetic() {
            Ok(Key::Char(c.to_ascii_uppercase()))
        } else if c.is_ascii_digit() {
            Ok(Key::Char(c))
        } else if c == ' ' {
            Ok(Key::Space)
        } else if punctuation_name(c).is_some() {
            Ok(Key::Punct(c))
        } else if c.is_control() || c.is_whitespace() {
            Err(ParseError::InvalidKeySyntax(format!(
                "Unprintable key: {:?}",
                c
            )))
        } else {
            let mut upper = c.to_uppercase();
            match (upper.next(), upper.next()) {
                (Some(u), None) => Ok(Key::Char(u)),
                _ => Ok(Key::Char(c)),
            }
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Char(c) => write!(f, "{}", c),
            Key::Punct(c) => f.write_str(punctuation_name(*c).unwrap_or("Unknown")),
            Key::F(n) => write!(f, "F{}", n),
            Key::Enter => write!(f, "Enter"),
            Key::Escape => write!(f, "Escape"),
            Key::Tab => write!(f, "Tab"),
            Key::Backspace => write!(f, "Backspace"),
            Key::Delete => write!(f, "Delete"),
            Key::Insert => write!(f, "Insert"),
            Key::Space => write!(f, "Space"),
            Key::Home => write!(f, "Home"),
            Key::End => write!(f, "End"),
            Key::PageUp => write!(f, "PageUp"),
            Key::PageDown => write!(f, "PageDown"),
            Key::Up => write!(f, "Up"),
            Key::Down => write!(f, "Down"),
            Key::Left => write!(f, "Left"),
            Key::Right => write!(f, "Right"),
        }
    }
}

impl FromStr for Key {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // A lone space is a real key name, so inspect before trimming.
        let mut chars = s.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::from_char(c);
        }

        let trimmed = s.trim();
        match trimmed.to_lowercase().as_str() {
            "enter" | "return" => Ok(Key::Enter),
            "escape" | "esc" => Ok(Key::Escape),
            "tab" => Ok(Key::Tab),
            "backspace" | "bksp" => Ok(Key::Backspace),
            "delete" | "del" => Ok(Key::Delete),
            "insert" | "ins" => Ok(Key::Insert),
            "space" | "spacebar" => Ok(Key::Space),
            "home" => Ok(Key::Home),
            "end" => Ok(Key::End),
            "pageup" | "page_up" => Ok(Key::PageUp),
            "pagedown" | "page_down" => Ok(Key::PageDown),
            "up" | "arrowup" => Ok(Key::Up),
            "down" | "arrowdown" => Ok(Key::Down),
            "left" | "arrowleft" => Ok(Key::Left),
            "right" | "arrowright" => Ok(Key::Right),
            lower if lower.len() == 1 => Key::from_char(trimmed.chars().next().unwrap_or(' ')),
            lower if lower.starts_with('f') && lower[1..].chars().all(|c| c.is_ascii_digit()) => {
                let num: u8 = lower[1..].parse().map_err(|_| {
                    ParseError::InvalidKeySyntax(format!("Invalid function key: {}", s))
                })?;
                if (1..=24).contains(&num) {
                    Ok(Key::F(num))
                } else {
                    Err(ParseError::InvalidKeySyntax(format!(
                        "Function key must be F1-F24, got: {}",
                        s
                    )))
                }
            }
            _ => punctuation_by_name(trimmed)
                .map(Key::Punct)
                .ok_or_else(|| ParseError::InvalidKeySyntax(format!("Unknown key: {}", s))),
        }
    }
}

/// A key combination (modifiers + key) with modifiers kept in canonical order
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    modifiers: Vec<Modifier>,
    key: Key,
}

impl KeyCombo {
    /// Build a combination, sorting and de-duplicating the modifiers
    pub fn new(modifiers: impl IntoIterator<Item = Modifier>, key: Key) -> Self {
        let mut modifiers: Vec<Modifier> = modifiers.into_iter().collect();
        modifiers.sort();
        modifiers.dedup();
        KeyCombo { modifiers, key }
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    pub fn key(&self) -> Key {
        self.key
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for modifier in &self.modifiers {
            write!(f, "{}{}", modifier, SEPARATOR)?;
        }
        write!(f, "{}", self.key)
    }
}

impl FromStr for KeyCombo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::InvalidKeySyntax(
                "Empty key combination".to_string(),
            ));
        }

        // "Control++" and "+" name the plus key itself.
        let (modifier_part, key_part) = if s == "+" {
            ("", "+")
        } else if let Some(prefix) = s.strip_suffix("++") {
            (prefix, "+")
        } else {
            match s.rfind(SEPARATOR) {
                Some(idx) => (&s[..idx], &s[idx + 1..]),
                None => ("", s),
            }
        };

        let mut modifiers = Vec::new();
        if !modifier_part.is_empty() {
            for part in modifier_part.split(SEPARATOR) {
                modifiers.push(Modifier::from_str(part)?);
            }
        }

        let key = Key::from_str(key_part)?;
        Ok(KeyCombo::new(modifiers, key))
    }
}

/// Canonical binding string.
///
/// Only produced by the codec: either by normalizing a key event or by
/// parsing text through [`KeyCombo`], which re-canonicalizes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding(String);

impl Binding {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parts of the binding in canonical order, modifiers first
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.0.split(SEPARATOR)
    }

    /// Structured form of the binding
    pub fn combo(&self) -> Result<KeyCombo, ParseError> {
        KeyCombo::from_str(&self.0)
    }
}

impl From<KeyCombo> for Binding {
    fn from(combo: KeyCombo) -> Self {
        Binding(combo.to_string())
    }
}

impl FromStr for Binding {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        KeyCombo::from_str(s).map(Binding::from)
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Binding {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Binding {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Binding {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Binding::from_str(&raw).map_err(serde::de::Error::custom)
    }
}

/// A raw key-press observation as reported by the host
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    /// Key name as reported by the platform (`"k"`, `"Escape"`, `"Shift"`, ...)
    pub key: String,
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub meta: bool,
    /// Set while an input method is composing text
    #[serde(default)]
    pub is_composing: bool,
}

impl KeyEvent {
    /// Create an event for a key with no modifiers held
    pub fn new(key: impl Into<String>) -> Self {
        KeyEvent {
            key: key.into(),
            ..Default::default()
        }
    }

    /// Create an event for a key with the given modifiers held, in any order
    pub fn with_modifiers(key: impl Into<String>, modifiers: &[Modifier]) -> Self {
        let mut event = KeyEvent::new(key);
        for modifier in modifiers {
            event.set_modifier(*modifier);
        }
        event
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn meta(mut self) -> Self {
        self.meta = true;
        self
    }

    fn set_modifier(&mut self, modifier: Modifier) {
        match modifier {
            Modifier::Meta => self.meta = true,
            Modifier::Control => self.ctrl = true,
            Modifier::Alt => self.alt = true,
            Modifier::Shift => self.shift = true,
        }
    }

    /// Held modifiers in canonical order
    pub fn modifiers(&self) -> Vec<Modifier> {
        Modifier::ALL
            .into_iter()
            .filter(|m| match m {
                Modifier::Meta => self.meta,
                Modifier::Control => self.ctrl,
                Modifier::Alt => self.alt,
                Modifier::Shift => self.shift,
            })
            .collect()
    }

    /// Check whether the primary key matches a key name, ignoring modifiers
    pub fn is_key(&self, key: Key) -> bool {
        Key::from_str(&self.key).map(|k| k == key).unwrap_or(false)
    }
}

/// Immutable description of one bindable action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeybindDefinition {
    pub id: String,
    pub label: String,
    pub group: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub default_binding: Option<Binding>,
    /// Rendered as a badge only; conflict detection does not treat it specially
    #[serde(default)]
    pub global: bool,
}

impl KeybindDefinition {
    /// Create an unbound definition
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        group: impl Into<String>,
    ) -> Self {
        KeybindDefinition {
            id: id.into(),
            label: label.into(),
            group: group.into(),
            description: None,
            default_binding: None,
            global: false,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_default(mut self, binding: Binding) -> Self {
        self.default_binding = Some(binding);
        self
    }

    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }
}

/// User overrides as persisted: absent ids use the default, `None` clears it
pub type Overrides = BTreeMap<String, Option<Binding>>;

/// The live binding for every known action
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeybindMap {
    entries: BTreeMap<String, Option<Binding>>,
}

impl KeybindMap {
    /// Current binding of an action, `None` when unassigned or unknown
    pub fn get(&self, action_id: &str) -> Option<&Binding> {
        self.entries.get(action_id).and_then(Option::as_ref)
    }

    /// Distinguishes an unknown id (`None`) from an unassigned one (`Some(None)`)
    pub fn entry(&self, action_id: &str) -> Option<Option<&Binding>> {
        self.entries.get(action_id).map(Option::as_ref)
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.entries.contains_key(action_id)
    }

    /// Set the binding of a known action. Unknown ids are rejected so the
    /// map never grows beyond the registry.
    pub fn set(&mut self, action_id: &str, binding: Option<Binding>) -> bool {
        match self.entries.get_mut(action_id) {
            Some(slot) => {
                *slot = binding;
                true
            }
            None => false,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Binding>)> {
        self.entries
            .iter()
            .map(|(id, binding)| (id.as_str(), binding.as_ref()))
    }

    pub fn action_ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, Option<Binding>)> for KeybindMap {
    fn from_iter<I: IntoIterator<Item = (String, Option<Binding>)>>(iter: I) -> Self {
        KeybindMap {
            entries: iter.into_iter().collect(),
        }
    }
}
