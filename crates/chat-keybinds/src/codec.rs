//! Binding codec: raw key events to canonical binding strings
//!
//! Normalization is pure and deterministic. Modifiers are written in the
//! fixed order `Meta`, `Control`, `Alt`, `Shift` regardless of the order the
//! user pressed them, letters are upper-cased and named keys use a single
//! spelling, so the same physical combination always yields the same bytes.

use std::str::FromStr;

use crate::models::{Binding, Key, KeyCombo, KeyEvent, Modifier, SEPARATOR};

/// Keys that never form a binding on their own or at all: modifiers, lock
/// keys and keys emitted while an input method is composing text.
const DENYLIST: &[&str] = &[
    "Control",
    "Shift",
    "Alt",
    "AltGraph",
    "Meta",
    "OS",
    "Super",
    "Hyper",
    "Fn",
    "FnLock",
    "CapsLock",
    "NumLock",
    "ScrollLock",
    "Dead",
    "Process",
    "Compose",
    "Unidentified",
];

fn is_denylisted(key: &str) -> bool {
    let key = key.trim();
    DENYLIST.iter().any(|d| d.eq_ignore_ascii_case(key))
}

/// Normalize a key press into a canonical binding.
///
/// Returns `None` for modifier-only presses, denylisted keys, composition
/// events and key names the codec does not recognise.
pub fn normalize(event: &KeyEvent) -> Option<Binding> {
    if event.is_composing || is_denylisted(&event.key) {
        return None;
    }

    match Key::from_str(&event.key) {
        Ok(key) => Some(KeyCombo::new(event.modifiers(), key).into()),
        Err(e) => {
            tracing::trace!("Ignoring key event {:?}: {}", event.key, e);
            None
        }
    }
}

/// Parse user-typed or persisted text into a canonical binding
pub fn parse_binding(text: &str) -> Option<Binding> {
    Binding::from_str(text).ok()
}

/// Spellings of a binding with each modifier independently replaced by any
/// of its aliases.
///
/// `Control+Alt+K` yields `Control+Alt+K`, `Ctrl+Alt+K`, `Ctrl+Opt+K` and
/// every other combination, so a search for any mix of spellings finds the
/// binding. The canonical form is always first.
pub fn spelling_variants(binding: &Binding) -> Vec<String> {
    let parts: Vec<&str> = binding.parts().collect();
    let Some((key, modifier_parts)) = parts.split_last() else {
        return Vec::new();
    };

    let modifiers: Vec<Modifier> = modifier_parts
        .iter()
        .filter_map(|p| Modifier::from_str(p).ok())
        .collect();

    // Cartesian product of alias columns, canonical spelling first in each
    let mut prefixes: Vec<String> = vec![String::new()];
    for modifier in &modifiers {
        prefixes = prefixes
            .iter()
            .flat_map(|prefix| {
                modifier
                    .aliases()
                    .iter()
                    .map(move |alias| format!("{}{}{}", prefix, alias, SEPARATOR))
            })
            .collect();
    }

    prefixes
        .into_iter()
        .map(|prefix| format!("{}{}", prefix, key))
        .collect()
}
