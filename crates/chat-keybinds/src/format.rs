//! Display formatting for binding chips

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::{Binding, Key, Modifier};

/// Sentinel token shown while a binding is being recorded
pub const RECORDING_TOKEN: &str = "Recording...";

/// How modifier tokens are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModifierStyle {
    /// `Ctrl`, `Alt`, `Shift`, `Meta`
    #[default]
    Names,
    /// `⌃`, `⌥`, `⇧`, `⌘`
    Glyphs,
}

impl ModifierStyle {
    pub fn render(&self, modifier: Modifier) -> &'static str {
        match (self, modifier) {
            (ModifierStyle::Names, Modifier::Meta) => "Meta",
            (ModifierStyle::Names, Modifier::Control) => "Ctrl",
            (ModifierStyle::Names, Modifier::Alt) => "Alt",
            (ModifierStyle::Names, Modifier::Shift) => "Shift",
            (ModifierStyle::Glyphs, Modifier::Meta) => "⌘",
            (ModifierStyle::Glyphs, Modifier::Control) => "⌃",
            (ModifierStyle::Glyphs, Modifier::Alt) => "⌥",
            (ModifierStyle::Glyphs, Modifier::Shift) => "⇧",
        }
    }
}

/// Renders bindings as ordered display tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayFormatter {
    style: ModifierStyle,
    recording_label: String,
}

impl DisplayFormatter {
    pub fn new(style: ModifierStyle) -> Self {
        DisplayFormatter {
            style,
            recording_label: RECORDING_TOKEN.to_string(),
        }
    }

    pub fn with_recording_label(mut self, label: impl Into<String>) -> Self {
        self.recording_label = label.into();
        self
    }

    pub fn style(&self) -> ModifierStyle {
        self.style
    }

    /// Tokens for a binding in the order the codec wrote them.
    ///
    /// While `capturing`, the single recording sentinel is returned whatever
    /// the binding. An unassigned binding renders as no tokens.
    pub fn format(&self, binding: Option<&Binding>, capturing: bool) -> Vec<String> {
        if capturing {
            return vec![self.recording_label.clone()];
        }
        let Some(binding) = binding else {
            return Vec::new();
        };

        let parts: Vec<&str> = binding.parts().collect();
        let last = parts.len().saturating_sub(1);
        parts
            .iter()
            .enumerate()
            .map(|(idx, part)| {
                if idx < last {
                    match Modifier::from_str(part) {
                        Ok(m) => self.style.render(m).to_string(),
                        Err(_) => part.to_string(),
                    }
                } else {
                    Key::from_str(part)
                        .map(|k| k.label())
                        .unwrap_or_else(|_| part.to_string())
                }
            })
            .collect()
    }
}

impl Default for DisplayFormatter {
    fn default() -> Self {
        Self::new(ModifierStyle::default())
    }
}

/// Format with the default style and recording label
pub fn format_binding(binding: Option<&Binding>, capturing: bool) -> Vec<String> {
    DisplayFormatter::default().format(binding, capturing)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn binding(s: &str) -> Binding {
        Binding::from_str(s).unwrap()
    }

    #[test]
    fn test_format_names() {
        let tokens = format_binding(Some(&binding("Control+Shift+K")), false);
        assert_eq!(tokens, vec!["Ctrl", "Shift", "K"]);
    }

    #[test]
    fn test_format_glyphs() {
        let formatter = DisplayFormatter::new(ModifierStyle::Glyphs);
        let tokens = formatter.format(Some(&binding("Meta+Alt+Plus")), false);
        assert_eq!(tokens, vec!["⌘", "⌥", "+"]);
    }

    #[test]
    fn test_capturing_sentinel_ignores_binding() {
        assert_eq!(format_binding(Some(&binding("F5")), true), vec![RECORDING_TOKEN]);
        assert_eq!(format_binding(None, true), vec![RECORDING_TOKEN]);

        let formatter = DisplayFormatter::default().with_recording_label("Press keys");
        assert_eq!(formatter.format(None, true), vec!["Press keys"]);
    }

    #[test]
    fn test_unassigned_renders_empty() {
        assert!(format_binding(None, false).is_empty());
    }
}
