//! Settings for the keybind engine
//!
//! Settings can be loaded from YAML or JSON; every field has a default so a
//! partial file is valid:
//!
//! ```yaml
//! autosave_delay_ms: 750
//! modifier_style: glyphs
//! fuzzy:
//!   min_term_len: 3
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::format::{DisplayFormatter, ModifierStyle, RECORDING_TOKEN};

/// Thresholds for typo-tolerant search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FuzzySettings {
    /// Sub-terms shorter than this only match as substrings
    pub min_term_len: usize,
    /// Haystack tokens shorter than this are never edit-distance matched
    pub min_token_len: usize,
    /// Largest edit distance still counted as a match
    pub max_distance: usize,
}

impl Default for FuzzySettings {
    fn default() -> Self {
        Self {
            min_term_len: 3,
            min_token_len: 4,
            max_distance: 1,
        }
    }
}

/// Engine settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeybindSettings {
    /// Quiet period before overrides are written back
    pub autosave_delay_ms: u64,
    pub modifier_style: ModifierStyle,
    /// Token shown on a binding control while recording
    pub recording_label: String,
    pub fuzzy: FuzzySettings,
}

impl Default for KeybindSettings {
    fn default() -> Self {
        Self {
            autosave_delay_ms: 500,
            modifier_style: ModifierStyle::default(),
            recording_label: RECORDING_TOKEN.to_string(),
            fuzzy: FuzzySettings::default(),
        }
    }
}

impl KeybindSettings {
    pub fn autosave_delay(&self) -> Duration {
        Duration::from_millis(self.autosave_delay_ms)
    }

    pub fn formatter(&self) -> DisplayFormatter {
        DisplayFormatter::new(self.modifier_style).with_recording_label(self.recording_label.clone())
    }

    pub fn from_yaml_str(content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Invalid(e.to_string()))
    }

    /// Load settings from a `.yaml`, `.yml` or `.json` file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        let settings = match extension.as_str() {
            "yaml" | "yml" => Self::from_yaml_str(&content)?,
            "json" => Self::from_json_str(&content)?,
            other => return Err(ConfigError::UnsupportedFormat(other.to_string())),
        };

        tracing::info!("Loaded keybind settings from {}", path.display());
        Ok(settings)
    }

    /// Load from the default location, falling back to defaults when no
    /// settings file exists
    pub fn load_or_default() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load(path),
            _ => Ok(Self::default()),
        }
    }

    /// `<config dir>/chat-keybinds/settings.yaml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("chat-keybinds").join("settings.yaml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = KeybindSettings::default();
        assert_eq!(settings.autosave_delay(), Duration::from_millis(500));
        assert_eq!(settings.fuzzy.min_term_len, 3);
        assert_eq!(settings.fuzzy.min_token_len, 4);
        assert_eq!(settings.fuzzy.max_distance, 1);
    }

    #[test]
    fn test_partial_yaml() {
        let settings = KeybindSettings::from_yaml_str(
            "autosave_delay_ms: 50\nmodifier_style: glyphs\nfuzzy:\n  max_distance: 2\n",
        )
        .unwrap();
        assert_eq!(settings.autosave_delay_ms, 50);
        assert_eq!(settings.modifier_style, ModifierStyle::Glyphs);
        assert_eq!(settings.fuzzy.max_distance, 2);
        assert_eq!(settings.fuzzy.min_term_len, 3);
        assert_eq!(settings.recording_label, RECORDING_TOKEN);
    }

    #[test]
    fn test_json_and_invalid() {
        let settings = KeybindSettings::from_json_str(r#"{"recording_label": "Listening"}"#).unwrap();
        assert_eq!(settings.recording_label, "Listening");
        assert!(KeybindSettings::from_json_str("{not json").is_err());
    }

    #[test]
    fn test_load_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = dir.path().join("settings.yaml");
        std::fs::write(&yaml, "autosave_delay_ms: 10\n").unwrap();
        assert_eq!(KeybindSettings::load(&yaml).unwrap().autosave_delay_ms, 10);

        let toml = dir.path().join("settings.toml");
        std::fs::write(&toml, "autosave_delay_ms = 10\n").unwrap();
        assert!(matches!(
            KeybindSettings::load(&toml),
            Err(ConfigError::UnsupportedFormat(_))
        ));

        assert!(matches!(
            KeybindSettings::load(dir.path().join("missing.yaml")),
            Err(ConfigError::Read { .. })
        ));
    }
}
