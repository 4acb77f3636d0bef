//! Persistence collaborator for user overrides
//!
//! # Storage Location
//!
//! [`FileSystemStore`] keeps one JSON file per profile:
//!
//! ```text
//! <config dir>/chat-keybinds/
//! ├── settings.yaml          # Engine settings (optional)
//! ├── default.json           # Overrides of the default profile
//! └── <user-id>.json         # Overrides of another profile
//! ```
//!
//! # File Format
//!
//! Only overrides are stored, never the full map. An explicit `null` means the
//! user cleared a default binding:
//!
//! ```json
//! {
//!   "version": 1,
//!   "overrides": {
//!     "toggle-deafen": "Control+Shift+X",
//!     "toggle-mute": null
//!   }
//! }
//! ```
//!
//! Entries whose binding no longer parses are dropped on load with a warning.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::PersistenceError;
use crate::models::{Binding, Overrides};

const FORMAT_VERSION: u32 = 1;

/// Loads and stores a user's overrides.
///
/// Delivery and ordering of writes is the store's concern; the engine only
/// guarantees it never issues two saves at once.
pub trait OverridesStore: Send + Sync {
    /// Load the persisted overrides, empty when nothing was stored yet
    fn load_overrides(&self) -> Result<Overrides, PersistenceError>;

    /// Replace the persisted overrides
    fn save_overrides(&self, overrides: &Overrides) -> Result<(), PersistenceError>;
}

#[derive(Serialize)]
struct StoredOverrides<'a> {
    version: u32,
    overrides: &'a Overrides,
}

#[derive(Deserialize)]
struct RawOverrides {
    #[serde(default)]
    version: u32,
    #[serde(default)]
    overrides: BTreeMap<String, Option<String>>,
}

/// File system based store, one file per profile
#[derive(Debug)]
pub struct FileSystemStore {
    config_dir: PathBuf,
    profile: String,
}

impl FileSystemStore {
    /// Create a store under `config_dir`, creating the directory if needed
    pub fn new(
        config_dir: impl AsRef<Path>,
        profile: impl Into<String>,
    ) -> Result<Self, PersistenceError> {
        let profile = profile.into();
        validate_profile(&profile)?;
        let config_dir = config_dir.as_ref().to_path_buf();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir).map_err(|e| {
                PersistenceError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to create config directory: {}", e),
                ))
            })?;
        }

        Ok(FileSystemStore {
            config_dir,
            profile,
        })
    }

    /// Create a store in `<config dir>/chat-keybinds`
    pub fn with_default_location(profile: impl Into<String>) -> Result<Self, PersistenceError> {
        let dir = dirs::config_dir()
            .ok_or(PersistenceError::NoConfigDir)?
            .join("chat-keybinds");
        Self::new(dir, profile)
    }

    /// Path of this profile's overrides file
    pub fn path(&self) -> PathBuf {
        self.config_dir.join(format!("{}.json", self.profile))
    }

    /// Get the config directory path
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }
}

/// Profile ids become file names, so they must stay inside the config dir
fn validate_profile(profile: &str) -> Result<(), PersistenceError> {
    let valid = !profile.is_empty()
        && profile != "."
        && profile != ".."
        && profile
            .chars()
            .all(|c| c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'));
    if valid {
        Ok(())
    } else {
        Err(PersistenceError::InvalidProfile(profile.to_string()))
    }
}

impl OverridesStore for FileSystemStore {
    fn load_overrides(&self) -> Result<Overrides, PersistenceError> {
        let path = self.path();
        if !path.exists() {
            return Ok(Overrides::new());
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                PersistenceError::PermissionDenied(path.to_string_lossy().to_string())
            } else {
                PersistenceError::IoError(e)
            }
        })?;

        let raw: RawOverrides = serde_json::from_str(&content).map_err(|e| {
            PersistenceError::CorruptedJson(format!("Failed to parse overrides: {}", e))
        })?;
        if raw.version > FORMAT_VERSION {
            tracing::warn!(
                "Overrides file {} has newer version {}; reading known fields only",
                path.display(),
                raw.version
            );
        }

        let mut overrides = Overrides::new();
        for (action_id, binding) in raw.overrides {
            match binding {
                None => {
                    overrides.insert(action_id, None);
                }
                Some(text) => match Binding::from_str(&text) {
                    Ok(binding) => {
                        overrides.insert(action_id, Some(binding));
                    }
                    Err(e) => {
                        tracing::warn!("Dropping override for {}: {}", action_id, e);
                    }
                },
            }
        }

        tracing::info!(
            "Loaded {} keybind overrides from {}",
            overrides.len(),
            path.display()
        );
        Ok(overrides)
    }

    fn save_overrides(&self, overrides: &Overrides) -> Result<(), PersistenceError> {
        let path = self.path();

        let json = serde_json::to_string_pretty(&StoredOverrides {
            version: FORMAT_VERSION,
            overrides,
        })
        .map_err(|e| {
            PersistenceError::SerializationError(format!("Failed to serialize overrides: {}", e))
        })?;

        fs::write(&path, json).map_err(|e| {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                PersistenceError::PermissionDenied(path.to_string_lossy().to_string())
            } else {
                PersistenceError::IoError(e)
            }
        })?;

        tracing::info!("Saved {} keybind overrides to {}", overrides.len(), path.display());
        Ok(())
    }
}

/// In-process store for guest sessions and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    overrides: Mutex<Overrides>,
    saves: Mutex<Vec<Overrides>>,
    fail_saves: Mutex<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with previously stored overrides
    pub fn with_overrides(overrides: Overrides) -> Self {
        MemoryStore {
            overrides: Mutex::new(overrides),
            ..Default::default()
        }
    }

    /// Make subsequent saves fail, simulating an unavailable backend
    pub fn set_fail_saves(&self, fail: bool) {
        *self.fail_saves.lock() = fail;
    }

    /// Every successful save, oldest first
    pub fn saves(&self) -> Vec<Overrides> {
        self.saves.lock().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.lock().len()
    }

    /// Currently stored overrides
    pub fn stored(&self) -> Overrides {
        self.overrides.lock().clone()
    }
}

impl OverridesStore for MemoryStore {
    fn load_overrides(&self) -> Result<Overrides, PersistenceError> {
        Ok(self.overrides.lock().clone())
    }

    fn save_overrides(&self, overrides: &Overrides) -> Result<(), PersistenceError> {
        if *self.fail_saves.lock() {
            return Err(PersistenceError::Unavailable(
                "memory store rejecting writes".to_string(),
            ));
        }
        *self.overrides.lock() = overrides.clone();
        self.saves.lock().push(overrides.clone());
        Ok(())
    }
}
