//! Keyboard shortcut configuration for a chat client
//!
//! This crate provides the engine behind a keybind settings surface:
//! - Definition registry of bindable actions, built in or loaded from JSON/YAML
//! - Canonical binding codec and display formatting
//! - Override merging against defaults
//! - Conflict detection and typo-tolerant search
//! - Interactive capture of new bindings
//! - Debounced persistence of user overrides

pub mod autosave;
pub mod capture;
pub mod codec;
pub mod config;
pub mod conflict;
pub mod engine;
pub mod error;
pub mod format;
pub mod merge;
pub mod models;
pub mod parser;
pub mod persistence;
pub mod registry;
pub mod search;

// Re-export public types
pub use autosave::{Autosave, SaveDebouncer, SaveScheduler, SaveStatus, WriteThrough};
pub use capture::{CaptureController, CaptureOutcome, CaptureState};
pub use codec::{normalize, parse_binding};
pub use config::{FuzzySettings, KeybindSettings};
pub use conflict::{Conflict, ConflictDetector, ConflictIndex};
pub use engine::KeybindEngine;
pub use error::{ConfigError, EngineError, ParseError, PersistenceError, RegistryError};
pub use format::{format_binding, DisplayFormatter, ModifierStyle};
pub use merge::KeybindMerger;
pub use models::{
    Binding, Key, KeyCombo, KeyEvent, KeybindDefinition, KeybindMap, Modifier, Overrides,
};
pub use parser::{CatalogParser, Catalogue, JsonCatalogParser, ParserRegistry, YamlCatalogParser};
pub use persistence::{FileSystemStore, MemoryStore, OverridesStore};
pub use registry::DefinitionRegistry;
pub use search::{matches_search, FilterType, SearchIndex, SearchQuery, Section};
