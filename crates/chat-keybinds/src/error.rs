//! Error types for keybind operations

use thiserror::Error;

/// Errors that can occur while parsing key names, bindings and catalogues
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Invalid JSON syntax: {0}")]
    InvalidJson(String),

    #[error("Invalid YAML syntax: {0}")]
    InvalidYaml(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid key syntax: {0}")]
    InvalidKeySyntax(String),

    #[error("Invalid modifier: {0}")]
    InvalidModifier(String),

    #[error("Unsupported catalogue format: {0}")]
    UnsupportedFormat(String),

    #[error("Parse error in entry {entry}: {message}")]
    EntryError { entry: usize, message: String },
}

/// Errors raised while building the definition registry.
///
/// Every variant is a configuration defect: a registry that fails
/// validation must never be used.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Duplicate action ID: {0}")]
    DuplicateActionId(String),

    #[error("Invalid action ID format: {0}")]
    InvalidActionIdFormat(String),

    #[error("Duplicate group name: {0}")]
    DuplicateGroup(String),

    #[error("Action {action_id} uses unknown group {group}")]
    UnknownGroup { action_id: String, group: String },

    #[error("Default binding {binding} is shared by {first} and {second}")]
    DuplicateDefaultBinding {
        binding: String,
        first: String,
        second: String,
    },

    #[error("Default binding {binding} of {action_id} is reserved while recording")]
    UnrecordableDefault { action_id: String, binding: String },

    #[error("Catalogue error: {0}")]
    Catalogue(#[from] ParseError),
}

/// Errors that can occur in the persistence layer
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Corrupted JSON: {0}")]
    CorruptedJson(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("No config directory available on this platform")]
    NoConfigDir,

    #[error("Invalid profile id: {0}")]
    InvalidProfile(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors that can occur while loading settings
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings: {0}")]
    Invalid(String),

    #[error("Unsupported settings format: {0}")]
    UnsupportedFormat(String),
}

/// Errors that can occur in the keybind engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Persistence error: {0}")]
    PersistenceError(#[from] PersistenceError),

    #[error("Unknown action: {0}")]
    UnknownAction(String),
}
