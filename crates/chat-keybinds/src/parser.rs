//! Definition catalogue parsers for JSON and YAML formats
//!
//! A catalogue lists the group order followed by the definitions:
//!
//! ```yaml
//! groups: [Voice]
//! definitions:
//!   - id: toggle-mute
//!     label: Toggle mute
//!     group: Voice
//!     default_binding: ctrl+shift+m
//!     global: true
//! ```
//!
//! Default bindings pass through the codec, so any accepted spelling is
//! stored canonically.

use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{ParseError, RegistryError};
use crate::models::KeybindDefinition;
use crate::registry::DefinitionRegistry;

/// Raw catalogue contents before registry validation
#[derive(Debug, Clone, Deserialize)]
pub struct Catalogue {
    pub groups: Vec<String>,
    pub definitions: Vec<KeybindDefinition>,
}

impl Catalogue {
    /// Validate the catalogue into a registry
    pub fn into_registry(self) -> Result<DefinitionRegistry, RegistryError> {
        DefinitionRegistry::new(self.groups, self.definitions)
    }
}

/// Trait for parsing definition catalogues
pub trait CatalogParser: Send + Sync {
    /// Parse catalogue from content
    fn parse(&self, content: &str) -> Result<Catalogue, ParseError>;
}

/// JSON catalogue parser
pub struct JsonCatalogParser;

impl CatalogParser for JsonCatalogParser {
    fn parse(&self, content: &str) -> Result<Catalogue, ParseError> {
        let value: serde_json::Value =
            serde_json::from_str(content).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let groups = value
            .get("groups")
            .cloned()
            .ok_or_else(|| ParseError::MissingField("groups".to_string()))?;
        let groups: Vec<String> =
            serde_json::from_value(groups).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

        let items = value
            .get("definitions")
            .and_then(|v| v.as_array())
            .ok_or_else(|| ParseError::MissingField("definitions".to_string()))?;

        let mut definitions = Vec::with_capacity(items.len());
        for (idx, item) in items.iter().enumerate() {
            let definition: KeybindDefinition =
                serde_json::from_value(item.clone()).map_err(|e| ParseError::EntryError {
                    entry: idx + 1,
                    message: e.to_string(),
                })?;
            definitions.push(definition);
        }

        Ok(Catalogue {
            groups,
            definitions,
        })
    }
}

/// YAML catalogue parser
pub struct YamlCatalogParser;

impl CatalogParser for YamlCatalogParser {
    fn parse(&self, content: &str) -> Result<Catalogue, ParseError> {
        serde_yaml::from_str(content).map_err(|e| ParseError::InvalidYaml(e.to_string()))
    }
}

/// Registry for catalogue parsers keyed by format name
pub struct ParserRegistry {
    parsers: HashMap<String, Arc<dyn CatalogParser>>,
}

impl ParserRegistry {
    /// Create a new parser registry with the JSON and YAML parsers
    pub fn new() -> Self {
        let mut parsers = HashMap::new();
        parsers.insert("json".to_string(), Arc::new(JsonCatalogParser) as Arc<dyn CatalogParser>);
        parsers.insert("yaml".to_string(), Arc::new(YamlCatalogParser) as Arc<dyn CatalogParser>);
        parsers.insert("yml".to_string(), Arc::new(YamlCatalogParser) as Arc<dyn CatalogParser>);

        ParserRegistry { parsers }
    }

    /// Register a custom parser for a format
    pub fn register(&mut self, format: impl Into<String>, parser: Arc<dyn CatalogParser>) {
        self.parsers.insert(format.into(), parser);
    }

    /// Get a parser for a specific format
    pub fn get_parser(&self, format: &str) -> Option<Arc<dyn CatalogParser>> {
        self.parsers.get(&format.to_lowercase()).cloned()
    }

    /// Parse content using the parser registered for `format`
    pub fn parse(&self, content: &str, format: &str) -> Result<Catalogue, ParseError> {
        let parser = self
            .get_parser(format)
            .ok_or_else(|| ParseError::UnsupportedFormat(format.to_string()))?;
        parser.parse(content)
    }

    /// Try JSON first, then fall back to YAML
    pub fn parse_auto(&self, content: &str) -> Result<Catalogue, ParseError> {
        if let Ok(catalogue) = self.parse(content, "json") {
            return Ok(catalogue);
        }
        self.parse(content, "yaml")
    }

    /// Parse and validate a catalogue into a registry
    pub fn load_registry(
        &self,
        content: &str,
        format: &str,
    ) -> Result<DefinitionRegistry, RegistryError> {
        self.parse(content, format)?.into_registry()
    }
}

impl Default for ParserRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: &str = r#"{
        "groups": ["Voice", "Interface"],
        "definitions": [
            {
                "id": "toggle-mute",
                "label": "Toggle mute",
                "group": "Voice",
                "default_binding": "ctrl+shift+m",
                "global": true
            },
            {
                "id": "toggle-sidebar",
                "label": "Toggle sidebar",
                "group": "Interface",
                "description": "Show or hide the channel list"
            }
        ]
    }"#;

    const YAML: &str = r#"
groups: [Voice]
definitions:
  - id: toggle-mute
    label: Toggle mute
    group: Voice
    default_binding: Cmd+M
"#;

    #[test]
    fn test_parser_registry_creation() {
        let registry = ParserRegistry::new();
        assert!(registry.get_parser("json").is_some());
        assert!(registry.get_parser("yaml").is_some());
        assert!(registry.get_parser("YML").is_some());
        assert!(registry.get_parser("toml").is_none());
    }

    #[test]
    fn test_json_catalogue() {
        let catalogue = JsonCatalogParser.parse(JSON).unwrap();
        assert_eq!(catalogue.groups, vec!["Voice", "Interface"]);
        assert_eq!(catalogue.definitions.len(), 2);
        assert_eq!(
            catalogue.definitions[0].default_binding.as_ref().map(|b| b.as_str()),
            Some("Control+Shift+M")
        );
        assert!(catalogue.definitions[0].global);
        assert!(catalogue.definitions[1].default_binding.is_none());
    }

    #[test]
    fn test_yaml_catalogue_into_registry() {
        let registry = ParserRegistry::new().load_registry(YAML, "yaml").unwrap();
        assert_eq!(
            registry.default_binding("toggle-mute").map(|b| b.as_str()),
            Some("Meta+M")
        );
    }

    #[test]
    fn test_auto_detect() {
        let registry = ParserRegistry::new();
        assert_eq!(registry.parse_auto(JSON).unwrap().definitions.len(), 2);
        assert_eq!(registry.parse_auto(YAML).unwrap().definitions.len(), 1);
    }

    #[test]
    fn test_invalid_entries() {
        let missing = r#"{"groups": ["Voice"]}"#;
        assert!(matches!(
            JsonCatalogParser.parse(missing),
            Err(ParseError::MissingField(_))
        ));

        let bad_binding = r#"{
            "groups": ["Voice"],
            "definitions": [{"id": "mute", "label": "Mute", "group": "Voice", "default_binding": "Control+Shift"}]
        }"#;
        assert!(matches!(
            JsonCatalogParser.parse(bad_binding),
            Err(ParseError::EntryError { entry: 1, .. })
        ));

        assert!(matches!(
            ParserRegistry::new().parse(JSON, "toml"),
            Err(ParseError::UnsupportedFormat(_))
        ));
    }
}
