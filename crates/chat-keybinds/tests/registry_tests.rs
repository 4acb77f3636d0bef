use std::collections::HashSet;
use std::str::FromStr;

use chat_keybinds::*;

#[test]
fn test_builtin_catalogue_is_valid() {
    let registry = DefinitionRegistry::builtin().unwrap();

    assert_eq!(registry.groups(), ["Navigation", "Messages", "Voice", "Interface"]);
    assert!(!registry.is_empty());

    let defaults: Vec<&Binding> = registry
        .definitions()
        .iter()
        .filter_map(|d| d.default_binding.as_ref())
        .collect();
    let unique: HashSet<&Binding> = defaults.iter().copied().collect();
    assert_eq!(defaults.len(), unique.len());

    for group in registry.groups() {
        assert!(registry.definitions_in_group(group).count() > 0);
    }
}

#[test]
fn test_builtin_defaults_are_canonical() {
    let registry = DefinitionRegistry::builtin().unwrap();
    for definition in registry.definitions() {
        if let Some(binding) = &definition.default_binding {
            assert_eq!(parse_binding(binding.as_str()).as_ref(), Some(binding));
        }
    }
    assert_eq!(
        registry.default_binding("zoom-in"),
        Some(&Binding::from_str("ctrl++").unwrap())
    );
}

#[test]
fn test_global_flag_is_informational() {
    let registry = DefinitionRegistry::builtin().unwrap();
    assert!(registry.lookup("toggle-mute").unwrap().global);

    // A global action conflicts like any other
    let mut map = registry.default_keybinds();
    map.set("toggle-sidebar", Some(Binding::from_str("Control+Shift+M").unwrap()));
    let conflicts = ConflictDetector::find_conflicts(&map);
    assert!(conflicts.has_conflict("toggle-mute"));
    assert!(conflicts.has_conflict("toggle-sidebar"));
}

#[test]
fn test_catalogue_with_shared_default_is_rejected() {
    let content = r#"{
        "groups": ["Voice"],
        "definitions": [
            {"id": "mute", "label": "Mute", "group": "Voice", "default_binding": "Control+M"},
            {"id": "deafen", "label": "Deafen", "group": "Voice", "default_binding": "ctrl+m"}
        ]
    }"#;

    let result = ParserRegistry::new().load_registry(content, "json");
    assert!(matches!(
        result,
        Err(RegistryError::DuplicateDefaultBinding { .. })
    ));
}
