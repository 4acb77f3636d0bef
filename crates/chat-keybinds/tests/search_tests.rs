//! Search and filter composition over the built-in catalogue

use std::str::FromStr;

use chat_keybinds::*;

fn setup() -> (DefinitionRegistry, KeybindMap) {
    let registry = DefinitionRegistry::builtin().unwrap();
    let map = registry.default_keybinds();
    (registry, map)
}

fn ids<'a>(definitions: &[&'a KeybindDefinition]) -> Vec<&'a str> {
    definitions.iter().map(|d| d.id.as_str()).collect()
}

#[test]
fn test_group_and_assigned_filter_keeps_registry_order() {
    let (registry, map) = setup();
    let conflicts = ConflictDetector::find_conflicts(&map);
    let query = SearchQuery::default()
        .in_group("Voice")
        .with_filter(FilterType::Assigned);

    let results = search::filter(&registry, &map, &conflicts, &query);
    assert_eq!(
        ids(&results),
        vec![
            "toggle-mute",
            "toggle-deafen",
            "toggle-video",
            "leave-call",
            "answer-call",
            "decline-call",
        ]
    );
}

#[test]
fn test_unassigned_filter() {
    let (registry, map) = setup();
    let conflicts = ConflictDetector::find_conflicts(&map);
    let query = SearchQuery::default().with_filter(FilterType::Unassigned);

    let results = search::filter(&registry, &map, &conflicts, &query);
    assert_eq!(
        ids(&results),
        vec![
            "mark-all-read",
            "pin-message",
            "push-to-talk",
            "toggle-screen-share",
            "toggle-theme",
        ]
    );
}

#[test]
fn test_conflicts_filter() {
    let (registry, mut map) = setup();
    map.set("pin-message", Some(Binding::from_str("Control+K").unwrap()));
    let conflicts = ConflictDetector::find_conflicts(&map);
    let query = SearchQuery::default().with_filter(FilterType::Conflicts);

    let results = search::filter(&registry, &map, &conflicts, &query);
    assert_eq!(ids(&results), vec!["open-quick-switcher", "pin-message"]);
}

#[test]
fn test_text_matches_description_and_group() {
    let (registry, map) = setup();
    let conflicts = ConflictDetector::find_conflicts(&map);

    let results = search::filter(&registry, &map, &conflicts, &SearchQuery::text("microphone"));
    assert_eq!(ids(&results), vec!["toggle-mute"]);

    let voice = search::filter(&registry, &map, &conflicts, &SearchQuery::text("voice"));
    assert_eq!(voice.len(), registry.definitions_in_group("Voice").count());
}

#[test]
fn test_binding_text_and_typos() {
    let (registry, map) = setup();
    let conflicts = ConflictDetector::find_conflicts(&map);

    let f11 = search::filter(&registry, &map, &conflicts, &SearchQuery::text("f11"));
    assert_eq!(ids(&f11), vec!["toggle-fullscreen"]);

    let typo = search::filter(&registry, &map, &conflicts, &SearchQuery::text("sidebr"));
    assert_eq!(ids(&typo), vec!["toggle-sidebar"]);
}

#[test]
fn test_sections_skip_empty_groups() {
    let (registry, map) = setup();
    let conflicts = ConflictDetector::find_conflicts(&map);

    let results = search::filter(&registry, &map, &conflicts, &SearchQuery::text("call"));
    let sections = search::sections(&registry, &results);
    assert_eq!(sections.len(), 1);
    assert_eq!(sections[0].group, "Voice");
    assert_eq!(
        ids(&sections[0].definitions),
        vec!["leave-call", "answer-call", "decline-call"]
    );
}
