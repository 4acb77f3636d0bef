//! Property-based tests for the codec, merge, conflict and search layers

use std::collections::BTreeSet;
use std::str::FromStr;

use proptest::prelude::*;
use chat_keybinds::*;

/// Strategy for generating held modifier sets
fn modifiers_strategy() -> impl Strategy<Value = Vec<Modifier>> {
    prop::collection::vec(
        prop_oneof![
            Just(Modifier::Meta),
            Just(Modifier::Control),
            Just(Modifier::Alt),
            Just(Modifier::Shift),
        ],
        0..4,
    )
}

/// Strategy for generating key names as a platform reports them
fn key_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        (b'a'..=b'z').prop_map(|c| (c as char).to_string()),
        (b'A'..=b'Z').prop_map(|c| (c as char).to_string()),
        (b'0'..=b'9').prop_map(|c| (c as char).to_string()),
        (1u8..=24u8).prop_map(|n| format!("F{}", n)),
        Just("Enter".to_string()),
        Just("Home".to_string()),
        Just("PageUp".to_string()),
        Just("ArrowLeft".to_string()),
        Just(",".to_string()),
        Just("/".to_string()),
    ]
}

/// Strategy for generating modifier-only key names
fn modifier_key_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("Control".to_string()),
        Just("Shift".to_string()),
        Just("Alt".to_string()),
        Just("Meta".to_string()),
        Just("AltGraph".to_string()),
        Just("CapsLock".to_string()),
    ]
}

fn builtin() -> DefinitionRegistry {
    DefinitionRegistry::builtin().unwrap()
}

/// Strategy for override maps over built-in ids plus some unknown ids
fn overrides_strategy() -> impl Strategy<Value = Overrides> {
    let ids: Vec<String> = builtin()
        .definitions()
        .iter()
        .map(|d| d.id.clone())
        .chain(["retired-one".to_string(), "retired-two".to_string()])
        .collect();
    let bindings = prop::option::of(prop_oneof![
        Just("Control+K"),
        Just("Control+M"),
        Just("F5"),
        Just("Alt+Shift+Up"),
    ]);
    prop::collection::btree_map(prop::sample::select(ids), bindings, 0..12).prop_map(|m| {
        m.into_iter()
            .map(|(id, b)| (id, b.map(|b| Binding::from_str(b).unwrap())))
            .collect()
    })
}

proptest! {
    #[test]
    fn prop_normalize_ignores_press_order(
        modifiers in modifiers_strategy(),
        key in key_name_strategy(),
    ) {
        let forward = normalize(&KeyEvent::with_modifiers(key.clone(), &modifiers));
        let mut reversed_mods = modifiers.clone();
        reversed_mods.reverse();
        let reversed = normalize(&KeyEvent::with_modifiers(key, &reversed_mods));

        prop_assert!(forward.is_some());
        prop_assert_eq!(forward, reversed);
    }

    #[test]
    fn prop_normalized_binding_reparses_to_itself(
        modifiers in modifiers_strategy(),
        key in key_name_strategy(),
    ) {
        let binding = normalize(&KeyEvent::with_modifiers(key, &modifiers)).unwrap();
        prop_assert_eq!(parse_binding(binding.as_str()), Some(binding));
    }

    #[test]
    fn prop_modifier_only_press_never_binds(
        modifiers in modifiers_strategy(),
        key in modifier_key_strategy(),
    ) {
        prop_assert!(normalize(&KeyEvent::with_modifiers(key, &modifiers)).is_none());
    }

    #[test]
    fn prop_merge_is_total_over_registry(overrides in overrides_strategy()) {
        let registry = builtin();
        let map = KeybindMerger::merge(&registry, &overrides);

        prop_assert_eq!(map.len(), registry.len());
        for definition in registry.definitions() {
            let expected = match overrides.get(&definition.id) {
                Some(explicit) => explicit.as_ref(),
                None => definition.default_binding.as_ref(),
            };
            prop_assert_eq!(map.get(&definition.id), expected);
        }
        prop_assert!(map.action_ids().all(|id| registry.contains(id)));
    }

    #[test]
    fn prop_diff_reproduces_map(overrides in overrides_strategy()) {
        let registry = builtin();
        let map = KeybindMerger::merge(&registry, &overrides);
        let diff = KeybindMerger::diff_against_defaults(&registry, &map);
        prop_assert_eq!(KeybindMerger::merge(&registry, &diff), map);
    }

    #[test]
    fn prop_reset_and_clear_one(overrides in overrides_strategy(), idx in 0usize..33) {
        let registry = builtin();
        let definition = &registry.definitions()[idx % registry.len()];
        let map = KeybindMerger::merge(&registry, &overrides);

        let reset = KeybindMerger::reset_one(&registry, map.clone(), &definition.id);
        prop_assert_eq!(reset.get(&definition.id), definition.default_binding.as_ref());

        let cleared = KeybindMerger::clear_one(map.clone(), &definition.id);
        prop_assert_eq!(cleared.entry(&definition.id), Some(None));

        // Other entries are untouched
        for (id, binding) in map.iter().filter(|(id, _)| *id != definition.id) {
            prop_assert_eq!(reset.get(id), binding);
            prop_assert_eq!(cleared.get(id), binding);
        }
    }

    #[test]
    fn prop_conflicts_are_symmetric_and_idempotent(overrides in overrides_strategy()) {
        let map = KeybindMerger::merge(&builtin(), &overrides);
        let index = ConflictDetector::find_conflicts(&map);

        for (id, others) in index.iter() {
            prop_assert!(map.get(id).is_some());
            prop_assert!(!others.contains(id));
            for other in others {
                prop_assert_eq!(map.get(other), map.get(id));
                prop_assert!(index.conflicting_with(other).unwrap().contains(id));
            }
        }
        prop_assert_eq!(ConflictDetector::find_conflicts(&map), index);
    }

    #[test]
    fn prop_more_terms_never_widen_results(
        first in "[a-z]{1,6}",
        second in "[a-z]{1,6}",
    ) {
        let registry = builtin();
        let map = registry.default_keybinds();
        let conflicts = ConflictDetector::find_conflicts(&map);

        let one: BTreeSet<&str> = search::filter(&registry, &map, &conflicts, &SearchQuery::text(first.clone()))
            .iter()
            .map(|d| d.id.as_str())
            .collect();
        let two: BTreeSet<&str> = search::filter(
            &registry,
            &map,
            &conflicts,
            &SearchQuery::text(format!("{} {}", first, second)),
        )
        .iter()
        .map(|d| d.id.as_str())
        .collect();

        prop_assert!(two.is_subset(&one));
    }
}
