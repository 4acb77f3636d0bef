//! Layering persisted overrides over registry defaults
//!
//! Every function here returns a map that is total over the registry: each
//! known action has exactly one entry and unknown ids are never admitted.

use crate::models::{KeybindMap, Overrides};
use crate::registry::DefinitionRegistry;

/// Keybind merger for override layering
pub struct KeybindMerger;

impl KeybindMerger {
    /// Combine registry defaults with a partial override map.
    ///
    /// Explicit entries win, including explicit `None`. Ids the registry does
    /// not know (retired actions) are dropped.
    pub fn merge(registry: &DefinitionRegistry, overrides: &Overrides) -> KeybindMap {
        let dropped = overrides
            .keys()
            .filter(|id| !registry.contains(id))
            .count();
        if dropped > 0 {
            tracing::debug!("Dropped {} overrides for unknown actions", dropped);
        }

        registry
            .definitions()
            .iter()
            .map(|d| {
                let binding = match overrides.get(&d.id) {
                    Some(explicit) => explicit.clone(),
                    None => d.default_binding.clone(),
                };
                (d.id.clone(), binding)
            })
            .collect()
    }

    /// Restore one action to its registry default
    pub fn reset_one(
        registry: &DefinitionRegistry,
        mut map: KeybindMap,
        action_id: &str,
    ) -> KeybindMap {
        if !map.set(action_id, registry.default_binding(action_id).cloned()) {
            tracing::debug!("Ignoring reset of unknown action {}", action_id);
        }
        map
    }

    /// Unassign one action, whatever its default
    pub fn clear_one(mut map: KeybindMap, action_id: &str) -> KeybindMap {
        if !map.set(action_id, None) {
            tracing::debug!("Ignoring clear of unknown action {}", action_id);
        }
        map
    }

    /// Restore every action to its default
    pub fn reset_all(registry: &DefinitionRegistry) -> KeybindMap {
        Self::merge(registry, &Overrides::new())
    }

    /// Unassign every action
    pub fn clear_all(registry: &DefinitionRegistry) -> KeybindMap {
        registry
            .definitions()
            .iter()
            .map(|d| (d.id.clone(), None))
            .collect()
    }

    /// The overrides that reproduce `map` when merged: only entries that
    /// differ from the default, with explicit `None` for cleared defaults.
    pub fn diff_against_defaults(registry: &DefinitionRegistry, map: &KeybindMap) -> Overrides {
        registry
            .definitions()
            .iter()
            .filter_map(|d| {
                let current = map.get(&d.id);
                if current == d.default_binding.as_ref() {
                    None
                } else {
                    Some((d.id.clone(), current.cloned()))
                }
            })
            .collect()
    }
}
