//! Conflict detection over the live binding map

use std::collections::{BTreeMap, BTreeSet};

use crate::models::{Binding, KeybindMap};

/// Actions sharing one binding
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub binding: Binding,
    pub actions: Vec<String>,
}

/// For each conflicting action, the other actions sharing its binding.
///
/// Derived from a map and never patched; recompute after every mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictIndex {
    entries: BTreeMap<String, BTreeSet<String>>,
    groups: Vec<Conflict>,
}

impl ConflictIndex {
    /// Other actions sharing `action_id`'s binding, if any
    pub fn conflicting_with(&self, action_id: &str) -> Option<&BTreeSet<String>> {
        self.entries.get(action_id)
    }

    pub fn has_conflict(&self, action_id: &str) -> bool {
        self.entries
            .get(action_id)
            .is_some_and(|others| !others.is_empty())
    }

    /// One entry per shared binding, sorted by binding
    pub fn groups(&self) -> &[Conflict] {
        &self.groups
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.entries.iter().map(|(id, others)| (id.as_str(), others))
    }

    /// Number of actions involved in a conflict
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Detects actions sharing a binding
pub struct ConflictDetector;

impl ConflictDetector {
    /// Group actions by identical non-null binding. Every member of a group
    /// of two or more lists the other members; unassigned actions never appear.
    pub fn find_conflicts(map: &KeybindMap) -> ConflictIndex {
        // Build reverse index
        let mut by_binding: BTreeMap<&Binding, Vec<&str>> = BTreeMap::new();
        for (action_id, binding) in map.iter() {
            if let Some(binding) = binding {
                by_binding.entry(binding).or_default().push(action_id);
            }
        }

        let mut entries = BTreeMap::new();
        let mut groups = Vec::new();
        for (binding, actions) in by_binding {
            if actions.len() < 2 {
                continue;
            }
            for action_id in &actions {
                let others: BTreeSet<String> = actions
                    .iter()
                    .filter(|other| *other != action_id)
                    .map(|other| other.to_string())
                    .collect();
                entries.insert(action_id.to_string(), others);
            }
            groups.push(Conflict {
                binding: binding.clone(),
                actions: actions.iter().map(|a| a.to_string()).collect(),
            });
        }

        if !groups.is_empty() {
            tracing::debug!(
                "Found {} conflicting bindings across {} actions",
                groups.len(),
                entries.len()
            );
        }

        ConflictIndex { entries, groups }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn map(entries: &[(&str, Option<&str>)]) -> KeybindMap {
        entries
            .iter()
            .map(|(id, b)| (id.to_string(), b.map(|b| Binding::from_str(b).unwrap())))
            .collect()
    }

    #[test]
    fn test_no_conflicts() {
        let index = ConflictDetector::find_conflicts(&map(&[
            ("mute", Some("Control+M")),
            ("deafen", None),
        ]));
        assert!(index.is_empty());
        assert!(index.groups().is_empty());
    }

    #[test]
    fn test_pair_conflict_is_symmetric() {
        let index = ConflictDetector::find_conflicts(&map(&[
            ("mute", Some("Control+M")),
            ("deafen", Some("ctrl+m")),
            ("video", Some("Control+V")),
        ]));
        assert_eq!(index.len(), 2);
        assert!(index.conflicting_with("mute").unwrap().contains("deafen"));
        assert!(index.conflicting_with("deafen").unwrap().contains("mute"));
        assert!(!index.has_conflict("video"));
        assert_eq!(index.groups().len(), 1);
        assert_eq!(index.groups()[0].binding.as_str(), "Control+M");
    }

    #[test]
    fn test_triple_conflict_excludes_self() {
        let index = ConflictDetector::find_conflicts(&map(&[
            ("a", Some("F1")),
            ("b", Some("F1")),
            ("c", Some("F1")),
        ]));
        let others = index.conflicting_with("b").unwrap();
        assert_eq!(others.len(), 2);
        assert!(!others.contains("b"));
    }

    #[test]
    fn test_unassigned_never_conflict() {
        let index = ConflictDetector::find_conflicts(&map(&[("a", None), ("b", None)]));
        assert!(index.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let m = map(&[("a", Some("F1")), ("b", Some("F1")), ("c", Some("F2"))]);
        assert_eq!(
            ConflictDetector::find_conflicts(&m),
            ConflictDetector::find_conflicts(&m)
        );
    }
}
