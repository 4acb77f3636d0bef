//! Search and filtering over definitions and the live binding map
//!
//! Results are recomputed from scratch on every query. Each whitespace
//! separated sub-term must match (logical AND), either as a case-insensitive
//! substring of the definition's haystack or, for longer sub-terms, as a
//! token prefix or a token within a small edit distance.

use serde::{Deserialize, Serialize};

use crate::codec::spelling_variants;
use crate::config::FuzzySettings;
use crate::conflict::ConflictIndex;
use crate::models::{Binding, KeybindDefinition, KeybindMap, SEPARATOR};
use crate::registry::DefinitionRegistry;

/// Assignment-state filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    #[default]
    All,
    Assigned,
    Unassigned,
    Conflicts,
}

impl FilterType {
    fn accepts(&self, current: Option<&Binding>, in_conflict: bool) -> bool {
        match self {
            FilterType::All => true,
            FilterType::Assigned => current.is_some(),
            FilterType::Unassigned => current.is_none(),
            FilterType::Conflicts => in_conflict,
        }
    }
}

/// Compound query: free text, optional group, assignment state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub filter: FilterType,
}

impl SearchQuery {
    pub fn text(text: impl Into<String>) -> Self {
        SearchQuery {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn in_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }

    pub fn with_filter(mut self, filter: FilterType) -> Self {
        self.filter = filter;
        self
    }
}

/// A rendered section: one group and its matching definitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section<'a> {
    pub group: &'a str,
    pub definitions: Vec<&'a KeybindDefinition>,
}

/// Stateless matcher parameterized by fuzzy thresholds
#[derive(Debug, Clone, Default)]
pub struct SearchIndex {
    fuzzy: FuzzySettings,
}

impl SearchIndex {
    pub fn new(fuzzy: FuzzySettings) -> Self {
        SearchIndex { fuzzy }
    }

    /// Lower-cased text searched for a definition
    pub fn haystack(definition: &KeybindDefinition, current: Option<&Binding>) -> String {
        let mut parts: Vec<String> = vec![
            definition.id.clone(),
            definition.label.clone(),
            definition.group.clone(),
        ];
        if let Some(description) = &definition.description {
            parts.push(description.clone());
        }
        for binding in [current, definition.default_binding.as_ref()]
            .into_iter()
            .flatten()
        {
            parts.extend(spelling_variants(binding));
        }
        parts.join(" ").to_lowercase()
    }

    /// Whether every sub-term of `term` matches the definition
    pub fn matches_search(
        &self,
        definition: &KeybindDefinition,
        current: Option<&Binding>,
        term: &str,
    ) -> bool {
        let terms: Vec<String> = term.split_whitespace().map(str::to_lowercase).collect();
        if terms.is_empty() {
            return true;
        }

        let haystack = Self::haystack(definition, current);
        // Tokenized only once a sub-term misses the substring check.
        let mut tokens: Option<Vec<&str>> = None;

        terms.iter().all(|sub| {
            if haystack.contains(sub.as_str()) {
                return true;
            }
            if sub.chars().count() < self.fuzzy.min_term_len {
                return false;
            }
            let tokens = tokens.get_or_insert_with(|| tokenize(&haystack));
            tokens.iter().any(|token| self.fuzzy_token_match(token, sub))
        })
    }

    fn fuzzy_token_match(&self, token: &str, sub: &str) -> bool {
        if token.starts_with(sub) {
            return true;
        }
        token.chars().count() >= self.fuzzy.min_token_len
            && within_edit_distance(token, sub, self.fuzzy.max_distance)
    }

    /// Definitions passing every filter, in canonical group order and
    /// registry order within each group
    pub fn filter<'a>(
        &self,
        registry: &'a DefinitionRegistry,
        map: &KeybindMap,
        conflicts: &ConflictIndex,
        query: &SearchQuery,
    ) -> Vec<&'a KeybindDefinition> {
        registry
            .groups()
            .iter()
            .filter(|group| query.group.as_ref().map_or(true, |wanted| wanted == *group))
            .flat_map(|group| registry.definitions_in_group(group))
            .filter(|d| self.matches_search(d, map.get(&d.id), &query.text))
            .filter(|d| {
                query
                    .filter
                    .accepts(map.get(&d.id), conflicts.has_conflict(&d.id))
            })
            .collect()
    }
}

/// Match with the default fuzzy thresholds
pub fn matches_search(definition: &KeybindDefinition, current: Option<&Binding>, term: &str) -> bool {
    SearchIndex::default().matches_search(definition, current, term)
}

/// Filter with the default fuzzy thresholds
pub fn filter<'a>(
    registry: &'a DefinitionRegistry,
    map: &KeybindMap,
    conflicts: &ConflictIndex,
    query: &SearchQuery,
) -> Vec<&'a KeybindDefinition> {
    SearchIndex::default().filter(registry, map, conflicts, query)
}

/// Split a filtered list into sections in canonical group order, skipping
/// groups with no definitions
pub fn sections<'a>(
    registry: &'a DefinitionRegistry,
    definitions: &[&'a KeybindDefinition],
) -> Vec<Section<'a>> {
    registry
        .groups()
        .iter()
        .filter_map(|group| {
            let members: Vec<&KeybindDefinition> = definitions
                .iter()
                .copied()
                .filter(|d| &d.group == group)
                .collect();
            (!members.is_empty()).then(|| Section {
                group: group.as_str(),
                definitions: members,
            })
        })
        .collect()
}

fn tokenize(haystack: &str) -> Vec<&str> {
    haystack
        .split(|c: char| c.is_whitespace() || c == SEPARATOR)
        .filter(|t| !t.is_empty())
        .collect()
}

/// Levenshtein distance bounded by `max`
fn within_edit_distance(a: &str, b: &str, max: usize) -> bool {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.len().abs_diff(b.len()) > max {
        return false;
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()] <= max
}
