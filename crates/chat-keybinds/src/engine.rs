//! Keybind engine: the controller behind a keybind settings surface

use std::sync::Arc;

use crate::autosave::SaveScheduler;
use crate::capture::{CaptureController, CaptureOutcome, CaptureState};
use crate::config::KeybindSettings;
use crate::conflict::{ConflictDetector, ConflictIndex};
use crate::error::EngineError;
use crate::format::DisplayFormatter;
use crate::merge::KeybindMerger;
use crate::models::{Binding, KeyEvent, KeybindDefinition, KeybindMap, Overrides};
use crate::persistence::OverridesStore;
use crate::registry::DefinitionRegistry;
use crate::search::{sections, SearchIndex, SearchQuery, Section};

/// Owns the live binding map and everything derived from it.
///
/// All transitions are synchronous. Each mutation refreshes the conflict
/// index before returning and hands the overrides to the save scheduler;
/// the write itself happens later.
pub struct KeybindEngine {
    registry: Arc<DefinitionRegistry>,
    map: KeybindMap,
    conflicts: ConflictIndex,
    capture: CaptureController,
    scheduler: Box<dyn SaveScheduler>,
    search: SearchIndex,
    formatter: DisplayFormatter,
}

impl KeybindEngine {
    /// Create an engine from already loaded overrides
    pub fn new(
        registry: Arc<DefinitionRegistry>,
        overrides: &Overrides,
        scheduler: Box<dyn SaveScheduler>,
        settings: &KeybindSettings,
    ) -> Self {
        let map = KeybindMerger::merge(&registry, overrides);
        let conflicts = ConflictDetector::find_conflicts(&map);

        KeybindEngine {
            registry,
            map,
            conflicts,
            capture: CaptureController::new(),
            scheduler,
            search: SearchIndex::new(settings.fuzzy),
            formatter: settings.formatter(),
        }
    }

    /// Create an engine from a store's overrides.
    ///
    /// A store that cannot be read leaves the engine on defaults; edits
    /// still apply in memory.
    pub fn open(
        registry: Arc<DefinitionRegistry>,
        store: &dyn OverridesStore,
        scheduler: Box<dyn SaveScheduler>,
        settings: &KeybindSettings,
    ) -> Self {
        let overrides = store.load_overrides().unwrap_or_else(|e| {
            tracing::warn!("Failed to load keybind overrides, using defaults: {}", e);
            Overrides::new()
        });
        Self::new(registry, &overrides, scheduler, settings)
    }

    pub fn registry(&self) -> &DefinitionRegistry {
        &self.registry
    }

    pub fn map(&self) -> &KeybindMap {
        &self.map
    }

    /// Current binding of an action
    pub fn binding(&self, action_id: &str) -> Option<&Binding> {
        self.map.get(action_id)
    }

    pub fn conflicts(&self) -> &ConflictIndex {
        &self.conflicts
    }

    pub fn capture_state(&self) -> &CaptureState {
        self.capture.state()
    }

    /// The entries that differ from the registry defaults
    pub fn overrides(&self) -> Overrides {
        KeybindMerger::diff_against_defaults(&self.registry, &self.map)
    }

    /// Definitions matching a query, in group then registry order
    pub fn search(&self, query: &SearchQuery) -> Vec<&KeybindDefinition> {
        self.search
            .filter(&self.registry, &self.map, &self.conflicts, query)
    }

    /// Query results split into non-empty group sections
    pub fn search_sections(&self, query: &SearchQuery) -> Vec<Section<'_>> {
        let matches = self.search(query);
        sections(&self.registry, &matches)
    }

    /// Tokens to render on an action's binding control
    pub fn display_tokens(&self, action_id: &str) -> Vec<String> {
        self.formatter.format(
            self.map.get(action_id),
            self.capture.is_capturing(action_id),
        )
    }

    /// Bind or unbind an action directly
    pub fn set_binding(
        &mut self,
        action_id: &str,
        binding: Option<Binding>,
    ) -> Result<(), EngineError> {
        if !self.map.set(action_id, binding) {
            return Err(EngineError::UnknownAction(action_id.to_string()));
        }
        self.after_mutation();
        Ok(())
    }

    /// Restore one action to its default. Unknown ids are ignored.
    pub fn reset_one(&mut self, action_id: &str) -> bool {
        if !self.registry.contains(action_id) {
            tracing::debug!("Ignoring reset of unknown action {}", action_id);
            return false;
        }
        let map = std::mem::take(&mut self.map);
        self.map = KeybindMerger::reset_one(&self.registry, map, action_id);
        self.after_mutation();
        true
    }

    /// Unassign one action. Unknown ids are ignored.
    pub fn clear_one(&mut self, action_id: &str) -> bool {
        if !self.registry.contains(action_id) {
            tracing::debug!("Ignoring clear of unknown action {}", action_id);
            return false;
        }
        let map = std::mem::take(&mut self.map);
        self.map = KeybindMerger::clear_one(map, action_id);
        self.after_mutation();
        true
    }

    pub fn reset_all(&mut self) {
        self.capture.cancel();
        self.map = KeybindMerger::reset_all(&self.registry);
        self.after_mutation();
    }

    pub fn clear_all(&mut self) {
        self.capture.cancel();
        self.map = KeybindMerger::clear_all(&self.registry);
        self.after_mutation();
    }

    /// Start recording a binding for an action, cancelling any other recording
    pub fn begin_capture(&mut self, action_id: &str) -> CaptureOutcome {
        if !self.registry.contains(action_id) {
            return CaptureOutcome::Ignored;
        }
        self.capture.begin(action_id)
    }

    /// Feed a key press to the active recording
    pub fn handle_key(&mut self, event: &KeyEvent) -> CaptureOutcome {
        let outcome = self.capture.handle_key(event, &mut self.map);
        if outcome.is_mutation() {
            self.after_mutation();
        }
        outcome
    }

    /// The recording control lost focus
    pub fn blur(&mut self) -> CaptureOutcome {
        self.capture.blur()
    }

    /// Write pending overrides now
    pub fn flush(&self) -> Result<(), EngineError> {
        self.scheduler.flush()?;
        Ok(())
    }

    /// Leave the settings surface: end any recording and flush
    pub fn close(mut self) -> Result<(), EngineError> {
        self.capture.cancel();
        self.scheduler.flush()?;
        Ok(())
    }

    fn after_mutation(&mut self) {
        self.conflicts = ConflictDetector::find_conflicts(&self.map);
        self.scheduler.schedule(self.overrides());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::autosave::WriteThrough;
    use crate::persistence::MemoryStore;
    use std::str::FromStr;

    fn engine(store: Arc<MemoryStore>) -> KeybindEngine {
        let registry = Arc::new(DefinitionRegistry::builtin().unwrap());
        KeybindEngine::open(
            registry,
            store.as_ref(),
            Box::new(WriteThrough::new(store.clone())),
            &KeybindSettings::default(),
        )
    }

    #[test]
    fn test_set_binding_unknown_action() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(store.clone());
        assert!(matches!(
            engine.set_binding("no-such-action", None),
            Err(EngineError::UnknownAction(_))
        ));
        assert_eq!(store.save_count(), 0);
    }

    #[test]
    fn test_mutation_saves_diff() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(store.clone());
        engine
            .set_binding("toggle-deafen", Some(Binding::from_str("Control+Shift+X").unwrap()))
            .unwrap();

        let stored = store.stored();
        assert_eq!(stored.len(), 1);
        assert_eq!(
            stored.get("toggle-deafen").cloned().flatten().map(|b| b.to_string()),
            Some("Control+Shift+X".to_string())
        );

        engine.reset_one("toggle-deafen");
        assert!(store.stored().is_empty());
    }

    #[test]
    fn test_capture_unknown_action_is_ignored() {
        let store = Arc::new(MemoryStore::new());
        let mut engine = engine(store);
        assert_eq!(engine.begin_capture("nope"), CaptureOutcome::Ignored);
        assert_eq!(engine.capture_state(), &CaptureState::Idle);
    }
}
