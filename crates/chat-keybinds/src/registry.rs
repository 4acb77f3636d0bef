//! Definition registry: the immutable catalogue of bindable actions

use std::collections::HashMap;
use std::str::FromStr;

use crate::{
    capture::is_recordable,
    error::RegistryError,
    models::{Binding, KeybindDefinition, KeybindMap},
};

/// Canonical group order of the built-in catalogue
pub const BUILTIN_GROUPS: [&str; 4] = ["Navigation", "Messages", "Voice", "Interface"];

/// Catalogue of bindable actions with fast lookup by id.
///
/// Construction validates the catalogue; a registry value is always valid.
#[derive(Debug, Clone)]
pub struct DefinitionRegistry {
    definitions: Vec<KeybindDefinition>,
    /// Map from action_id to index in `definitions`
    by_action: HashMap<String, usize>,
    groups: Vec<String>,
}

impl DefinitionRegistry {
    /// Build a registry from an ordered group list and ordered definitions.
    ///
    /// Fails when an id is empty or repeated, a group is unknown or repeated,
    /// two definitions ship the same default binding, or a default is a key
    /// reserved by capture (bare Tab, Shift+Tab, Escape, Backspace, Delete).
    pub fn new(
        groups: Vec<String>,
        definitions: Vec<KeybindDefinition>,
    ) -> Result<Self, RegistryError> {
        for (idx, group) in groups.iter().enumerate() {
            if groups[..idx].contains(group) {
                return Err(RegistryError::DuplicateGroup(group.clone()));
            }
        }

        let mut by_action = HashMap::with_capacity(definitions.len());
        {
            let mut by_default: HashMap<&Binding, &str> = HashMap::new();

            for (idx, definition) in definitions.iter().enumerate() {
                if definition.id.trim().is_empty() {
                    return Err(RegistryError::InvalidActionIdFormat(
                        "Action ID cannot be empty".to_string(),
                    ));
                }
                if by_action.insert(definition.id.clone(), idx).is_some() {
                    return Err(RegistryError::DuplicateActionId(definition.id.clone()));
                }
                if !groups.contains(&definition.group) {
                    return Err(RegistryError::UnknownGroup {
                        action_id: definition.id.clone(),
                        group: definition.group.clone(),
                    });
                }
                if let Some(binding) = &definition.default_binding {
                    if !is_recordable(binding) {
                        return Err(RegistryError::UnrecordableDefault {
                            action_id: definition.id.clone(),
                            binding: binding.to_string(),
                        });
                    }
                    if let Some(existing) = by_default.insert(binding, &definition.id) {
                        return Err(RegistryError::DuplicateDefaultBinding {
                            binding: binding.to_string(),
                            first: existing.to_string(),
                            second: definition.id.clone(),
                        });
                    }
                }
            }
        }

        tracing::debug!(
            "Loaded keybind registry with {} actions in {} groups",
            definitions.len(),
            groups.len()
        );

        Ok(DefinitionRegistry {
            definitions,
            by_action,
            groups,
        })
    }

    /// The chat application's built-in catalogue
    pub fn builtin() -> Result<Self, RegistryError> {
        let groups = BUILTIN_GROUPS.iter().map(|g| g.to_string()).collect();
        let mut definitions = Vec::new();
        for (id, label, group, description, default, global) in BUILTIN_ACTIONS {
            let mut definition = KeybindDefinition::new(*id, *label, *group);
            if let Some(description) = description {
                definition = definition.with_description(*description);
            }
            if let Some(default) = default {
                definition = definition.with_default(Binding::from_str(default)?);
            }
            if *global {
                definition = definition.global();
            }
            definitions.push(definition);
        }
        Self::new(groups, definitions)
    }

    /// All definitions in registry order
    pub fn definitions(&self) -> &[KeybindDefinition] {
        &self.definitions
    }

    /// Lookup a definition by action ID
    pub fn lookup(&self, action_id: &str) -> Option<&KeybindDefinition> {
        self.by_action
            .get(action_id)
            .map(|&idx| &self.definitions[idx])
    }

    pub fn contains(&self, action_id: &str) -> bool {
        self.by_action.contains_key(action_id)
    }

    /// Group names in canonical display order
    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    /// Definitions of one group, in registry order
    pub fn definitions_in_group<'a>(
        &'a self,
        group: &'a str,
    ) -> impl Iterator<Item = &'a KeybindDefinition> + 'a {
        self.definitions.iter().filter(move |d| d.group == group)
    }

    /// Default binding of an action (`None` when unknown or shipped unbound)
    pub fn default_binding(&self, action_id: &str) -> Option<&Binding> {
        self.lookup(action_id)
            .and_then(|d| d.default_binding.as_ref())
    }

    /// The total map of default bindings
    pub fn default_keybinds(&self) -> KeybindMap {
        self.definitions
            .iter()
            .map(|d| (d.id.clone(), d.default_binding.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

type BuiltinAction = (
    &'static str,
    &'static str,
    &'static str,
    Option<&'static str>,
    Option<&'static str>,
    bool,
);

const BUILTIN_ACTIONS: &[BuiltinAction] = &[
    // Navigation
    ("open-quick-switcher", "Open quick switcher", "Navigation", Some("Jump to any channel or conversation"), Some("Control+K"), false),
    ("next-channel", "Next channel", "Navigation", None, Some("Alt+Down"), false),
    ("previous-channel", "Previous channel", "Navigation", None, Some("Alt+Up"), false),
    ("next-unread-channel", "Next unread channel", "Navigation", None, Some("Alt+Shift+Down"), false),
    ("previous-unread-channel", "Previous unread channel", "Navigation", None, Some("Alt+Shift+Up"), false),
    ("jump-to-oldest-unread", "Jump to oldest unread message", "Navigation", None, Some("Shift+PageUp"), false),
    ("go-back", "Go back", "Navigation", Some("Return to the previously viewed channel"), Some("Alt+Left"), false),
    ("go-forward", "Go forward", "Navigation", None, Some("Alt+Right"), false),
    // Messages
    ("search-messages", "Search messages", "Messages", None, Some("Control+F"), false),
    ("mark-channel-read", "Mark channel as read", "Messages", None, Some("Shift+Escape"), false),
    ("mark-all-read", "Mark all channels as read", "Messages", None, None, false),
    ("edit-last-message", "Edit last message", "Messages", Some("Edit your most recent message in the channel"), Some("Control+Up"), false),
    ("reply-to-message", "Reply to message", "Messages", None, Some("Control+R"), false),
    ("upload-file", "Upload a file", "Messages", None, Some("Control+Shift+U"), false),
    ("toggle-emoji-picker", "Open emoji picker", "Messages", None, Some("Control+E"), false),
    ("pin-message", "Pin message", "Messages", None, None, false),
    // Voice
    ("toggle-mute", "Toggle mute", "Voice", Some("Mute or unmute your microphone"), Some("Control+Shift+M"), true),
    ("toggle-deafen", "Toggle deafen", "Voice", Some("Stop hearing other participants"), Some("Control+Shift+D"), true),
    ("push-to-talk", "Push to talk", "Voice", Some("Transmit audio only while held"), None, true),
    ("toggle-video", "Toggle camera", "Voice", None, Some("Control+Shift+V"), false),
    ("toggle-screen-share", "Toggle screen share", "Voice", None, None, false),
    ("leave-call", "Leave call", "Voice", None, Some("Control+Shift+H"), false),
    ("answer-call", "Answer incoming call", "Voice", None, Some("Control+Enter"), true),
    ("decline-call", "Decline incoming call", "Voice", None, Some("Control+Backspace"), true),
    // Interface
    ("toggle-sidebar", "Toggle sidebar", "Interface", None, Some("Control+B"), false),
    ("toggle-member-list", "Toggle member list", "Interface", None, Some("Control+Shift+L"), false),
    ("open-settings", "Open settings", "Interface", None, Some("Control+Comma"), false),
    ("open-shortcut-help", "Show keyboard shortcuts", "Interface", None, Some("Control+Slash"), false),
    ("toggle-fullscreen", "Toggle full screen", "Interface", None, Some("F11"), false),
    ("zoom-in", "Zoom in", "Interface", None, Some("Control+Plus"), false),
    ("zoom-out", "Zoom out", "Interface", None, Some("Control+Minus"), false),
    ("reset-zoom", "Reset zoom", "Interface", None, Some("Control+0"), false),
    ("toggle-theme", "Switch light and dark theme", "Interface", None, None, false),
];
