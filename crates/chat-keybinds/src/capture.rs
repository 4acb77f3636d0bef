//! Interactive rebinding state machine
//!
//! ```text
//! Idle --begin(X)--> Capturing(X)
//! Capturing(X) --Tab | Shift+Tab | Escape | blur--> Idle  (no mutation)
//! Capturing(X) --Backspace | Delete--> Idle               (X cleared)
//! Capturing(X) --key normalizing to B--> Idle             (X bound to B)
//! Capturing(X) --key normalizing to nothing--> Capturing(X)
//! Capturing(X) --begin(Y)--> Capturing(Y)                 (X cancelled first)
//! ```
//!
//! Only the bare control keys are reserved, so `Control+Backspace` or
//! `Shift+Escape` are recorded like any other combination.

use crate::codec::normalize;
use crate::models::{Binding, Key, KeyCombo, KeyEvent, KeybindMap, Modifier};

/// What a reserved combination does to a capture session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlKey {
    Cancel,
    Clear,
}

/// The session action for a reserved combination, `None` when the
/// combination can be recorded
pub fn control_key(combo: &KeyCombo) -> Option<ControlKey> {
    match (combo.modifiers(), combo.key()) {
        // Tab and Shift+Tab keep focus traversal working.
        ([], Key::Tab) | ([Modifier::Shift], Key::Tab) | ([], Key::Escape) => {
            Some(ControlKey::Cancel)
        }
        ([], Key::Backspace) | ([], Key::Delete) => Some(ControlKey::Clear),
        _ => None,
    }
}

/// Whether a capture session can ever produce `binding`
pub fn is_recordable(binding: &Binding) -> bool {
    binding
        .combo()
        .map(|combo| control_key(&combo).is_none())
        .unwrap_or(false)
}

/// At most one capture session exists per controller
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum CaptureState {
    #[default]
    Idle,
    Capturing(String),
}

/// What a transition did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    /// A session started from idle
    Started,
    /// A session for another action was cancelled and a new one started
    Restarted { previous: String },
    /// The session ended without touching the map
    Cancelled,
    /// The action was unassigned
    Cleared,
    /// The action was bound to a new binding
    Bound(Binding),
    /// The key did not form a binding; still capturing
    Waiting,
    /// Nothing to do in the current state
    Ignored,
}

impl CaptureOutcome {
    /// Whether the transition changed the binding map
    pub fn is_mutation(&self) -> bool {
        matches!(self, CaptureOutcome::Cleared | CaptureOutcome::Bound(_))
    }
}

/// Owner of the single capture session
#[derive(Debug, Default)]
pub struct CaptureController {
    state: CaptureState,
}

impl CaptureController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &CaptureState {
        &self.state
    }

    /// Action currently being captured
    pub fn capturing(&self) -> Option<&str> {
        match &self.state {
            CaptureState::Capturing(id) => Some(id.as_str()),
            CaptureState::Idle => None,
        }
    }

    pub fn is_capturing(&self, action_id: &str) -> bool {
        self.capturing() == Some(action_id)
    }

    /// Start capturing for an action, implicitly cancelling any other session
    pub fn begin(&mut self, action_id: &str) -> CaptureOutcome {
        let previous = std::mem::replace(
            &mut self.state,
            CaptureState::Capturing(action_id.to_string()),
        );
        match previous {
            CaptureState::Capturing(previous) if previous != action_id => {
                tracing::debug!("Capture for {} cancelled by {}", previous, action_id);
                CaptureOutcome::Restarted { previous }
            }
            _ => {
                tracing::debug!("Capturing binding for {}", action_id);
                CaptureOutcome::Started
            }
        }
    }

    /// Feed a key press to the session, mutating `map` when it commits
    pub fn handle_key(&mut self, event: &KeyEvent, map: &mut KeybindMap) -> CaptureOutcome {
        let Some(action_id) = self.capturing().map(str::to_string) else {
            return CaptureOutcome::Ignored;
        };

        let Some(binding) = normalize(event) else {
            return CaptureOutcome::Waiting;
        };

        match binding.combo().ok().as_ref().and_then(control_key) {
            Some(ControlKey::Cancel) => {
                self.state = CaptureState::Idle;
                CaptureOutcome::Cancelled
            }
            Some(ControlKey::Clear) => {
                map.set(&action_id, None);
                self.state = CaptureState::Idle;
                tracing::debug!("Cleared binding for {}", action_id);
                CaptureOutcome::Cleared
            }
            None => {
                map.set(&action_id, Some(binding.clone()));
                self.state = CaptureState::Idle;
                tracing::debug!("Bound {} to {}", action_id, binding);
                CaptureOutcome::Bound(binding)
            }
        }
    }

    /// The binding control lost focus
    pub fn blur(&mut self) -> CaptureOutcome {
        self.cancel()
    }

    /// End the session without mutation
    pub fn cancel(&mut self) -> CaptureOutcome {
        match std::mem::take(&mut self.state) {
            CaptureState::Capturing(_) => CaptureOutcome::Cancelled,
            CaptureState::Idle => CaptureOutcome::Ignored,
        }
    }
}
