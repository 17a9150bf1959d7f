//! Output contracts from the reveal engine.
//!
//! Outputs carry only the presentation changes for this update, keyed by
//! ElementId, and a separate list of semantic events. Adapters apply the
//! changes to their nodes and forward events.

use serde::{Deserialize, Serialize};

use crate::ids::ElementId;
use crate::visibility::Fallback;

/// One presentation change for the renderer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Change {
    /// New class token for a reveal element or group container.
    Token {
        element: ElementId,
        class_name: String,
    },
    /// New class and delay for one stagger-group child.
    Item {
        element: ElementId,
        index: usize,
        class_name: String,
        delay_ms: u32,
    },
    /// New count-up text.
    Display { element: ElementId, text: String },
}

impl Change {
    pub fn element(&self) -> ElementId {
        match self {
            Change::Token { element, .. }
            | Change::Item { element, .. }
            | Change::Display { element, .. } => *element,
        }
    }
}

/// Discrete signals emitted during an update.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
#[non_exhaustive]
pub enum RevealEvent {
    Visible { element: ElementId },
    Hidden { element: ElementId },
    CountUpStarted { element: ElementId },
    CountUpFinished { element: ElementId },
    /// Element shown without observation.
    Degraded {
        element: ElementId,
        fallback: Fallback,
    },
}

/// Outputs returned by RevealEngine::update().
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Outputs {
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(default)]
    pub events: Vec<RevealEvent>,
}

impl Outputs {
    #[inline]
    pub fn clear(&mut self) {
        self.changes.clear();
        self.events.clear();
    }

    #[inline]
    pub fn push_change(&mut self, change: Change) {
        self.changes.push(change);
    }

    #[inline]
    pub fn push_event(&mut self, event: RevealEvent) {
        self.events.push(event);
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty() && self.events.is_empty()
    }

    /// Changes addressed to `element`, in emission order.
    pub fn changes_for(&self, element: ElementId) -> impl Iterator<Item = &Change> {
        self.changes.iter().filter(move |c| c.element() == element)
    }
}
