//! Notifications delivered by the host's state/event bus.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A watched entity changed value.
///
/// `old` is `None` when the entity did not exist before, `new` is `None`
/// when it was removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateChange {
    pub entity_id: String,
    pub old: Option<String>,
    pub new: Option<String>,
}

impl StateChange {
    #[must_use]
    pub fn new(
        entity_id: impl Into<String>,
        old: Option<impl Into<String>>,
        new: Option<impl Into<String>>,
    ) -> Self {
        Self {
            entity_id: entity_id.into(),
            old: old.map(Into::into),
            new: new.map(Into::into),
        }
    }

    /// Whether old and new are the same value, ignoring case.
    ///
    /// Such transitions never fire a trigger.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        match (&self.old, &self.new) {
            (None, None) => true,
            (Some(old), Some(new)) => same_value(old, new),
            _ => false,
        }
    }
}

/// Compare two state values the way triggers do: Unicode lowercase on both sides.
#[must_use]
pub fn same_value(a: &str, b: &str) -> bool {
    a == b || a.to_lowercase() == b.to_lowercase()
}

/// A named event fired on the host bus with an arbitrary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusEvent {
    pub event_type: String,
    #[serde(default)]
    pub data: Map<String, Value>,
}

impl BusEvent {
    #[must_use]
    pub fn new(event_type: impl Into<String>, data: Map<String, Value>) -> Self {
        Self {
            event_type: event_type.into(),
            data,
        }
    }
}

/// Anything the host bus can deliver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notification {
    StateChanged(StateChange),
    Event(BusEvent),
}
