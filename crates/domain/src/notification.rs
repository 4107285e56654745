//! Notifications pushed to live subscribers of a thing.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::action::ActionRecord;
use crate::event::EventRecord;

/// A single change observed on a thing, delivered at the moment it happens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "messageType",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Notification {
    /// A property write was accepted.
    PropertyStatus {
        thing_id: String,
        name: String,
        value: JsonValue,
    },
    /// An event was appended to the thing's log.
    Event {
        thing_id: String,
        event: EventRecord,
    },
    /// An action moved to a new lifecycle state.
    ActionStatus {
        thing_id: String,
        action: ActionRecord,
    },
}

impl Notification {
    /// Id of the thing the change happened on.
    #[must_use]
    pub fn thing_id(&self) -> &str {
        match self {
            Self::PropertyStatus { thing_id, .. }
            | Self::Event { thing_id, .. }
            | Self::ActionStatus { thing_id, .. } => thing_id,
        }
    }

    /// Name of the emitted event, for event notifications only.
    #[must_use]
    pub fn event_name(&self) -> Option<&str> {
        match self {
            Self::Event { event, .. } => Some(&event.name),
            _ => None,
        }
    }
}
