//! Action — a client-requested unit of work and its lifecycle.
//!
//! ```text
//! created ──► pending ──► running ──► completed
//!                │            │
//!                └────────────┴─────► error
//! ```
//!
//! Transitions only ever move forward; [`ActionRecord`] enforces that.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::id::ActionId;
use crate::schema::DataSchema;
use crate::time::{Timestamp, now};

/// Advertised description of an action type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActionMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    /// Schema the request input must satisfy. `None` accepts any input.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<DataSchema>,
}

impl ActionMetadata {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    #[must_use]
    pub fn input(mut self, schema: DataSchema) -> Self {
        self.input = Some(schema);
        self
    }
}

/// Lifecycle state of an action instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionStatus {
    Created,
    Pending,
    Running,
    Completed,
    Error,
}

impl ActionStatus {
    /// Whether no further transition can happen.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    fn can_become(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Created, Self::Pending)
                | (Self::Pending, Self::Running | Self::Error)
                | (Self::Running, Self::Completed | Self::Error)
        )
    }
}

impl std::fmt::Display for ActionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Pending => f.write_str("pending"),
            Self::Running => f.write_str("running"),
            Self::Completed => f.write_str("completed"),
            Self::Error => f.write_str("error"),
        }
    }
}

/// Attempted a lifecycle move that is not an edge of the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cannot move action from {from} to {to}")]
pub struct InvalidTransition {
    pub from: ActionStatus,
    pub to: ActionStatus,
}

/// Snapshot of one requested action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionRecord {
    pub id: ActionId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input: Option<JsonValue>,
    pub status: ActionStatus,
    pub time_requested: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_completed: Option<Timestamp>,
    /// Failure reason, set when the status is [`ActionStatus::Error`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ActionRecord {
    /// A freshly created action, stamped with the request time.
    #[must_use]
    pub fn new(name: impl Into<String>, input: Option<JsonValue>) -> Self {
        Self {
            id: ActionId::new(),
            name: name.into(),
            input,
            status: ActionStatus::Created,
            time_requested: now(),
            time_completed: None,
            error: None,
        }
    }

    /// A new action whose input was already validated: created, then moved
    /// straight to pending.
    #[must_use]
    pub fn accepted(name: impl Into<String>, input: Option<JsonValue>) -> Self {
        let mut record = Self::new(name, input);
        let moved = record.mark_pending();
        debug_assert!(moved.is_ok(), "a new action starts as created");
        record
    }

    /// `created → pending`, once the input has been accepted.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the action is not `created`.
    pub fn mark_pending(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ActionStatus::Pending)
    }

    /// `pending → running`, when the scheduler starts the body.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the action is not `pending`, for
    /// instance because it was cancelled while queued.
    pub fn mark_running(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ActionStatus::Running)
    }

    /// `running → completed`.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the action is not `running`.
    pub fn mark_completed(&mut self) -> Result<(), InvalidTransition> {
        self.transition(ActionStatus::Completed)?;
        self.time_completed = Some(now());
        Ok(())
    }

    /// `pending | running → error`, recording why.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTransition`] when the action already finished.
    pub fn mark_failed(&mut self, reason: impl Into<String>) -> Result<(), InvalidTransition> {
        self.transition(ActionStatus::Error)?;
        self.time_completed = Some(now());
        self.error = Some(reason.into());
        Ok(())
    }

    fn transition(&mut self, next: ActionStatus) -> Result<(), InvalidTransition> {
        if !self.status.can_become(next) {
            return Err(InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        self.status = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pending() -> ActionRecord {
        let mut record = ActionRecord::new("fade", Some(json!({"level": 40})));
        record.mark_pending().unwrap();
        record
    }

    #[test]
    fn should_accept_through_pending_transition() {
        let mut record = ActionRecord::accepted("fade", None);
        assert_eq!(record.status, ActionStatus::Pending);
        assert_eq!(
            record.mark_pending(),
            Err(InvalidTransition {
                from: ActionStatus::Pending,
                to: ActionStatus::Pending,
            })
        );
    }

    #[test]
    fn should_start_in_created_state() {
        let record = ActionRecord::new("fade", None);
        assert_eq!(record.status, ActionStatus::Created);
        assert!(record.time_completed.is_none());
    }

    #[test]
    fn should_walk_the_happy_path() {
        let mut record = pending();
        record.mark_running().unwrap();
        record.mark_completed().unwrap();
        assert_eq!(record.status, ActionStatus::Completed);
        assert!(record.time_completed.is_some());
        assert!(record.error.is_none());
    }

    #[test]
    fn should_record_failure_reason() {
        let mut record = pending();
        record.mark_running().unwrap();
        record.mark_failed("motor stalled").unwrap();
        assert_eq!(record.status, ActionStatus::Error);
        assert_eq!(record.error.as_deref(), Some("motor stalled"));
    }

    #[test]
    fn should_allow_cancelling_a_pending_action() {
        let mut record = pending();
        record.mark_failed("cancelled").unwrap();
        assert_eq!(record.status, ActionStatus::Error);
        assert!(record.mark_running().is_err());
    }

    #[test]
    fn should_reject_backward_or_skipping_transitions() {
        let mut record = ActionRecord::new("fade", None);
        assert_eq!(
            record.mark_running(),
            Err(InvalidTransition {
                from: ActionStatus::Created,
                to: ActionStatus::Running
            })
        );
        record.mark_pending().unwrap();
        assert!(record.mark_completed().is_err());
        record.mark_running().unwrap();
        record.mark_completed().unwrap();
        assert!(record.mark_failed("late").is_err());
        assert_eq!(record.status, ActionStatus::Completed);
    }

    #[test]
    fn should_order_statuses_by_lifecycle() {
        assert!(ActionStatus::Created < ActionStatus::Pending);
        assert!(ActionStatus::Pending < ActionStatus::Running);
        assert!(ActionStatus::Running < ActionStatus::Completed);
        assert!(ActionStatus::Error.is_terminal());
        assert!(!ActionStatus::Running.is_terminal());
    }

    #[test]
    fn should_serialize_with_camel_case_times() {
        let json = serde_json::to_value(pending()).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["name"], "fade");
        assert!(json.get("timeRequested").is_some());
        assert!(json.get("timeCompleted").is_none());
    }
}
