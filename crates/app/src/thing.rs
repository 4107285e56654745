//! Thing — the aggregate that owns properties, actions, events and
//! subscribers, and serializes every mutation through one lock.
//!
//! A [`Thing`] is a cheap, cloneable handle. All mutable state sits behind a
//! single `std::sync::Mutex` that is only held for synchronous work; fan-out
//! to subscribers happens inside that critical section so every subscriber
//! sees changes in the order they were accepted.

mod builder;
mod subscriptions;

use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use wothub_domain::action::{ActionMetadata, ActionRecord, ActionStatus};
use wothub_domain::error::{ExecutionError, NotFoundError, ThingError};
use wothub_domain::event::{EventLog, EventMetadata, EventRecord};
use wothub_domain::id::{ActionId, SubscriberId};
use wothub_domain::notification::Notification;
use wothub_domain::property::PropertyMetadata;
use wothub_domain::thing::{ThingDescription, ThingInfo, WOT_CONTEXT};
use wothub_domain::time::Timestamp;

pub use builder::ThingBuilder;
pub use subscriptions::EventFilter;

use crate::action::{ScheduledAction, schedule};
use crate::ports::{ActionHandler, Subscriber};
use crate::property::Property;
use subscriptions::Subscriptions;

const NO_RUNTIME: &str = "no async runtime available";

struct AvailableAction {
    metadata: ActionMetadata,
    handler: Arc<dyn ActionHandler>,
}

struct ThingState {
    properties: IndexMap<String, Property>,
    available_actions: IndexMap<String, AvailableAction>,
    available_events: IndexMap<String, EventMetadata>,
    actions: IndexMap<String, Vec<ActionRecord>>,
    running: HashMap<ActionId, CancellationToken>,
    events: EventLog,
    subscriptions: Subscriptions,
}

impl ThingState {
    fn new(events: EventLog) -> Self {
        Self {
            properties: IndexMap::new(),
            available_actions: IndexMap::new(),
            available_events: IndexMap::new(),
            actions: IndexMap::new(),
            running: HashMap::new(),
            events,
            subscriptions: Subscriptions::default(),
        }
    }

    fn insert_property(&mut self, property: Property) -> Result<(), ThingError> {
        builder::ensure_name(property.name())?;
        if self.properties.contains_key(property.name()) {
            return Err(ThingError::DuplicateProperty {
                name: property.name().to_string(),
            });
        }
        self.properties.insert(property.name().to_string(), property);
        Ok(())
    }

    fn property_mut(&mut self, name: &str) -> Result<&mut Property, ThingError> {
        self.properties
            .get_mut(name)
            .ok_or_else(|| ThingError::UnknownProperty {
                name: name.to_string(),
            })
    }

    fn ensure_event(&self, name: &str) -> Result<&EventMetadata, ThingError> {
        self.available_events
            .get(name)
            .ok_or_else(|| ThingError::UnknownEvent {
                name: name.to_string(),
            })
    }

    fn records(&self, name: &str) -> Result<&[ActionRecord], ThingError> {
        if !self.available_actions.contains_key(name) {
            return Err(ThingError::UnknownAction {
                name: name.to_string(),
            });
        }
        Ok(self
            .actions
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default())
    }

    fn record_mut(&mut self, name: &str, id: ActionId) -> Result<&mut ActionRecord, ThingError> {
        self.records(name)?;
        self.actions
            .get_mut(name)
            .and_then(|records| records.iter_mut().find(|r| r.id == id))
            .ok_or_else(|| action_not_found(id))
    }
}

fn action_not_found(id: ActionId) -> ThingError {
    NotFoundError {
        kind: "Action",
        id: id.to_string(),
    }
    .into()
}

struct ThingInner {
    info: ThingInfo,
    state: Mutex<ThingState>,
}

/// Shared handle on a thing.
#[derive(Clone)]
pub struct Thing {
    inner: Arc<ThingInner>,
}

impl std::fmt::Debug for Thing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Thing")
            .field("id", &self.inner.info.id)
            .field("title", &self.inner.info.title)
            .finish_non_exhaustive()
    }
}

impl Thing {
    /// Start building a thing with the given id (usually a URN) and title.
    pub fn builder(id: impl Into<String>, title: impl Into<String>) -> ThingBuilder {
        ThingBuilder::new(id, title)
    }

    fn from_parts(info: ThingInfo, state: ThingState) -> Self {
        Self {
            inner: Arc::new(ThingInner {
                info,
                state: Mutex::new(state),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ThingState> {
        self.inner
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.info.id
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.inner.info.title
    }

    #[must_use]
    pub fn info(&self) -> &ThingInfo {
        &self.inner.info
    }

    /// Snapshot of the thing and all its affordances.
    #[must_use]
    pub fn description(&self) -> ThingDescription {
        let state = self.lock();
        ThingDescription {
            context: WOT_CONTEXT.to_string(),
            info: self.inner.info.clone(),
            properties: state
                .properties
                .iter()
                .map(|(name, p)| (name.clone(), p.metadata().clone()))
                .collect(),
            actions: state
                .available_actions
                .iter()
                .map(|(name, a)| (name.clone(), a.metadata.clone()))
                .collect(),
            events: state.available_events.clone(),
        }
    }

    // properties

    /// # Errors
    ///
    /// Returns [`ThingError::DuplicateProperty`] when the name is taken.
    pub fn add_property(&self, property: Property) -> Result<(), ThingError> {
        self.lock().insert_property(property)
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownProperty`] when no property has this name.
    pub fn remove_property(&self, name: &str) -> Result<Property, ThingError> {
        self.lock()
            .properties
            .shift_remove(name)
            .ok_or_else(|| ThingError::UnknownProperty {
                name: name.to_string(),
            })
    }

    #[must_use]
    pub fn has_property(&self, name: &str) -> bool {
        self.lock().properties.contains_key(name)
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownProperty`] when no property has this name.
    pub fn property_value(&self, name: &str) -> Result<JsonValue, ThingError> {
        Ok(self.lock().property_mut(name)?.value().clone())
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownProperty`] when no property has this name.
    pub fn property_metadata(&self, name: &str) -> Result<PropertyMetadata, ThingError> {
        Ok(self.lock().property_mut(name)?.metadata().clone())
    }

    /// Current value of every property, in registration order.
    #[must_use]
    pub fn property_values(&self) -> IndexMap<String, JsonValue> {
        self.lock()
            .properties
            .iter()
            .map(|(name, p)| (name.clone(), p.value().clone()))
            .collect()
    }

    /// Apply a client write and notify subscribers.
    ///
    /// Every accepted write notifies, even when the value did not change.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownProperty`], [`ThingError::ReadOnly`],
    /// [`ThingError::Validation`] or [`ThingError::Actuation`]; in every case
    /// nothing changed and nobody was notified.
    pub fn set_property_value(&self, name: &str, raw: JsonValue) -> Result<(), ThingError> {
        let mut state = self.lock();
        let property = state.property_mut(name)?;
        property.set_value(raw)?;
        let value = property.value().clone();
        tracing::debug!(thing = self.id(), property = name, %value, "property updated");
        state.subscriptions.broadcast(&Notification::PropertyStatus {
            thing_id: self.id().to_string(),
            name: name.to_string(),
            value,
        });
        Ok(())
    }

    /// Record a reading reported by the device itself.
    ///
    /// Read-only properties accept these. Unchanged readings are dropped
    /// without notification. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownProperty`] or [`ThingError::Validation`].
    pub fn update_property(&self, name: &str, raw: JsonValue) -> Result<bool, ThingError> {
        let mut state = self.lock();
        let property = state.property_mut(name)?;
        if !property.record_reading(raw)? {
            return Ok(false);
        }
        let value = property.value().clone();
        state.subscriptions.broadcast(&Notification::PropertyStatus {
            thing_id: self.id().to_string(),
            name: name.to_string(),
            value,
        });
        Ok(true)
    }

    // events

    /// Register (or replace) an event type.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when the name is empty.
    pub fn add_available_event(
        &self,
        name: impl Into<String>,
        metadata: EventMetadata,
    ) -> Result<(), ThingError> {
        let name = name.into();
        builder::ensure_name(&name)?;
        self.lock().available_events.insert(name, metadata);
        Ok(())
    }

    /// Append an event to the log and notify subscribers.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownEvent`] when the name is not registered
    /// and [`ThingError::Validation`] when `data` violates the event schema.
    pub fn add_event(
        &self,
        name: &str,
        data: Option<JsonValue>,
    ) -> Result<EventRecord, ThingError> {
        let mut state = self.lock();
        if let (Some(schema), Some(data)) = (&state.ensure_event(name)?.data, &data) {
            schema.validate(data)?;
        }
        let record = state.events.append(name, data);
        tracing::debug!(thing = self.id(), event = name, "event emitted");
        state.subscriptions.broadcast(&Notification::Event {
            thing_id: self.id().to_string(),
            event: record.clone(),
        });
        Ok(record)
    }

    /// Every retained event, oldest first.
    #[must_use]
    pub fn events(&self) -> Vec<EventRecord> {
        self.lock().events.iter().cloned().collect()
    }

    /// Retained events stamped at or after `since`, oldest first.
    #[must_use]
    pub fn events_since(&self, since: Timestamp) -> Vec<EventRecord> {
        self.lock().events.since(since).cloned().collect()
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownEvent`] when the name is not registered.
    pub fn events_named(&self, name: &str) -> Result<Vec<EventRecord>, ThingError> {
        let state = self.lock();
        state.ensure_event(name)?;
        Ok(state
            .events
            .iter()
            .filter(|e| e.name == name)
            .cloned()
            .collect())
    }

    // actions

    /// Register (or replace) an action type and its body.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when the name is empty.
    pub fn add_available_action(
        &self,
        name: impl Into<String>,
        metadata: ActionMetadata,
        handler: impl ActionHandler + 'static,
    ) -> Result<(), ThingError> {
        let name = name.into();
        builder::ensure_name(&name)?;
        let mut state = self.lock();
        state.actions.entry(name.clone()).or_default();
        state.available_actions.insert(
            name,
            AvailableAction {
                metadata,
                handler: Arc::new(handler),
            },
        );
        Ok(())
    }

    /// Validate the input, record a `pending` action, notify subscribers and
    /// hand the body to the runtime. Returns the record as accepted, before
    /// the body starts.
    ///
    /// Without a tokio runtime the action goes straight to `error`.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownAction`] or [`ThingError::Validation`];
    /// no action is recorded in that case.
    pub fn request_action(
        &self,
        name: &str,
        input: Option<JsonValue>,
    ) -> Result<ActionRecord, ThingError> {
        let (job, pending) = {
            let mut state = self.lock();
            let available = state
                .available_actions
                .get(name)
                .ok_or_else(|| ThingError::UnknownAction {
                    name: name.to_string(),
                })?;
            if let Some(schema) = &available.metadata.input {
                schema.validate(input.as_ref().unwrap_or(&JsonValue::Null))?;
            }
            let handler = Arc::clone(&available.handler);

            let record = ActionRecord::accepted(name, input.clone());
            let cancellation = CancellationToken::new();
            state.running.insert(record.id, cancellation.clone());
            state
                .actions
                .entry(name.to_string())
                .or_default()
                .push(record.clone());
            tracing::info!(thing = self.id(), action = name, id = %record.id, "action requested");
            self.broadcast_action(&mut state, record.clone());

            let job = ScheduledAction {
                thing: self.clone(),
                handler,
                id: record.id,
                name: name.to_string(),
                input,
                cancellation,
            };
            (job, record)
        };

        if schedule(job).is_err() {
            tracing::warn!(
                thing = self.id(),
                action = name,
                id = %pending.id,
                "action could not be scheduled"
            );
            return Ok(self.fail_action(name, pending.id, NO_RUNTIME).unwrap_or(pending));
        }
        Ok(pending)
    }

    /// `pending → running`. Returns `false` when the action was cancelled or
    /// removed before it could start.
    pub(crate) fn begin_action(&self, name: &str, id: ActionId) -> bool {
        let mut state = self.lock();
        let Ok(record) = state.record_mut(name, id) else {
            return false;
        };
        if record.mark_running().is_err() {
            return false;
        }
        let record = record.clone();
        tracing::debug!(thing = self.id(), action = name, %id, "action started");
        self.broadcast_action(&mut state, record);
        true
    }

    /// `running → completed | error`, from the outcome of the body.
    pub(crate) fn finish_action(
        &self,
        name: &str,
        id: ActionId,
        result: Result<(), ExecutionError>,
    ) {
        let mut state = self.lock();
        state.running.remove(&id);
        let Ok(record) = state.record_mut(name, id) else {
            tracing::debug!(thing = self.id(), action = name, %id, "finished action was removed");
            return;
        };
        let transition = match &result {
            Ok(()) => record.mark_completed(),
            Err(err) => record.mark_failed(err.to_string()),
        };
        if let Err(err) = transition {
            tracing::warn!(
                thing = self.id(),
                action = name,
                %id,
                error = %err,
                "ignoring action outcome"
            );
            return;
        }
        let record = record.clone();
        match result {
            Ok(()) => tracing::info!(thing = self.id(), action = name, %id, "action completed"),
            Err(err) => {
                tracing::warn!(thing = self.id(), action = name, %id, error = %err, "action failed");
            }
        }
        self.broadcast_action(&mut state, record);
    }

    fn fail_action(&self, name: &str, id: ActionId, reason: &str) -> Option<ActionRecord> {
        let mut state = self.lock();
        state.running.remove(&id);
        let record = state.record_mut(name, id).ok()?;
        record.mark_failed(reason).ok()?;
        let record = record.clone();
        self.broadcast_action(&mut state, record.clone());
        Some(record)
    }

    fn broadcast_action(&self, state: &mut ThingState, action: ActionRecord) {
        state.subscriptions.broadcast(&Notification::ActionStatus {
            thing_id: self.id().to_string(),
            action,
        });
    }

    /// Cancel an action.
    ///
    /// A `pending` action moves to `error` without ever running. A
    /// `running` action is signalled and ends once its body observes the
    /// cancellation. Finished actions are left as they are. Returns the
    /// record as it stands after the call.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownAction`] or [`ThingError::NotFound`].
    pub fn cancel_action(&self, name: &str, id: ActionId) -> Result<ActionRecord, ThingError> {
        let mut state = self.lock();
        let record = state.record_mut(name, id)?;
        let status = record.status;
        if status == ActionStatus::Pending
            && record
                .mark_failed(ExecutionError::Cancelled.to_string())
                .is_ok()
        {
            let record = record.clone();
            if let Some(token) = state.running.remove(&id) {
                token.cancel();
            }
            tracing::info!(thing = self.id(), action = name, %id, "pending action cancelled");
            self.broadcast_action(&mut state, record.clone());
            return Ok(record);
        }
        let record = record.clone();
        if status == ActionStatus::Running {
            if let Some(token) = state.running.get(&id) {
                token.cancel();
            }
            tracing::info!(thing = self.id(), action = name, %id, "running action signalled");
        }
        Ok(record)
    }

    /// Cancel the action if it is still in flight, then forget it.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownAction`] or [`ThingError::NotFound`].
    pub fn remove_action(&self, name: &str, id: ActionId) -> Result<ActionRecord, ThingError> {
        let mut state = self.lock();
        state.records(name)?;
        let records = state.actions.entry(name.to_string()).or_default();
        let position = records
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| action_not_found(id))?;
        let record = records.remove(position);
        if let Some(token) = state.running.remove(&id) {
            token.cancel();
        }
        tracing::info!(thing = self.id(), action = name, %id, "action removed");
        Ok(record)
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownAction`] or [`ThingError::NotFound`].
    pub fn action(&self, name: &str, id: ActionId) -> Result<ActionRecord, ThingError> {
        Ok(self.lock().record_mut(name, id)?.clone())
    }

    /// Every recorded action, grouped by type in registration order.
    #[must_use]
    pub fn actions(&self) -> Vec<ActionRecord> {
        self.lock().actions.values().flatten().cloned().collect()
    }

    /// # Errors
    ///
    /// Returns [`ThingError::UnknownAction`] when the name is not registered.
    pub fn actions_named(&self, name: &str) -> Result<Vec<ActionRecord>, ThingError> {
        Ok(self.lock().records(name)?.to_vec())
    }

    // subscribers

    /// Deliver every future notification to `subscriber`. Subscribing twice
    /// is a no-op.
    pub fn subscribe(&self, subscriber: Arc<dyn Subscriber>) {
        self.lock().subscriptions.insert(subscriber, EventFilter::All);
    }

    /// Deliver property and action notifications, but only the listed
    /// events, to `subscriber`. Repeated calls add to the event set.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::UnknownEvent`] when a name is not registered;
    /// the subscription is then left unchanged.
    pub fn subscribe_events<I, S>(
        &self,
        subscriber: Arc<dyn Subscriber>,
        names: I,
    ) -> Result<(), ThingError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.lock();
        let names = names
            .into_iter()
            .map(Into::into)
            .map(|name: String| state.ensure_event(&name).map(|_| name))
            .collect::<Result<BTreeSet<_>, _>>()?;
        state.subscriptions.insert(subscriber, EventFilter::Only(names));
        Ok(())
    }

    /// Returns whether the subscriber was registered. Unsubscribing an
    /// unknown id is a no-op.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.lock().subscriptions.remove(id)
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.lock().subscriptions.len()
    }
}
