//! Subscriber set of a thing and the fan-out over it.

use std::collections::BTreeSet;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use indexmap::IndexMap;
use wothub_domain::id::SubscriberId;
use wothub_domain::notification::Notification;

use crate::ports::Subscriber;

/// Which event notifications a subscriber receives. Property and action
/// notifications are always delivered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventFilter {
    All,
    Only(BTreeSet<String>),
}

impl EventFilter {
    fn accepts(&self, notification: &Notification) -> bool {
        match (self, notification.event_name()) {
            (Self::Only(names), Some(name)) => names.contains(name),
            _ => true,
        }
    }

    fn merge(&mut self, other: Self) {
        match other {
            Self::All => *self = Self::All,
            Self::Only(more) => {
                if let Self::Only(names) = self {
                    names.extend(more);
                }
            }
        }
    }
}

struct Entry {
    subscriber: Arc<dyn Subscriber>,
    filter: EventFilter,
}

/// Registered subscribers, in subscription order.
#[derive(Default)]
pub(crate) struct Subscriptions {
    entries: IndexMap<SubscriberId, Entry>,
}

impl Subscriptions {
    /// Register `subscriber`, or widen its filter when already registered.
    pub(crate) fn insert(&mut self, subscriber: Arc<dyn Subscriber>, filter: EventFilter) {
        let id = subscriber.id();
        if let Some(entry) = self.entries.get_mut(&id) {
            entry.filter.merge(filter);
            return;
        }
        self.entries.insert(id, Entry { subscriber, filter });
    }

    pub(crate) fn remove(&mut self, id: SubscriberId) -> bool {
        self.entries.shift_remove(&id).is_some()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    /// Hand `notification` to every interested subscriber. Subscribers that
    /// fail to accept it, or panic while doing so, are dropped.
    pub(crate) fn broadcast(&mut self, notification: &Notification) {
        self.entries.retain(|id, entry| {
            if !entry.filter.accepts(notification) {
                return true;
            }
            match catch_unwind(AssertUnwindSafe(|| entry.subscriber.deliver(notification))) {
                Ok(Ok(())) => true,
                Ok(Err(err)) => {
                    tracing::warn!(
                        thing = notification.thing_id(),
                        subscriber = %id,
                        error = %err,
                        "dropping subscriber"
                    );
                    false
                }
                Err(_) => {
                    tracing::warn!(
                        thing = notification.thing_id(),
                        subscriber = %id,
                        "dropping panicking subscriber"
                    );
                    false
                }
            }
        });
    }
}
