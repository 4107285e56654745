//! Subscriber port — sinks receiving live notifications from a thing.

use wothub_domain::id::SubscriberId;
use wothub_domain::notification::Notification;

/// Why a notification could not be handed to a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DeliveryError {
    #[error("subscriber buffer is full")]
    Full,
    #[error("subscriber is closed")]
    Closed,
}

/// A registered sink for property, event and action notifications.
///
/// `deliver` is called while the thing's lock is held, in the order the
/// changes were accepted. It must hand the notification off without
/// blocking (e.g. `try_send` into a bounded channel). Returning an error
/// unregisters the subscriber.
pub trait Subscriber: Send + Sync {
    /// Stable identity, used to make subscription idempotent.
    fn id(&self) -> SubscriberId;

    /// Hand one notification to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`DeliveryError`] when the sink cannot accept it right now.
    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError>;
}
