//! In-process subscriber backed by a bounded tokio mpsc channel.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use wothub_domain::id::SubscriberId;
use wothub_domain::notification::Notification;

use crate::ports::{DeliveryError, Subscriber};

/// Subscriber that queues notifications into a bounded [`mpsc`] channel.
///
/// A reader that falls behind fills the buffer; the next delivery then
/// fails with [`DeliveryError::Full`] and the thing drops the subscriber.
/// Dropping the receiver has the same effect on the next delivery.
pub struct ChannelSubscriber {
    id: SubscriberId,
    sender: mpsc::Sender<Notification>,
}

impl ChannelSubscriber {
    /// Create a subscriber buffering at most `capacity` notifications
    /// (at least one), together with the receiving end.
    #[must_use]
    pub fn new(capacity: usize) -> (Arc<Self>, mpsc::Receiver<Notification>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        let subscriber = Arc::new(Self {
            id: SubscriberId::new(),
            sender,
        });
        (subscriber, receiver)
    }
}

impl Subscriber for ChannelSubscriber {
    fn id(&self) -> SubscriberId {
        self.id
    }

    fn deliver(&self, notification: &Notification) -> Result<(), DeliveryError> {
        self.sender
            .try_send(notification.clone())
            .map_err(|err| match err {
                TrySendError::Full(_) => DeliveryError::Full,
                TrySendError::Closed(_) => DeliveryError::Closed,
            })
    }
}
