//! Server-Sent Events (SSE) stream of a thing's live notifications.

use std::convert::Infallible;

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};

use wothub_app::channel_subscriber::ChannelSubscriber;
use wothub_app::ports::Subscriber;
use wothub_app::thing::Thing;
use wothub_domain::id::SubscriberId;
use wothub_domain::notification::Notification;

use crate::error::ApiError;
use crate::state::AppState;

/// Subscription of one stream client. Unsubscribes from the thing when
/// dropped, i.e. when the client disconnects.
struct Subscription {
    thing: Thing,
    id: SubscriberId,
}

impl Subscription {
    fn open(thing: Thing, buffer: usize) -> (Self, mpsc::Receiver<Notification>) {
        let (subscriber, receiver) = ChannelSubscriber::new(buffer);
        let id = subscriber.id();
        thing.subscribe(subscriber);
        tracing::debug!(thing = thing.id(), subscriber = %id, "stream opened");
        (Self { thing, id }, receiver)
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.thing.unsubscribe(self.id);
        tracing::debug!(thing = self.thing.id(), subscriber = %self.id, "stream closed");
    }
}

fn to_sse(notification: &Notification) -> Option<Event> {
    let kind = match notification {
        Notification::PropertyStatus { .. } => "propertyStatus",
        Notification::Event { .. } => "event",
        Notification::ActionStatus { .. } => "actionStatus",
    };
    match serde_json::to_string(notification) {
        Ok(json) => Some(Event::default().event(kind).data(json)),
        Err(err) => {
            tracing::warn!(%err, "failed to serialize notification for SSE stream");
            None
        }
    }
}

/// `GET /things/{thing_id}/stream` — SSE stream of property, event and
/// action notifications.
///
/// Each notification is sent as a JSON `data:` frame, with its message type
/// as the SSE event name. A client that falls more than the configured
/// buffer behind is dropped by the thing, which ends the stream.
///
/// # Errors
///
/// Returns a not-found error when the thing does not exist.
pub async fn stream(
    State(state): State<AppState>,
    Path(thing_id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let thing = state.registry.thing(&thing_id)?.clone();
    let (subscription, receiver) = Subscription::open(thing, state.stream_buffer);
    let events = ReceiverStream::new(receiver).filter_map(move |notification| {
        // the subscription lives as long as the stream
        let _subscription = &subscription;
        to_sse(&notification).map(Ok)
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::testing::lamp_app;

    #[tokio::test]
    async fn should_stream_property_changes_and_unsubscribe_on_drop() {
        let (app, lamp) = lamp_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/things/0/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(lamp.subscriber_count(), 1);

        lamp.set_property_value("level", json!(75)).unwrap();

        let mut body = response.into_body();
        let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
            .await
            .unwrap()
            .unwrap()
            .unwrap();
        let text = String::from_utf8(frame.into_data().unwrap().to_vec()).unwrap();
        assert!(text.contains("event: propertyStatus"));
        assert!(text.contains(r#""value":75"#));

        drop(body);
        assert_eq!(lamp.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_thing() {
        let (app, _) = lamp_app();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/things/9/stream")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
