//! Event log queries.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;

use wothub_domain::event::EventRecord;
use wothub_domain::time::Timestamp;

use crate::error::ApiError;
use crate::state::AppState;

/// Query parameters for listing events.
#[derive(Debug, Deserialize)]
pub struct EventsQuery {
    /// Only events stamped at or after this RFC 3339 instant.
    pub since: Option<Timestamp>,
}

/// `GET /things/{thing_id}/events`
pub async fn list(
    State(state): State<AppState>,
    Path(thing_id): Path<String>,
    Query(query): Query<EventsQuery>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let events = match query.since {
        Some(since) => thing.events_since(since),
        None => thing.events(),
    };
    Ok(Json(events))
}

/// `GET /things/{thing_id}/events/{name}`
pub async fn list_named(
    State(state): State<AppState>,
    Path((thing_id, name)): Path<(String, String)>,
) -> Result<Json<Vec<EventRecord>>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    Ok(Json(thing.events_named(&name)?))
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use chrono::{SecondsFormat, TimeDelta};
    use serde_json::json;

    use crate::testing::{lamp_app, send};

    #[tokio::test]
    async fn should_list_events_in_order() {
        let (app, lamp) = lamp_app();
        lamp.add_event("overheated", Some(json!(101))).unwrap();
        lamp.add_event("overheated", Some(json!(102))).unwrap();

        let (status, body) = send(app, Method::GET, "/things/0/events", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["data"], 101);
        assert_eq!(body[1]["data"], 102);
        assert_eq!(body[0]["name"], "overheated");
    }

    #[tokio::test]
    async fn should_filter_events_since_timestamp() {
        let (app, lamp) = lamp_app();
        let first = lamp.add_event("overheated", Some(json!(101))).unwrap();

        let later = (first.timestamp + TimeDelta::hours(1)).to_rfc3339_opts(SecondsFormat::Micros, true);
        let (status, body) = send(
            app.clone(),
            Method::GET,
            &format!("/things/0/events?since={later}"),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let earlier = (first.timestamp - TimeDelta::hours(1)).to_rfc3339_opts(SecondsFormat::Micros, true);
        let (_, body) = send(
            app,
            Method::GET,
            &format!("/things/0/events?since={earlier}"),
            None,
        )
        .await;
        assert_eq!(body.as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn should_reject_malformed_since() {
        let (app, _) = lamp_app();
        let (status, _) = send(app, Method::GET, "/things/0/events?since=yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_list_events_by_name() {
        let (app, lamp) = lamp_app();
        lamp.add_event("overheated", None).unwrap();

        let (status, body) = send(app.clone(), Method::GET, "/things/0/events/overheated", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().map(Vec::len), Some(1));

        let (status, _) = send(app, Method::GET, "/things/0/events/pressed", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
