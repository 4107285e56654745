//! Property reads and writes.
//!
//! Single-property bodies are `{"<name>": value}` in both directions.

use axum::Json;
use axum::extract::{Path, State};
use serde_json::{Map, Value as JsonValue};

use crate::error::ApiError;
use crate::state::AppState;

type PropertyBody = Map<String, JsonValue>;

/// `GET /things/{thing_id}/properties`
pub async fn list(
    State(state): State<AppState>,
    Path(thing_id): Path<String>,
) -> Result<Json<PropertyBody>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    Ok(Json(thing.property_values().into_iter().collect()))
}

/// `GET /things/{thing_id}/properties/{name}`
pub async fn get(
    State(state): State<AppState>,
    Path((thing_id, name)): Path<(String, String)>,
) -> Result<Json<PropertyBody>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let value = thing.property_value(&name)?;
    Ok(Json(single(name, value)))
}

/// `PUT /things/{thing_id}/properties/{name}`
pub async fn put(
    State(state): State<AppState>,
    Path((thing_id, name)): Path<(String, String)>,
    Json(mut body): Json<PropertyBody>,
) -> Result<Json<PropertyBody>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let raw = body.remove(&name).ok_or_else(|| {
        ApiError::BadRequest(format!("expected a body like {{\"{name}\": value}}"))
    })?;
    thing.set_property_value(&name, raw)?;
    let value = thing.property_value(&name)?;
    Ok(Json(single(name, value)))
}

fn single(name: String, value: JsonValue) -> PropertyBody {
    let mut body = PropertyBody::new();
    body.insert(name, value);
    body
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::{lamp_app, send};

    #[tokio::test]
    async fn should_list_property_values() {
        let (app, _) = lamp_app();

        let (status, body) = send(app, Method::GET, "/things/0/properties", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["on"], true);
        assert_eq!(body["level"], 50);
    }

    #[tokio::test]
    async fn should_write_level_within_bounds() {
        let (app, lamp) = lamp_app();

        let (status, body) = send(
            app,
            Method::PUT,
            "/things/0/properties/level",
            Some(json!({"level": 75})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"level": 75}));
        assert_eq!(lamp.property_value("level").unwrap(), json!(75));
    }

    #[tokio::test]
    async fn should_reject_level_out_of_bounds() {
        let (app, lamp) = lamp_app();

        let (status, body) = send(
            app,
            Method::PUT,
            "/things/0/properties/level",
            Some(json!({"level": 150})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "150 is above the maximum of 100");
        assert_eq!(lamp.property_value("level").unwrap(), json!(50));
    }

    #[tokio::test]
    async fn should_forbid_writing_read_only_property() {
        let (app, _) = lamp_app();
        let (status, _) = send(
            app,
            Method::PUT,
            "/things/0/properties/temperature",
            Some(json!({"temperature": 30.0})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn should_report_device_refusal_as_bad_gateway() {
        let (app, _) = lamp_app();
        let (status, _) = send(
            app,
            Method::PUT,
            "/things/0/properties/color",
            Some(json!({"color": "#000000"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn should_reject_body_without_property_name() {
        let (app, _) = lamp_app();
        let (status, _) = send(
            app,
            Method::PUT,
            "/things/0/properties/level",
            Some(json!({"brightness": 10})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn should_return_not_found_for_unknown_property() {
        let (app, _) = lamp_app();
        let (status, _) = send(app, Method::GET, "/things/0/properties/humidity", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
