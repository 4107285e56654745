//! Action requests and their status.

use std::str::FromStr;

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::Value as JsonValue;

use wothub_domain::action::ActionRecord;
use wothub_domain::error::{NotFoundError, ThingError};
use wothub_domain::id::ActionId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for requesting an action. An empty body means no input.
#[derive(Debug, Default, Deserialize)]
pub struct ActionRequest {
    #[serde(default)]
    pub input: Option<JsonValue>,
}

/// Possible responses from the request endpoint.
pub enum RequestResponse {
    Created(Json<ActionRecord>),
}

impl IntoResponse for RequestResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Created(json) => (StatusCode::CREATED, json).into_response(),
        }
    }
}

/// Possible responses from the delete endpoint.
pub enum DeleteResponse {
    NoContent,
}

impl IntoResponse for DeleteResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

fn parse_action_id(raw: &str) -> Result<ActionId, ApiError> {
    ActionId::from_str(raw).map_err(|_| {
        ApiError::from(ThingError::NotFound(NotFoundError {
            kind: "Action",
            id: raw.to_string(),
        }))
    })
}

/// `GET /things/{thing_id}/actions`
pub async fn list(
    State(state): State<AppState>,
    Path(thing_id): Path<String>,
) -> Result<Json<Vec<ActionRecord>>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    Ok(Json(thing.actions()))
}

/// `GET /things/{thing_id}/actions/{name}`
pub async fn list_named(
    State(state): State<AppState>,
    Path((thing_id, name)): Path<(String, String)>,
) -> Result<Json<Vec<ActionRecord>>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    Ok(Json(thing.actions_named(&name)?))
}

/// `POST /things/{thing_id}/actions/{name}`
///
/// Answers as soon as the action is pending; its progress is visible through
/// the status endpoint and the notification stream.
pub async fn request(
    State(state): State<AppState>,
    Path((thing_id, name)): Path<(String, String)>,
    body: Bytes,
) -> Result<RequestResponse, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let request = if body.is_empty() {
        ActionRequest::default()
    } else {
        serde_json::from_slice::<ActionRequest>(&body)
            .map_err(|err| ApiError::BadRequest(format!("invalid action request: {err}")))?
    };
    let record = thing.request_action(&name, request.input)?;
    Ok(RequestResponse::Created(Json(record)))
}

/// `GET /things/{thing_id}/actions/{name}/{action_id}`
pub async fn get(
    State(state): State<AppState>,
    Path((thing_id, name, action_id)): Path<(String, String, String)>,
) -> Result<Json<ActionRecord>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let id = parse_action_id(&action_id)?;
    Ok(Json(thing.action(&name, id)?))
}

/// `DELETE /things/{thing_id}/actions/{name}/{action_id}`
///
/// Cancels the action if it is still in flight, then forgets it.
pub async fn remove(
    State(state): State<AppState>,
    Path((thing_id, name, action_id)): Path<(String, String, String)>,
) -> Result<DeleteResponse, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    let id = parse_action_id(&action_id)?;
    thing.remove_action(&name, id)?;
    Ok(DeleteResponse::NoContent)
}
