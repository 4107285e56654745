//! Thing descriptions.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use wothub_app::registry::ThingRegistry;
use wothub_app::thing::Thing;
use wothub_domain::thing::ThingDescription;

use crate::error::ApiError;
use crate::state::AppState;

/// A thing description together with the path it is served under.
#[derive(Serialize)]
pub struct ThingResource {
    #[serde(flatten)]
    pub description: ThingDescription,
    pub href: String,
}

impl ThingResource {
    fn new(thing: &Thing, registry: &ThingRegistry) -> Self {
        let href = if registry.is_single() {
            "/things/0".to_string()
        } else {
            format!("/things/{}", thing.id())
        };
        Self {
            description: thing.description(),
            href,
        }
    }
}

/// Collection served in multiple-things mode.
#[derive(Serialize)]
pub struct ThingCollection {
    pub title: String,
    pub things: Vec<ThingResource>,
}

/// Possible responses from the root endpoint.
pub enum RootResponse {
    Single(Json<ThingResource>),
    Multiple(Json<ThingCollection>),
}

impl IntoResponse for RootResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Single(json) => json.into_response(),
            Self::Multiple(json) => json.into_response(),
        }
    }
}

/// `GET /`
pub async fn root(State(state): State<AppState>) -> RootResponse {
    let registry = &state.registry;
    match registry.as_ref() {
        ThingRegistry::Single(thing) => {
            RootResponse::Single(Json(ThingResource::new(thing, registry)))
        }
        ThingRegistry::Multiple { title, things } => {
            RootResponse::Multiple(Json(ThingCollection {
                title: title.clone(),
                things: things
                    .values()
                    .map(|thing| ThingResource::new(thing, registry))
                    .collect(),
            }))
        }
    }
}

/// `GET /things`
pub async fn list(State(state): State<AppState>) -> Json<Vec<ThingResource>> {
    let registry = &state.registry;
    Json(
        registry
            .things()
            .map(|thing| ThingResource::new(thing, registry))
            .collect(),
    )
}

/// `GET /things/{thing_id}`
pub async fn get(
    State(state): State<AppState>,
    Path(thing_id): Path<String>,
) -> Result<Json<ThingResource>, ApiError> {
    let thing = state.registry.thing(&thing_id)?;
    Ok(Json(ThingResource::new(thing, &state.registry)))
}
