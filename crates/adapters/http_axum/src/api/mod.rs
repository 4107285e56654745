//! Web Thing REST API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod actions;
#[allow(clippy::missing_errors_doc)]
pub mod events;
#[allow(clippy::missing_errors_doc)]
pub mod properties;
pub mod sse;
#[allow(clippy::missing_errors_doc)]
pub mod things;

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Build the Web Thing sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Things
        .route("/", get(things::root))
        .route("/things", get(things::list))
        .route("/things/{thing_id}", get(things::get))
        // Properties
        .route("/things/{thing_id}/properties", get(properties::list))
        .route(
            "/things/{thing_id}/properties/{name}",
            get(properties::get).put(properties::put),
        )
        // Actions
        .route("/things/{thing_id}/actions", get(actions::list))
        .route(
            "/things/{thing_id}/actions/{name}",
            get(actions::list_named).post(actions::request),
        )
        .route(
            "/things/{thing_id}/actions/{name}/{action_id}",
            get(actions::get).delete(actions::remove),
        )
        // Events
        .route("/things/{thing_id}/events", get(events::list))
        .route("/things/{thing_id}/events/{name}", get(events::list_named))
        // Live notifications
        .route("/things/{thing_id}/stream", get(sse::stream))
}
