//! # wothub-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **Web Thing REST API**: thing descriptions, property
//!   reads/writes, action requests and the event log
//!   (`/things/{thing_id}/properties`, `/things/{thing_id}/actions`, …)
//! - Stream live notifications as **Server-Sent Events**
//!   (`/things/{thing_id}/stream`)
//! - Map HTTP requests into thing operations (driving adapter)
//! - Map [`ThingError`](wothub_domain::error::ThingError)s into status codes
//!
//! ## Dependency rule
//! Depends on `wothub-app` (for the thing model) and `wothub-domain` (for
//! types used in request/response mapping). Never leaks axum types into the
//! domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;
