//! HTTP error response mapping.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use wothub_domain::error::ThingError;

/// JSON error body returned by API endpoints.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Maps [`ThingError`] (and malformed requests) to an HTTP response with
/// the appropriate status code.
#[derive(Debug)]
pub enum ApiError {
    Thing(ThingError),
    BadRequest(String),
}

impl From<ThingError> for ApiError {
    fn from(err: ThingError) -> Self {
        Self::Thing(err)
    }
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Thing(ThingError::Validation(_)) => StatusCode::BAD_REQUEST,
            Self::Thing(ThingError::ReadOnly { .. }) => StatusCode::FORBIDDEN,
            Self::Thing(
                ThingError::UnknownProperty { .. }
                | ThingError::UnknownAction { .. }
                | ThingError::UnknownEvent { .. }
                | ThingError::NotFound(_),
            ) => StatusCode::NOT_FOUND,
            Self::Thing(ThingError::DuplicateProperty { .. }) => StatusCode::CONFLICT,
            Self::Thing(ThingError::Actuation(_)) => StatusCode::BAD_GATEWAY,
        }
    }

    fn message(&self) -> String {
        match self {
            Self::BadRequest(message) => message.clone(),
            Self::Thing(ThingError::Validation(err)) => err.to_string(),
            Self::Thing(ThingError::NotFound(err)) => err.to_string(),
            Self::Thing(ThingError::Actuation(err)) => {
                tracing::error!(error = ?err, "device rejected write");
                err.to_string()
            }
            Self::Thing(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error = self.message();
        (status, Json(ErrorBody { error })).into_response()
    }
}
