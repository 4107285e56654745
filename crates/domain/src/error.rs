//! Common error types used across the workspace.
//!
//! Each failure family gets its own typed error. They all convert into
//! [`ThingError`] through `#[from]` so callers can use `?` freely.

/// Top-level error returned by synchronous thing operations.
///
/// Every variant is raised before any state is mutated: a call that fails
/// leaves the thing exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum ThingError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("property `{name}` is read-only")]
    ReadOnly { name: String },

    #[error("unknown property `{name}`")]
    UnknownProperty { name: String },

    #[error("unknown action `{name}`")]
    UnknownAction { name: String },

    #[error("unknown event `{name}`")]
    UnknownEvent { name: String },

    #[error("property `{name}` is already registered")]
    DuplicateProperty { name: String },

    #[error("{0}")]
    NotFound(#[from] NotFoundError),

    #[error("actuation failed: {0}")]
    Actuation(#[from] ActuationError),
}

/// A value did not satisfy its declared schema, or a descriptor is malformed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected a value of type {expected}")]
    TypeMismatch { expected: &'static str },

    #[error("{actual} is below the minimum of {minimum}")]
    BelowMinimum { minimum: f64, actual: f64 },

    #[error("{actual} is above the maximum of {maximum}")]
    AboveMaximum { maximum: f64, actual: f64 },

    #[error("{actual} is not a multiple of {multiple_of}")]
    NotMultipleOf { multiple_of: f64, actual: f64 },

    #[error("value is not one of the allowed values")]
    NotInEnum,

    #[error("length {actual} is outside the allowed range")]
    LengthOutOfRange { actual: usize },

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("invalid field `{field}`: {source}")]
    InvalidField {
        field: String,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("invalid item at index {index}: {source}")]
    InvalidItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },

    #[error("id must not be empty")]
    EmptyId,

    #[error("title must not be empty")]
    EmptyTitle,

    #[error("name must not be empty")]
    EmptyName,

    #[error("thing id `{id}` is registered twice")]
    DuplicateThingId { id: String },
}

/// Lookup of a thing or an action instance by id failed.
#[derive(Debug, thiserror::Error)]
#[error("{kind} `{id}` not found")]
pub struct NotFoundError {
    pub kind: &'static str,
    pub id: String,
}

/// The device (or its simulation) refused to apply a write.
#[derive(Debug, thiserror::Error)]
#[error("device rejected the write")]
pub struct ActuationError {
    #[source]
    source: anyhow::Error,
}

impl ActuationError {
    /// Wrap the failure reported by a forwarder.
    pub fn new(source: impl Into<anyhow::Error>) -> Self {
        Self {
            source: source.into(),
        }
    }

    /// Build an actuation error from a plain message.
    pub fn msg(message: impl std::fmt::Display + std::fmt::Debug + Send + Sync + 'static) -> Self {
        Self {
            source: anyhow::Error::msg(message),
        }
    }
}

/// Failure of an action body. Never surfaced to the requester, only recorded
/// as the reason of the action's `error` status.
#[derive(Debug, thiserror::Error)]
pub enum ExecutionError {
    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Thing(#[from] ThingError),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}
