//! Forwarder port — pushes accepted writes to the device.

use serde_json::Value as JsonValue;
use wothub_domain::error::ActuationError;

/// Applies a new value to real or simulated hardware before it is stored.
///
/// Runs inside the owning thing's critical section, so writes reach the
/// device in the same order they are accepted.
pub trait Forwarder: Send + Sync {
    /// Apply `value` to the device.
    ///
    /// # Errors
    ///
    /// Returns [`ActuationError`] when the device refuses the write; the
    /// stored value is then left untouched.
    fn forward(&self, value: &JsonValue) -> Result<(), ActuationError>;
}

impl<F> Forwarder for F
where
    F: Fn(&JsonValue) -> Result<(), ActuationError> + Send + Sync,
{
    fn forward(&self, value: &JsonValue) -> Result<(), ActuationError> {
        self(value)
    }
}
