//! Property — a named, schema-checked [`Value`].

use serde_json::Value as JsonValue;
use wothub_domain::error::ThingError;
use wothub_domain::property::PropertyMetadata;

use crate::value::Value;

/// Binds a [`Value`] to a name and the metadata that constrains writes.
#[derive(Debug)]
pub struct Property {
    name: String,
    metadata: PropertyMetadata,
    value: Value,
}

impl Property {
    pub fn new(name: impl Into<String>, value: Value, metadata: PropertyMetadata) -> Self {
        Self {
            name: name.into(),
            metadata,
            value,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn metadata(&self) -> &PropertyMetadata {
        &self.metadata
    }

    #[must_use]
    pub fn value(&self) -> &JsonValue {
        self.value.get()
    }

    /// Check that a client may write `raw`, without writing it.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::ReadOnly`] for read-only properties and
    /// [`ThingError::Validation`] when `raw` does not satisfy the schema.
    pub fn validate(&self, raw: &JsonValue) -> Result<(), ThingError> {
        if self.metadata.read_only {
            return Err(ThingError::ReadOnly {
                name: self.name.clone(),
            });
        }
        self.metadata.schema.validate(raw)?;
        Ok(())
    }

    /// Validate then store a client write.
    ///
    /// # Errors
    ///
    /// See [`validate`](Self::validate); additionally returns
    /// [`ThingError::Actuation`] when the device refuses the value.
    pub fn set_value(&mut self, raw: JsonValue) -> Result<(), ThingError> {
        self.validate(&raw)?;
        self.value.set(raw)?;
        Ok(())
    }

    /// Store a reading reported by the device. Read-only properties accept
    /// these; the schema still applies. Returns whether the value changed.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when the reading violates the schema.
    pub fn record_reading(&mut self, raw: JsonValue) -> Result<bool, ThingError> {
        self.metadata.schema.validate(&raw)?;
        Ok(self.value.notify_of_external_update(raw))
    }
}
