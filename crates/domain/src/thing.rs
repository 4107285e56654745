//! Thing identity and the serializable Thing Description.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::action::ActionMetadata;
use crate::error::{ThingError, ValidationError};
use crate::event::EventMetadata;
use crate::property::PropertyMetadata;

/// JSON-LD context advertised by every description.
pub const WOT_CONTEXT: &str = "https://webthings.io/schemas";

/// Immutable identity of a thing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThingInfo {
    pub id: String,
    pub title: String,
    #[serde(rename = "@type", default)]
    pub types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ThingInfo {
    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when `id` or `title` is empty.
    pub fn validate(&self) -> Result<(), ThingError> {
        if self.id.trim().is_empty() {
            return Err(ValidationError::EmptyId.into());
        }
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        Ok(())
    }
}

/// Point-in-time description of a thing and its interaction affordances.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThingDescription {
    #[serde(rename = "@context")]
    pub context: String,
    #[serde(flatten)]
    pub info: ThingInfo,
    pub properties: IndexMap<String, PropertyMetadata>,
    pub actions: IndexMap<String, ActionMetadata>,
    pub events: IndexMap<String, EventMetadata>,
}
