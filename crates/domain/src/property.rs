//! Property metadata — the descriptive half of a property.
//!
//! The live value lives in the application layer; this type only carries
//! what a Thing Description advertises about the property.

use serde::{Deserialize, Serialize};

use crate::schema::DataSchema;

/// Advertised description of a property: its schema plus human-facing
/// annotations and the read-only flag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyMetadata {
    #[serde(flatten)]
    pub schema: DataSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub read_only: bool,
}

impl PropertyMetadata {
    /// Metadata with the given schema and no annotations.
    #[must_use]
    pub fn new(schema: DataSchema) -> Self {
        Self {
            schema,
            title: None,
            description: None,
            semantic_type: None,
            read_only: false,
        }
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    #[must_use]
    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}
