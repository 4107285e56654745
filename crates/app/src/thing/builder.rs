use std::sync::Arc;

use wothub_domain::action::ActionMetadata;
use wothub_domain::error::{ThingError, ValidationError};
use wothub_domain::event::{EventLog, EventMetadata, EventRetention};
use wothub_domain::thing::ThingInfo;

use super::{AvailableAction, Thing, ThingState};
use crate::ports::ActionHandler;
use crate::property::Property;

/// Step-by-step builder for [`Thing`].
pub struct ThingBuilder {
    info: ThingInfo,
    properties: Vec<Property>,
    actions: Vec<(String, AvailableAction)>,
    events: Vec<(String, EventMetadata)>,
    retention: EventRetention,
}

impl ThingBuilder {
    pub(super) fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            info: ThingInfo {
                id: id.into(),
                title: title.into(),
                types: Vec::new(),
                description: None,
            },
            properties: Vec::new(),
            actions: Vec::new(),
            events: Vec::new(),
            retention: EventRetention::default(),
        }
    }

    /// Add a semantic `@type` such as `Light` or `OnOffSwitch`.
    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.info.types.push(semantic_type.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.info.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn property(mut self, property: Property) -> Self {
        self.properties.push(property);
        self
    }

    /// Register an action type together with the body run for each request.
    #[must_use]
    pub fn action(
        mut self,
        name: impl Into<String>,
        metadata: ActionMetadata,
        handler: impl ActionHandler + 'static,
    ) -> Self {
        self.actions.push((
            name.into(),
            AvailableAction {
                metadata,
                handler: Arc::new(handler),
            },
        ));
        self
    }

    #[must_use]
    pub fn event(mut self, name: impl Into<String>, metadata: EventMetadata) -> Self {
        self.events.push((name.into(), metadata));
        self
    }

    /// Bound the event log. Unbounded by default.
    #[must_use]
    pub fn event_retention(mut self, retention: EventRetention) -> Self {
        self.retention = retention;
        self
    }

    /// Consume the builder, validate, and return a [`Thing`].
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when the id, the title or any
    /// affordance name is empty, and [`ThingError::DuplicateProperty`] when
    /// two properties share a name.
    pub fn build(self) -> Result<Thing, ThingError> {
        self.info.validate()?;

        let mut state = ThingState::new(EventLog::new(self.retention));
        for property in self.properties {
            state.insert_property(property)?;
        }
        for (name, action) in self.actions {
            ensure_name(&name)?;
            state.actions.entry(name.clone()).or_default();
            state.available_actions.insert(name, action);
        }
        for (name, metadata) in self.events {
            ensure_name(&name)?;
            state.available_events.insert(name, metadata);
        }

        Ok(Thing::from_parts(self.info, state))
    }
}

pub(super) fn ensure_name(name: &str) -> Result<(), ThingError> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wothub_domain::property::PropertyMetadata;
    use wothub_domain::schema::DataSchema;

    use crate::value::Value;

    fn on() -> Property {
        Property::new("on", Value::new(false), PropertyMetadata::new(DataSchema::Boolean))
    }

    #[test]
    fn should_build_thing_with_affordances() {
        let thing = Thing::builder("urn:dev:lamp", "Lamp")
            .semantic_type("Light")
            .description("A web connected lamp")
            .property(on())
            .event("overheated", EventMetadata::default())
            .build()
            .unwrap();

        assert_eq!(thing.id(), "urn:dev:lamp");
        assert_eq!(thing.info().types, vec!["Light".to_string()]);
        assert!(thing.has_property("on"));
    }

    #[test]
    fn should_reject_empty_title() {
        let result = Thing::builder("urn:dev:lamp", "").build();
        assert!(matches!(
            result,
            Err(ThingError::Validation(ValidationError::EmptyTitle))
        ));
    }

    #[test]
    fn should_reject_duplicate_property() {
        let result = Thing::builder("urn:dev:lamp", "Lamp")
            .property(on())
            .property(on())
            .build();
        assert!(matches!(result, Err(ThingError::DuplicateProperty { name }) if name == "on"));
    }

    #[test]
    fn should_reject_blank_event_name() {
        let result = Thing::builder("urn:dev:lamp", "Lamp")
            .event(" ", EventMetadata::default())
            .build();
        assert!(matches!(
            result,
            Err(ThingError::Validation(ValidationError::EmptyName))
        ));
    }
}
