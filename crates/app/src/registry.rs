//! Thing registry — what a server exposes: one thing, or a titled collection.

use indexmap::IndexMap;
use wothub_domain::error::{NotFoundError, ThingError, ValidationError};

use crate::thing::Thing;

/// Things served by one process. Membership is fixed at construction.
#[derive(Debug, Clone)]
pub enum ThingRegistry {
    /// A single thing, served at index `0` or under its own id.
    Single(Thing),
    /// Several things under a collection title.
    Multiple {
        title: String,
        things: IndexMap<String, Thing>,
    },
}

impl ThingRegistry {
    #[must_use]
    pub fn single(thing: Thing) -> Self {
        Self::Single(thing)
    }

    /// Build a titled collection, keyed by thing id in the given order.
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::Validation`] when the title is empty or two
    /// things share an id.
    pub fn multiple(
        title: impl Into<String>,
        things: impl IntoIterator<Item = Thing>,
    ) -> Result<Self, ThingError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle.into());
        }
        let mut by_id = IndexMap::new();
        for thing in things {
            let id = thing.id().to_string();
            if by_id.contains_key(&id) {
                return Err(ValidationError::DuplicateThingId { id }.into());
            }
            by_id.insert(id, thing);
        }
        Ok(Self::Multiple {
            title,
            things: by_id,
        })
    }

    /// Collection title, or the thing's own title in single mode.
    #[must_use]
    pub fn title(&self) -> &str {
        match self {
            Self::Single(thing) => thing.title(),
            Self::Multiple { title, .. } => title,
        }
    }

    #[must_use]
    pub fn is_single(&self) -> bool {
        matches!(self, Self::Single(_))
    }

    /// Look a thing up by id, falling back to its position (`"0"`, `"1"`, …).
    ///
    /// # Errors
    ///
    /// Returns [`ThingError::NotFound`] when neither matches.
    pub fn thing(&self, id: &str) -> Result<&Thing, ThingError> {
        let found = match self {
            Self::Single(thing) => (id == thing.id() || id == "0").then_some(thing),
            Self::Multiple { things, .. } => things.get(id).or_else(|| {
                id.parse::<usize>()
                    .ok()
                    .and_then(|index| things.get_index(index))
                    .map(|(_, thing)| thing)
            }),
        };
        found.ok_or_else(|| {
            NotFoundError {
                kind: "Thing",
                id: id.to_string(),
            }
            .into()
        })
    }

    /// Every thing, in insertion order.
    pub fn things(&self) -> impl Iterator<Item = &Thing> {
        let (single, many) = match self {
            Self::Single(thing) => (Some(thing), None),
            Self::Multiple { things, .. } => (None, Some(things.values())),
        };
        single.into_iter().chain(many.into_iter().flatten())
    }
}
