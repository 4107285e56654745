//! Typed identifier newtypes backed by UUIDs.
//!
//! Things carry caller-chosen string ids (usually URNs) and are not covered
//! here; only runtime-generated identities are.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

macro_rules! define_id {
    ($(#[doc = $doc:expr])* $name:ident) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(uuid::Uuid);

        impl Default for $name {
            fn default() -> Self {
                Self(uuid::Uuid::new_v4())
            }
        }

        impl $name {
            /// Generate a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self::default()
            }

            /// Access the inner UUID.
            #[must_use]
            pub fn as_uuid(self) -> uuid::Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                // simple form, matches the hex ids used in action hrefs
                self.0.simple().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                uuid::Uuid::parse_str(s).map(Self)
            }
        }
    };
}

define_id!(
    /// Unique identifier of a requested [`ActionRecord`](crate::action::ActionRecord).
    ActionId
);

define_id!(
    /// Identity of a live notification subscriber.
    SubscriberId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_generate_unique_ids_when_called_twice() {
        let a = ActionId::new();
        let b = ActionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn should_display_as_simple_hex() {
        let id = ActionId::new();
        let text = id.to_string();
        assert_eq!(text.len(), 32);
        assert!(!text.contains('-'));
    }

    #[test]
    fn should_parse_both_simple_and_hyphenated_forms() {
        let id = SubscriberId::new();
        let simple: SubscriberId = id.to_string().parse().unwrap();
        let hyphenated: SubscriberId = id.as_uuid().hyphenated().to_string().parse().unwrap();
        assert_eq!(simple, id);
        assert_eq!(hyphenated, id);
    }

    #[test]
    fn should_return_error_when_parsing_invalid_uuid() {
        let result = ActionId::from_str("not-a-uuid");
        assert!(result.is_err());
    }
}
