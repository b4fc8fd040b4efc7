//! Core type definitions with validation.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Validation errors for core types.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The provided value was empty.
    #[error("{field} cannot be empty")]
    Empty { field: &'static str },
}

/// Generates a validated string ID newtype with common trait implementations.
macro_rules! define_string_id {
    (
        $(#[$meta:meta])*
        $name:ident, $field_name:literal
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Creates a new ID after validation.
            pub fn new(id: impl Into<String>) -> Result<Self, ValidationError> {
                let id = id.into();
                if id.is_empty() {
                    return Err(ValidationError::Empty { field: $field_name });
                }
                Ok(Self(id))
            }

            /// Returns the ID as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

define_string_id!(
    /// A validated event identifier.
    ///
    /// Event IDs must be non-empty and stable across recomputations; the slot
    /// map is keyed by them.
    EventId, "event ID"
);

define_string_id!(
    /// A validated resource identifier (a vehicle, a supplier, ...).
    ResourceId, "resource ID"
);

/// A visual lane number.
///
/// Only meaningful within a single computed snapshot: recomputing after the
/// event set changes may hand an event a different track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Track(u32);

impl Track {
    /// The first lane.
    pub const FIRST: Self = Self(0);

    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    /// The lane directly below this one.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl From<u32> for Track {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_id_valid() {
        let id = EventId::new("booking-42").unwrap();
        assert_eq!(id.as_str(), "booking-42");
        assert_eq!(id.to_string(), "booking-42");
    }

    #[test]
    fn test_event_id_empty_rejected() {
        let err = EventId::new("").unwrap_err();
        assert_eq!(err, ValidationError::Empty { field: "event ID" });
        assert_eq!(err.to_string(), "event ID cannot be empty");
    }

    #[test]
    fn test_resource_id_deserialize_rejects_empty() {
        let result: Result<ResourceId, _> = serde_json::from_str(r#""""#);
        assert!(result.is_err());

        let id: ResourceId = serde_json::from_str(r#""van-7""#).unwrap();
        assert_eq!(id.as_str(), "van-7");
    }

    #[test]
    fn test_track_ordering_and_next() {
        assert_eq!(Track::FIRST.next(), Track::new(1));
        assert!(Track::new(2) > Track::new(1));
        assert_eq!(serde_json::to_string(&Track::new(3)).unwrap(), "3");
    }
}
