// Opaque identifiers for core entities
//
// Every entity id is a uuid newtype so the compiler rejects mixing a
// ParticipantId with a GroupId even though both are uuids on the wire.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! entity_id {
    ($name:ident, $doc:literal) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random id
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

entity_id!(ParticipantId, "Identity of a registered participant");
entity_id!(GroupId, "Identity of a therapy group");
entity_id!(SessionId, "Identity of one scheduled group session");

/// Identity of a scored activity within a session.
///
/// Activities are named by the caller (worksheet, exercise, game), so this
/// wraps a label rather than a uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActivityId(String);

impl ActivityId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ActivityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for ActivityId {
    fn from(label: &str) -> Self {
        Self(label.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(ParticipantId::new(), ParticipantId::new());
        assert_ne!(SessionId::new(), SessionId::new());
    }

    #[test]
    fn test_activity_id_from_label() {
        let id = ActivityId::from("matching-cards");
        assert_eq!(id.as_str(), "matching-cards");
        assert_eq!(id, ActivityId::new("matching-cards".to_string()));
    }
}
