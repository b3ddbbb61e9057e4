//! UUID-backed ID types.
//!
//! Each ID type wraps a `uuid::Uuid` to prevent cross-type confusion.
//! A `ThreatId` cannot be accidentally used where a `ComponentId` is expected.
//! IDs are stored in SQLite as hyphenated TEXT.

use std::fmt;
use std::str::FromStr;

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a fresh random ID.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Get the inner `Uuid`.
            pub fn inner(self) -> Uuid {
                self.0
            }

            /// The nil ID, used as an "unset" marker in validation.
            pub fn nil() -> Self {
                Self(Uuid::nil())
            }

            pub fn is_nil(&self) -> bool {
                self.0.is_nil()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl From<$name> for Uuid {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.hyphenated().fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim()).map(Self)
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.to_string()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                let text = value.as_str()?;
                Uuid::parse_str(text)
                    .map(Self)
                    .map_err(|e| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

define_id!(
    /// Component (product or instance) identifier.
    ComponentId
);

define_id!(
    /// Threat identifier.
    ThreatId
);

define_id!(
    /// Control identifier.
    ControlId
);

define_id!(
    /// Domain identifier.
    DomainId
);

define_id!(
    /// Tag identifier.
    TagId
);

define_id!(
    /// Component relationship identifier.
    RelationshipId
);

define_id!(
    /// Component attribute identifier.
    AttributeId
);

define_id!(
    /// Threat assignment identifier.
    AssignmentId
);

define_id!(
    /// Link between two threat assignments (e.g. inheritance).
    AssignmentLinkId
);

define_id!(
    /// Threat-to-control link identifier.
    ThreatControlId
);

define_id!(
    /// Control-to-assignment link identifier.
    ControlAssignmentId
);

define_id!(
    /// Resolution identifier.
    ResolutionId
);

define_id!(
    /// Delegation identifier.
    DelegationId
);

define_id!(
    /// Threat pattern identifier.
    PatternId
);

define_id!(
    /// Pattern condition identifier.
    ConditionId
);
