//! Typed identifiers, severity and the enumerations the registry persists.

pub mod collections;
pub mod identifiers;
pub mod kinds;
pub mod pattern;
pub mod severity;
mod sql;

pub use collections::{FxHashMap, FxHashSet, SmallVec4};
pub use identifiers::{
    AssignmentId, AssignmentLinkId, AttributeId, ComponentId, ControlAssignmentId, ControlId,
    DelegationId, DomainId, PatternId, ConditionId, RelationshipId, ResolutionId, TagId,
    ThreatControlId, ThreatId,
};
pub use kinds::{AttributeType, ComponentType, ResolutionStatus};
pub use pattern::{ConditionType, PatternOperator};
pub use severity::ThreatSeverity;
