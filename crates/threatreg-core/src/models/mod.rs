//! Domain records shared by the storage and registry crates.

pub mod assignment;
pub mod attribute;
pub mod component;
pub mod control;
pub mod domain;
pub mod pattern;
pub mod relationship;
pub mod resolution;
pub mod tag;
pub mod threat;

pub use assignment::{AssignmentLink, ThreatAssignment, ThreatAssignmentWithResolution};
pub use attribute::ComponentAttribute;
pub use component::{Component, ComponentWithThreatStats};
pub use control::{Control, ControlAssignment, ThreatControl};
pub use domain::Domain;
pub use pattern::{PatternCondition, ThreatPattern};
pub use relationship::{ComponentRelationship, ComponentTreePath};
pub use resolution::{Delegation, Resolution, ResolutionWithDelegation};
pub use tag::Tag;
pub use threat::{Threat, ThreatWithUnresolvedCount};
