//! Event payload types.

use crate::types::{
    AssignmentId, ComponentId, ComponentType, PatternId, ResolutionId, ResolutionStatus,
    ThreatId, ThreatSeverity,
};

/// Payload for `on_component_created`.
#[derive(Debug, Clone)]
pub struct ComponentCreatedEvent {
    pub component_id: ComponentId,
    pub component_type: ComponentType,
}

/// Payload for `on_component_deleted`.
#[derive(Debug, Clone)]
pub struct ComponentDeletedEvent {
    pub component_id: ComponentId,
}

/// Payload for `on_threat_assigned`. Only fired for newly created rows.
#[derive(Debug, Clone)]
pub struct ThreatAssignedEvent {
    pub assignment_id: AssignmentId,
    pub threat_id: ThreatId,
    pub component_id: ComponentId,
}

/// Payload for `on_severity_changed`.
#[derive(Debug, Clone)]
pub struct SeverityChangedEvent {
    pub assignment_id: AssignmentId,
    pub severity: Option<ThreatSeverity>,
    pub residual_severity: Option<ThreatSeverity>,
}

/// Payload for `on_threat_inherited`.
#[derive(Debug, Clone)]
pub struct ThreatInheritedEvent {
    pub parent_assignment_id: AssignmentId,
    pub child_assignment_id: AssignmentId,
    pub child_component_id: ComponentId,
    pub severity: Option<ThreatSeverity>,
    /// False when an existing child assignment was updated.
    pub created: bool,
}

/// Payload for `on_resolution_changed`.
#[derive(Debug, Clone)]
pub struct ResolutionChangedEvent {
    pub resolution_id: ResolutionId,
    pub status: ResolutionStatus,
}

/// Payload for `on_delegation_created`.
#[derive(Debug, Clone)]
pub struct DelegationCreatedEvent {
    pub delegated_by: ResolutionId,
    pub delegated_to: ResolutionId,
}

/// Payload for `on_pattern_matched`.
#[derive(Debug, Clone)]
pub struct PatternMatchedEvent {
    pub component_id: ComponentId,
    pub pattern_id: PatternId,
    pub threat_id: ThreatId,
}
