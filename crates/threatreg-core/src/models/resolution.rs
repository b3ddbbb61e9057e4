//! Resolutions of threat assignments and delegation between them.

use serde::{Deserialize, Serialize};

use crate::types::{AssignmentId, ComponentId, DelegationId, ResolutionId, ResolutionStatus};

/// How a component dealt with a threat assignment.
/// `(threat_assignment_id, component_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    pub id: ResolutionId,
    pub threat_assignment_id: AssignmentId,
    pub component_id: ComponentId,
    pub status: ResolutionStatus,
    pub description: String,
}

/// `delegated_by` defers its status to `delegated_to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delegation {
    pub id: DelegationId,
    pub delegated_by: ResolutionId,
    pub delegated_to: ResolutionId,
}

/// A resolution with both sides of its delegation graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionWithDelegation {
    pub resolution: Resolution,
    pub delegated_to: Option<Resolution>,
    pub delegated_by: Vec<Resolution>,
}
