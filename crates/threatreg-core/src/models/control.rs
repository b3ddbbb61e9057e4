//! Controls and their links to threats and threat assignments.

use serde::{Deserialize, Serialize};

use crate::types::{
    AssignmentId, ControlAssignmentId, ControlId, ThreatControlId, ThreatId,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Control {
    pub id: ControlId,
    pub title: String,
    pub description: String,
}

/// Catalogue-level link: this control mitigates this threat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatControl {
    pub id: ThreatControlId,
    pub threat_id: ThreatId,
    pub control_id: ControlId,
}

/// Applied control on a concrete threat assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlAssignment {
    pub id: ControlAssignmentId,
    pub threat_assignment_id: AssignmentId,
    pub control_id: ControlId,
}
