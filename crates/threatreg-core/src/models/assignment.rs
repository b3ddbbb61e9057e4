//! Threat assignments and the links between them.

use serde::{Deserialize, Serialize};

use crate::types::{
    AssignmentId, AssignmentLinkId, ComponentId, ResolutionStatus, ThreatId, ThreatSeverity,
};

/// A threat applied to a component. `(threat_id, component_id)` is unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatAssignment {
    pub id: AssignmentId,
    pub threat_id: ThreatId,
    pub component_id: ComponentId,
    pub severity: Option<ThreatSeverity>,
    /// Severity after controls. Descendants inherit this as their severity.
    pub residual_severity: Option<ThreatSeverity>,
}

impl ThreatAssignment {
    /// Residual that tracks `severity` until someone sets it explicitly.
    ///
    /// The residual follows the new severity when it was unset or still equal
    /// to the previous severity; an explicit override is kept.
    pub fn derived_residual(
        &self,
        new_severity: Option<ThreatSeverity>,
    ) -> Option<ThreatSeverity> {
        if self.residual_severity.is_none() || self.residual_severity == self.severity {
            new_severity
        } else {
            self.residual_severity
        }
    }
}

/// An assignment row joined with the resolution of a given component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreatAssignmentWithResolution {
    pub assignment: ThreatAssignment,
    pub resolution_status: Option<ResolutionStatus>,
    pub is_delegated: bool,
}

/// Directed, labeled link between two assignments (`from` is the child).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssignmentLink {
    pub id: AssignmentLinkId,
    pub from_id: AssignmentId,
    pub to_id: AssignmentId,
    pub label: String,
}
