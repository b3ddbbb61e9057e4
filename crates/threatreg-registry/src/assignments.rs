//! Threat assignments and their severities.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::events::{SeverityChangedEvent, ThreatAssignedEvent, ThreatInheritedEvent};
use threatreg_core::models::ThreatAssignment;
use threatreg_core::types::{AssignmentId, ComponentId, ThreatId, ThreatSeverity};
use threatreg_storage::queries::assignments;

use crate::components::require_component;
use crate::inheritance::propagate_assignment;
use crate::threats::require_threat;
use crate::Registry;

fn require_assignment(
    conn: &rusqlite::Connection,
    id: AssignmentId,
) -> RegistryResult<ThreatAssignment> {
    assignments::get_assignment(conn, id)?
        .ok_or_else(|| RegistryError::not_found("threat assignment", id))
}

impl Registry {
    /// Assign a threat to a component. Returns the existing row when the pair
    /// is already assigned. The assignment then flows down to every component
    /// inheriting from this one.
    pub fn assign_threat_to_component(
        &self,
        component_id: ComponentId,
        threat_id: ThreatId,
    ) -> RegistryResult<ThreatAssignment> {
        let max_depth = self.max_depth();
        let (assignment, created, inherited) = self.db.with_transaction(|conn| {
            require_component(conn, component_id)?;
            require_threat(conn, threat_id)?;
            let (assignment, created) =
                match assignments::get_assignment_by_threat_and_component(
                    conn,
                    threat_id,
                    component_id,
                )? {
                    Some(existing) => (existing, false),
                    None => {
                        let assignment = ThreatAssignment {
                            id: AssignmentId::new(),
                            threat_id,
                            component_id,
                            severity: None,
                            residual_severity: None,
                        };
                        assignments::insert_assignment(conn, &assignment)?;
                        (assignment, true)
                    }
                };
            let inherited = propagate_assignment(conn, &assignment, max_depth)?;
            Ok::<_, RegistryError>((assignment, created, inherited))
        })?;

        if created {
            tracing::info!(
                assignment_id = %assignment.id,
                threat_id = %threat_id,
                component_id = %component_id,
                "assigned threat"
            );
            self.events.emit_threat_assigned(&ThreatAssignedEvent {
                assignment_id: assignment.id,
                threat_id,
                component_id,
            });
        }
        self.emit_inherited(&inherited);
        Ok(assignment)
    }

    pub fn get_threat_assignment(&self, id: AssignmentId) -> RegistryResult<ThreatAssignment> {
        self.db.with_reader(|conn| require_assignment(conn, id))
    }

    /// Delete one assignment. Assignments inherited from it stay in place;
    /// only their links to it are removed.
    pub fn delete_threat_assignment(&self, id: AssignmentId) -> RegistryResult<()> {
        let deleted = self
            .db
            .with_writer(|conn| assignments::delete_assignment(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("threat assignment", id));
        }
        tracing::info!(assignment_id = %id, "deleted threat assignment");
        Ok(())
    }

    /// Set the severity. The residual severity follows unless it was set
    /// explicitly to something else. Descendants are updated afterwards.
    pub fn set_threat_assignment_severity(
        &self,
        id: AssignmentId,
        severity: Option<ThreatSeverity>,
    ) -> RegistryResult<ThreatAssignment> {
        self.update_severities(id, |current| (severity, current.derived_residual(severity)))
    }

    /// Override the residual severity, then update descendants.
    pub fn set_threat_assignment_residual_severity(
        &self,
        id: AssignmentId,
        residual_severity: Option<ThreatSeverity>,
    ) -> RegistryResult<ThreatAssignment> {
        self.update_severities(id, |current| (current.severity, residual_severity))
    }

    fn update_severities<F>(&self, id: AssignmentId, next: F) -> RegistryResult<ThreatAssignment>
    where
        F: FnOnce(&ThreatAssignment) -> (Option<ThreatSeverity>, Option<ThreatSeverity>),
    {
        let max_depth = self.max_depth();
        let (assignment, inherited) = self.db.with_transaction(|conn| {
            let current = require_assignment(conn, id)?;
            let (severity, residual_severity) = next(&current);
            assignments::update_severities(conn, id, severity, residual_severity)?;
            let assignment = ThreatAssignment {
                severity,
                residual_severity,
                ..current
            };
            let inherited = propagate_assignment(conn, &assignment, max_depth)?;
            Ok::<_, RegistryError>((assignment, inherited))
        })?;

        tracing::info!(
            assignment_id = %id,
            severity = ?assignment.severity,
            residual_severity = ?assignment.residual_severity,
            inherited = inherited.len(),
            "updated threat assignment severity"
        );
        self.events.emit_severity_changed(&SeverityChangedEvent {
            assignment_id: id,
            severity: assignment.severity,
            residual_severity: assignment.residual_severity,
        });
        self.emit_inherited(&inherited);
        Ok(assignment)
    }

    fn emit_inherited(&self, events: &[ThreatInheritedEvent]) {
        for event in events {
            self.events.emit_threat_inherited(event);
        }
    }
}
