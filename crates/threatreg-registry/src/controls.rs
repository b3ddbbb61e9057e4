//! Controls, their links to threats, and their assignment to threat
//! assignments.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::{Control, ControlAssignment, ThreatControl};
use threatreg_core::types::{AssignmentId, ControlAssignmentId, ControlId, ThreatControlId, ThreatId};
use threatreg_storage::queries::{assignments, controls};

use crate::threats::require_threat;
use crate::validate;
use crate::Registry;

fn require_control(conn: &rusqlite::Connection, id: ControlId) -> RegistryResult<Control> {
    controls::get_control(conn, id)?.ok_or_else(|| RegistryError::not_found("control", id))
}

impl Registry {
    pub fn create_control(&self, title: &str, description: &str) -> RegistryResult<Control> {
        let control = Control {
            id: ControlId::new(),
            title: validate::required("title", title)?,
            description: description.to_string(),
        };
        self.db
            .with_writer(|conn| controls::insert_control(conn, &control))?;
        tracing::info!(control_id = %control.id, "created control");
        Ok(control)
    }

    pub fn get_control(&self, id: ControlId) -> RegistryResult<Control> {
        self.db.with_reader(|conn| require_control(conn, id))
    }

    pub fn update_control(
        &self,
        id: ControlId,
        title: Option<&str>,
        description: Option<&str>,
    ) -> RegistryResult<Control> {
        let title = title.map(|t| validate::required("title", t)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut control = require_control(conn, id)?;
            if let Some(title) = title {
                control.title = title;
            }
            if let Some(description) = description {
                control.description = description.to_string();
            }
            controls::update_control(conn, &control)?;
            Ok(control)
        })
    }

    pub fn delete_control(&self, id: ControlId) -> RegistryResult<()> {
        let deleted = self.db.with_writer(|conn| controls::delete_control(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("control", id));
        }
        Ok(())
    }

    pub fn list_controls(&self) -> RegistryResult<Vec<Control>> {
        Ok(self.db.with_reader(controls::list_controls)?)
    }

    // ---- threat <-> control ----

    /// Idempotent: an existing link is returned as is.
    pub fn link_control_to_threat(
        &self,
        threat_id: ThreatId,
        control_id: ControlId,
    ) -> RegistryResult<ThreatControl> {
        self.db.with_transaction(|conn| {
            require_threat(conn, threat_id)?;
            require_control(conn, control_id)?;
            if let Some(existing) = controls::get_threat_control(conn, threat_id, control_id)? {
                return Ok(existing);
            }
            let link = ThreatControl {
                id: ThreatControlId::new(),
                threat_id,
                control_id,
            };
            controls::insert_threat_control(conn, &link)?;
            Ok(link)
        })
    }

    /// No-op when the control is not linked.
    pub fn unlink_control_from_threat(
        &self,
        threat_id: ThreatId,
        control_id: ControlId,
    ) -> RegistryResult<()> {
        self.db
            .with_writer(|conn| controls::delete_threat_control(conn, threat_id, control_id))?;
        Ok(())
    }

    pub fn list_controls_by_threat(&self, threat_id: ThreatId) -> RegistryResult<Vec<Control>> {
        self.db.with_reader(|conn| {
            require_threat(conn, threat_id)?;
            Ok(controls::list_controls_by_threat(conn, threat_id)?)
        })
    }

    // ---- threat assignment <-> control ----

    /// Idempotent: an existing assignment is returned as is.
    pub fn assign_control_to_threat_assignment(
        &self,
        threat_assignment_id: AssignmentId,
        control_id: ControlId,
    ) -> RegistryResult<ControlAssignment> {
        self.db.with_transaction(|conn| {
            if assignments::get_assignment(conn, threat_assignment_id)?.is_none() {
                return Err(RegistryError::not_found("threat assignment", threat_assignment_id));
            }
            require_control(conn, control_id)?;
            if let Some(existing) =
                controls::get_control_assignment(conn, threat_assignment_id, control_id)?
            {
                return Ok(existing);
            }
            let assignment = ControlAssignment {
                id: ControlAssignmentId::new(),
                threat_assignment_id,
                control_id,
            };
            controls::insert_control_assignment(conn, &assignment)?;
            Ok(assignment)
        })
    }

    /// No-op when the control is not assigned.
    pub fn unassign_control(
        &self,
        threat_assignment_id: AssignmentId,
        control_id: ControlId,
    ) -> RegistryResult<()> {
        self.db.with_writer(|conn| {
            controls::delete_control_assignment(conn, threat_assignment_id, control_id)
        })?;
        Ok(())
    }

    pub fn list_controls_by_threat_assignment(
        &self,
        threat_assignment_id: AssignmentId,
    ) -> RegistryResult<Vec<Control>> {
        Ok(self
            .db
            .with_reader(|conn| controls::list_controls_by_assignment(conn, threat_assignment_id))?)
    }
}
