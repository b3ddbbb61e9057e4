//! Resolutions and delegation chains.
//!
//! A resolution records how a component handled a threat assignment. It may
//! delegate to one other resolution, whose status it then mirrors. The
//! resolutions that (transitively) delegate to a given one are its upstream;
//! every status change flows to them.

use rusqlite::Connection;
use threatreg_core::errors::{RegistryError, RegistryResult, ValidationError};
use threatreg_core::events::{DelegationCreatedEvent, ResolutionChangedEvent};
use threatreg_core::models::{Delegation, Resolution, ResolutionWithDelegation};
use threatreg_core::types::{
    AssignmentId, ComponentId, DelegationId, FxHashSet, ResolutionId, ResolutionStatus,
};
use threatreg_storage::queries::{assignments, delegations, resolutions};

use crate::components::require_component;
use crate::Registry;

fn require_resolution(conn: &Connection, id: ResolutionId) -> RegistryResult<Resolution> {
    resolutions::get_resolution(conn, id)?.ok_or_else(|| RegistryError::not_found("resolution", id))
}

/// Set `status` on every resolution upstream of `root`. Returns the ids that
/// were touched.
fn push_status_upstream(
    conn: &Connection,
    root: ResolutionId,
    status: ResolutionStatus,
) -> RegistryResult<Vec<ResolutionId>> {
    let mut seen = FxHashSet::default();
    seen.insert(root);
    let mut stack = vec![root];
    let mut touched = Vec::new();
    while let Some(current) = stack.pop() {
        for upstream in resolutions::list_delegators(conn, current)? {
            if !seen.insert(upstream.id) {
                continue;
            }
            resolutions::set_status(conn, upstream.id, status)?;
            touched.push(upstream.id);
            stack.push(upstream.id);
        }
    }
    Ok(touched)
}

/// Follow delegations from `start`; fail if the chain loops.
fn check_chain(conn: &Connection, start: ResolutionId) -> RegistryResult<()> {
    let mut seen = FxHashSet::default();
    let mut current = start;
    loop {
        if !seen.insert(current) {
            return Err(RegistryError::CycleDetected {
                detail: "delegation chain".to_string(),
            });
        }
        match delegations::get_delegation_by_delegator(conn, current)? {
            Some(delegation) => current = delegation.delegated_to,
            None => return Ok(()),
        }
    }
}

impl Registry {
    pub fn create_resolution(
        &self,
        threat_assignment_id: AssignmentId,
        component_id: ComponentId,
        status: ResolutionStatus,
        description: &str,
    ) -> RegistryResult<Resolution> {
        let resolution = self.db.with_transaction(|conn| {
            if assignments::get_assignment(conn, threat_assignment_id)?.is_none() {
                return Err(RegistryError::not_found("threat assignment", threat_assignment_id));
            }
            require_component(conn, component_id)?;
            if resolutions::get_resolution_by_assignment_and_component(
                conn,
                threat_assignment_id,
                component_id,
            )?
            .is_some()
            {
                return Err(RegistryError::AlreadyExists {
                    entity: "resolution",
                    detail: format!(
                        "assignment {threat_assignment_id} on component {component_id}"
                    ),
                });
            }
            let resolution = Resolution {
                id: ResolutionId::new(),
                threat_assignment_id,
                component_id,
                status,
                description: description.to_string(),
            };
            resolutions::insert_resolution(conn, &resolution)?;
            Ok(resolution)
        })?;
        tracing::info!(
            resolution_id = %resolution.id,
            status = %resolution.status,
            "created resolution"
        );
        self.events.emit_resolution_changed(&ResolutionChangedEvent {
            resolution_id: resolution.id,
            status: resolution.status,
        });
        Ok(resolution)
    }

    pub fn get_resolution(&self, id: ResolutionId) -> RegistryResult<Resolution> {
        self.db.with_reader(|conn| require_resolution(conn, id))
    }

    pub fn get_resolution_by_assignment_and_component(
        &self,
        threat_assignment_id: AssignmentId,
        component_id: ComponentId,
    ) -> RegistryResult<Resolution> {
        self.db.with_reader(|conn| {
            resolutions::get_resolution_by_assignment_and_component(
                conn,
                threat_assignment_id,
                component_id,
            )?
            .ok_or_else(|| {
                RegistryError::not_found(
                    "resolution",
                    format!("assignment {threat_assignment_id} on component {component_id}"),
                )
            })
        })
    }

    pub fn list_resolutions_by_component(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<Resolution>> {
        Ok(self
            .db
            .with_reader(|conn| resolutions::list_resolutions_by_component(conn, component_id))?)
    }

    pub fn list_resolutions_by_assignment(
        &self,
        threat_assignment_id: AssignmentId,
    ) -> RegistryResult<Vec<Resolution>> {
        Ok(self.db.with_reader(|conn| {
            resolutions::list_resolutions_by_assignment(conn, threat_assignment_id)
        })?)
    }

    /// The resolution, the one it delegates to, and the ones delegating to it.
    pub fn get_resolution_with_delegation(
        &self,
        id: ResolutionId,
    ) -> RegistryResult<ResolutionWithDelegation> {
        self.db.with_reader(|conn| {
            let resolution = require_resolution(conn, id)?;
            Ok(ResolutionWithDelegation {
                delegated_to: resolutions::get_delegate(conn, id)?,
                delegated_by: resolutions::list_delegators(conn, id)?,
                resolution,
            })
        })
    }

    /// Update status and description. The resolution takes back ownership:
    /// its own delegation is dropped, and its status flows upstream.
    pub fn update_resolution(
        &self,
        id: ResolutionId,
        status: Option<ResolutionStatus>,
        description: Option<&str>,
    ) -> RegistryResult<Resolution> {
        let (resolution, upstream) = self.db.with_transaction(|conn| {
            let mut resolution = require_resolution(conn, id)?;
            if let Some(status) = status {
                resolution.status = status;
            }
            if let Some(description) = description {
                resolution.description = description.to_string();
            }
            resolutions::update_resolution(conn, id, resolution.status, &resolution.description)?;
            delegations::delete_delegation_by_delegator(conn, id)?;
            let upstream = push_status_upstream(conn, id, resolution.status)?;
            Ok::<_, RegistryError>((resolution, upstream))
        })?;

        tracing::info!(
            resolution_id = %id,
            status = %resolution.status,
            upstream = upstream.len(),
            "updated resolution"
        );
        self.emit_status(resolution.status, std::iter::once(id).chain(upstream));
        Ok(resolution)
    }

    /// Delete a resolution. Whatever delegated to it goes back to awaiting.
    pub fn delete_resolution(&self, id: ResolutionId) -> RegistryResult<()> {
        let upstream = self.db.with_transaction(|conn| {
            require_resolution(conn, id)?;
            let upstream = push_status_upstream(conn, id, ResolutionStatus::Awaiting)?;
            delegations::delete_delegations_involving(conn, id)?;
            resolutions::delete_resolution(conn, id)?;
            Ok::<_, RegistryError>(upstream)
        })?;

        tracing::info!(resolution_id = %id, upstream = upstream.len(), "deleted resolution");
        self.emit_status(ResolutionStatus::Awaiting, upstream);
        Ok(())
    }

    /// `source` defers to `target` from now on, replacing any earlier
    /// delegation. A chain that would loop is refused.
    pub fn delegate_resolution(
        &self,
        source: ResolutionId,
        target: ResolutionId,
    ) -> RegistryResult<Delegation> {
        if source == target {
            return Err(ValidationError::SelfDelegation.into());
        }
        let (delegation, status, upstream) = self.db.with_transaction(|conn| {
            require_resolution(conn, source)?;
            let target_resolution = require_resolution(conn, target)?;

            delegations::delete_delegation_by_delegator(conn, source)?;
            let delegation = Delegation {
                id: DelegationId::new(),
                delegated_by: source,
                delegated_to: target,
            };
            delegations::insert_delegation(conn, &delegation)?;
            check_chain(conn, source)?;

            let upstream = push_status_upstream(conn, target, target_resolution.status)?;
            Ok::<_, RegistryError>((delegation, target_resolution.status, upstream))
        })?;

        tracing::info!(
            delegated_by = %source,
            delegated_to = %target,
            status = %status,
            "delegated resolution"
        );
        self.events.emit_delegation_created(&DelegationCreatedEvent {
            delegated_by: source,
            delegated_to: target,
        });
        self.emit_status(status, upstream);
        Ok(delegation)
    }

    /// The resolution `id` delegates to, if any.
    pub fn get_delegated_to(&self, id: ResolutionId) -> RegistryResult<Option<Resolution>> {
        self.db.with_reader(|conn| {
            require_resolution(conn, id)?;
            Ok(resolutions::get_delegate(conn, id)?)
        })
    }

    /// Delegations filtered by delegator, delegate, or both.
    pub fn list_delegations(
        &self,
        delegated_by: Option<ResolutionId>,
        delegated_to: Option<ResolutionId>,
    ) -> RegistryResult<Vec<Delegation>> {
        if delegated_by.is_none() && delegated_to.is_none() {
            return Err(ValidationError::MissingDelegationFilter.into());
        }
        Ok(self.db.with_reader(|conn| {
            delegations::list_delegations(conn, delegated_by, delegated_to)
        })?)
    }

    fn emit_status(&self, status: ResolutionStatus, ids: impl IntoIterator<Item = ResolutionId>) {
        for resolution_id in ids {
            self.events
                .emit_resolution_changed(&ResolutionChangedEvent {
                    resolution_id,
                    status,
                });
        }
    }
}
