//! Component CRUD and per-component assignment views.

use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::events::{ComponentCreatedEvent, ComponentDeletedEvent};
use threatreg_core::models::{Component, ThreatAssignment, ThreatAssignmentWithResolution};
use threatreg_core::types::{ComponentId, ComponentType};
use threatreg_storage::queries::{assignments, components};

use crate::validate;
use crate::Registry;

/// Load a component or fail with NotFound. Usable inside a transaction.
pub(crate) fn require_component(
    conn: &rusqlite::Connection,
    id: ComponentId,
) -> RegistryResult<Component> {
    components::get_component(conn, id)?.ok_or_else(|| RegistryError::not_found("component", id))
}

impl Registry {
    pub fn create_component(
        &self,
        name: &str,
        description: &str,
        component_type: ComponentType,
    ) -> RegistryResult<Component> {
        let component = Component {
            id: ComponentId::new(),
            name: validate::required("name", name)?,
            description: description.to_string(),
            component_type,
        };
        self.db
            .with_writer(|conn| components::insert_component(conn, &component))?;

        tracing::info!(
            component_id = %component.id,
            component_type = %component.component_type,
            "created component"
        );
        self.events.emit_component_created(&ComponentCreatedEvent {
            component_id: component.id,
            component_type: component.component_type,
        });
        Ok(component)
    }

    pub fn get_component(&self, id: ComponentId) -> RegistryResult<Component> {
        self.db.with_reader(|conn| require_component(conn, id))
    }

    /// Change the given fields; `None` leaves a field as it is.
    pub fn update_component(
        &self,
        id: ComponentId,
        name: Option<&str>,
        description: Option<&str>,
    ) -> RegistryResult<Component> {
        let name = name.map(|n| validate::required("name", n)).transpose()?;
        self.db.with_transaction(|conn| {
            let mut component = require_component(conn, id)?;
            if let Some(name) = name {
                component.name = name;
            }
            if let Some(description) = description {
                component.description = description.to_string();
            }
            components::update_component(conn, &component)?;
            Ok(component)
        })
    }

    /// Delete a component. Its relationships, tags, domain memberships,
    /// attributes and assignments go with it.
    pub fn delete_component(&self, id: ComponentId) -> RegistryResult<()> {
        let deleted = self
            .db
            .with_writer(|conn| components::delete_component(conn, id))?;
        if deleted == 0 {
            return Err(RegistryError::not_found("component", id));
        }
        tracing::info!(component_id = %id, "deleted component");
        self.events
            .emit_component_deleted(&ComponentDeletedEvent { component_id: id });
        Ok(())
    }

    pub fn list_components(&self) -> RegistryResult<Vec<Component>> {
        Ok(self.db.with_reader(components::list_components)?)
    }

    pub fn list_components_by_type(
        &self,
        component_type: ComponentType,
    ) -> RegistryResult<Vec<Component>> {
        Ok(self
            .db
            .with_reader(|conn| components::list_components_by_type(conn, component_type))?)
    }

    /// Case-insensitive substring search on the name.
    pub fn filter_components(&self, name: &str) -> RegistryResult<Vec<Component>> {
        Ok(self
            .db
            .with_reader(|conn| components::filter_components_by_name(conn, name))?)
    }

    pub fn list_threat_assignments_by_component(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<ThreatAssignment>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            Ok(assignments::list_assignments_by_component(conn, component_id)?)
        })
    }

    /// Assignments of `component_id` with the resolution status that
    /// `resolution_component_id` recorded for each.
    pub fn list_threat_assignments_with_resolution(
        &self,
        component_id: ComponentId,
        resolution_component_id: ComponentId,
    ) -> RegistryResult<Vec<ThreatAssignmentWithResolution>> {
        self.db.with_reader(|conn| {
            require_component(conn, component_id)?;
            Ok(assignments::list_assignments_with_resolution(
                conn,
                component_id,
                resolution_component_id,
            )?)
        })
    }
}
