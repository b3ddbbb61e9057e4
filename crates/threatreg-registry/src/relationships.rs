//! Labeled component relationships.
//!
//! Labels starting with `__` belong to the registry itself. Inheritance edges
//! are created through `create_inherits_threats_relationship`, but show up in
//! every listing here and can be deleted by id like any other edge.

use rusqlite::Connection;
use threatreg_core::constants::{API_CONSUMED_BY_LABEL, CONSUMES_API_OF_LABEL};
use threatreg_core::errors::{RegistryError, RegistryResult};
use threatreg_core::models::ComponentRelationship;
use threatreg_core::types::{ComponentId, RelationshipId};
use threatreg_storage::queries::relationships;

use crate::components::require_component;
use crate::inheritance::unlink_assignments;
use crate::validate;
use crate::Registry;

fn insert_checked(
    conn: &Connection,
    from_id: ComponentId,
    to_id: ComponentId,
    label: &str,
) -> RegistryResult<ComponentRelationship> {
    if relationships::get_relationship_by_triple(conn, from_id, to_id, label)?.is_some() {
        return Err(RegistryError::AlreadyExists {
            entity: "relationship",
            detail: format!("{from_id} -[{label}]-> {to_id}"),
        });
    }
    let relationship = ComponentRelationship {
        id: RelationshipId::new(),
        from_id,
        to_id,
        label: label.to_string(),
    };
    relationships::insert_relationship(conn, &relationship)?;
    Ok(relationship)
}

impl Registry {
    pub fn create_relationship(
        &self,
        from_id: ComponentId,
        to_id: ComponentId,
        label: &str,
    ) -> RegistryResult<ComponentRelationship> {
        validate::distinct_endpoints(from_id, to_id)?;
        let label = validate::user_label(label)?;
        let relationship = self.db.with_transaction(|conn| {
            require_component(conn, from_id)?;
            require_component(conn, to_id)?;
            insert_checked(conn, from_id, to_id, &label)
        })?;
        tracing::info!(
            relationship_id = %relationship.id,
            from_id = %from_id,
            to_id = %to_id,
            label = %relationship.label,
            "created relationship"
        );
        Ok(relationship)
    }

    /// Create `from -[label]-> to` and, when `reverse_label` is given,
    /// `to -[reverse_label]-> from` in the same transaction.
    pub fn add_relationship(
        &self,
        from_id: ComponentId,
        to_id: ComponentId,
        label: &str,
        reverse_label: Option<&str>,
    ) -> RegistryResult<(ComponentRelationship, Option<ComponentRelationship>)> {
        validate::distinct_endpoints(from_id, to_id)?;
        let label = validate::user_label(label)?;
        let reverse_label = reverse_label.map(validate::user_label).transpose()?;
        self.db.with_transaction(|conn| {
            require_component(conn, from_id)?;
            require_component(conn, to_id)?;
            let forward = insert_checked(conn, from_id, to_id, &label)?;
            let reverse = match &reverse_label {
                Some(reverse_label) => Some(insert_checked(conn, to_id, from_id, reverse_label)?),
                None => None,
            };
            Ok((forward, reverse))
        })
    }

    /// `from CONSUMES_API_OF to` together with `to API_CONSUMED_BY from`.
    pub fn add_consumes_api_relationship(
        &self,
        from_id: ComponentId,
        to_id: ComponentId,
    ) -> RegistryResult<(ComponentRelationship, ComponentRelationship)> {
        validate::distinct_endpoints(from_id, to_id)?;
        self.db.with_transaction(|conn| {
            require_component(conn, from_id)?;
            require_component(conn, to_id)?;
            let forward = insert_checked(conn, from_id, to_id, CONSUMES_API_OF_LABEL)?;
            let reverse = insert_checked(conn, to_id, from_id, API_CONSUMED_BY_LABEL)?;
            Ok((forward, reverse))
        })
    }

    pub fn get_relationship(&self, id: RelationshipId) -> RegistryResult<ComponentRelationship> {
        self.db.with_reader(|conn| {
            relationships::get_relationship(conn, id)?
                .ok_or_else(|| RegistryError::not_found("relationship", id))
        })
    }

    /// Delete by id. Deleting an inheritance edge also drops the assignment
    /// links it produced.
    pub fn delete_relationship(&self, id: RelationshipId) -> RegistryResult<()> {
        self.db.with_transaction(|conn| {
            let relationship = relationships::get_relationship(conn, id)?
                .ok_or_else(|| RegistryError::not_found("relationship", id))?;
            relationships::delete_relationship(conn, id)?;
            if relationship.is_inheritance() {
                unlink_assignments(conn, relationship.from_id, relationship.to_id)?;
            }
            Ok(())
        })
    }

    pub fn list_relationships(&self) -> RegistryResult<Vec<ComponentRelationship>> {
        Ok(self.db.with_reader(relationships::list_relationships)?)
    }

    /// Outgoing edges.
    pub fn list_relationships_from(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<ComponentRelationship>> {
        Ok(self
            .db
            .with_reader(|conn| relationships::list_relationships_from(conn, component_id))?)
    }

    /// Incoming edges.
    pub fn list_relationships_to(
        &self,
        component_id: ComponentId,
    ) -> RegistryResult<Vec<ComponentRelationship>> {
        Ok(self
            .db
            .with_reader(|conn| relationships::list_relationships_to(conn, component_id))?)
    }

    pub fn list_relationships_by_label(
        &self,
        label: &str,
    ) -> RegistryResult<Vec<ComponentRelationship>> {
        Ok(self
            .db
            .with_reader(|conn| relationships::list_relationships_by_label(conn, label))?)
    }

    /// Some edge from `from_id` to `to_id`, if there is one.
    pub fn get_relationship_by_from_and_to(
        &self,
        from_id: ComponentId,
        to_id: ComponentId,
    ) -> RegistryResult<Option<ComponentRelationship>> {
        Ok(self.db.with_reader(|conn| {
            relationships::get_relationship_by_from_and_to(conn, from_id, to_id)
        })?)
    }

    /// Delete every edge from `from_id` to `to_id`. Returns how many went;
    /// zero is not an error.
    pub fn delete_relationships_by_from_and_to(
        &self,
        from_id: ComponentId,
        to_id: ComponentId,
    ) -> RegistryResult<usize> {
        self.db.with_transaction(|conn| {
            let had_inheritance = relationships::list_relationships_from(conn, from_id)?
                .iter()
                .any(|r| r.to_id == to_id && r.is_inheritance());
            let removed =
                relationships::delete_relationships_by_from_and_to(conn, from_id, to_id, None)?;
            if had_inheritance {
                unlink_assignments(conn, from_id, to_id)?;
            }
            Ok(removed)
        })
    }
}
