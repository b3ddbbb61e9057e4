//! Threat inheritance.
//!
//! A child component inherits from a parent through a component relationship
//! labeled `__inherits_threats_from` (child -> parent). Each inherited
//! assignment carries an `__inherits_from` assignment link (child assignment
//! -> parent assignment).
//!
//! Propagation walks down from a parent assignment: every child gets an
//! assignment for the same threat whose severity is the parent's residual
//! severity. The child's residual follows along unless it was explicitly
//! overridden. The walk keeps a visited set, so diamonds are linked once and
//! cycles terminate, and stops at `inheritance.max_depth`.

use std::collections::VecDeque;

use rusqlite::Connection;
use threatreg_core::constants::{INHERITS_FROM_LABEL, INHERITS_THREATS_LABEL};
use threatreg_core::errors::{RegistryError, RegistryResult, ValidationError};
use threatreg_core::events::ThreatInheritedEvent;
use threatreg_core::models::{AssignmentLink, Component, ComponentRelationship, ThreatAssignment};
use threatreg_core::types::{AssignmentId, AssignmentLinkId, ComponentId, FxHashSet, RelationshipId};
use threatreg_storage::queries::{assignment_links, assignments, components, relationships};

use crate::components::require_component;
use crate::Registry;

/// One downward walk from a single parent assignment.
struct Propagation<'c> {
    conn: &'c Connection,
    max_depth: usize,
    visited: FxHashSet<ComponentId>,
    on_path: FxHashSet<ComponentId>,
    events: Vec<ThreatInheritedEvent>,
}

impl<'c> Propagation<'c> {
    fn new(conn: &'c Connection, max_depth: usize, root: ComponentId) -> Self {
        let mut visited = FxHashSet::default();
        visited.insert(root);
        let mut on_path = FxHashSet::default();
        on_path.insert(root);
        Self {
            conn,
            max_depth,
            visited,
            on_path,
            events: Vec::new(),
        }
    }

    fn walk_children(&mut self, parent: &ThreatAssignment, depth: usize) -> RegistryResult<()> {
        let edges = relationships::list_relationships_to_with_label(
            self.conn,
            parent.component_id,
            INHERITS_THREATS_LABEL,
        )?;
        for edge in edges {
            self.visit_child(parent, edge.from_id, depth + 1)?;
        }
        Ok(())
    }

    fn visit_child(
        &mut self,
        parent: &ThreatAssignment,
        child_id: ComponentId,
        depth: usize,
    ) -> RegistryResult<()> {
        if self.on_path.contains(&child_id) {
            tracing::warn!(
                component_id = %child_id,
                threat_id = %parent.threat_id,
                "inheritance cycle, not descending"
            );
            return Ok(());
        }
        if depth > self.max_depth {
            tracing::warn!(
                component_id = %child_id,
                max_depth = self.max_depth,
                "inheritance depth cap reached"
            );
            return Ok(());
        }
        if !self.visited.insert(child_id) {
            // Reached again through another parent: the values are already set.
            if let Some(child) = assignments::get_assignment_by_threat_and_component(
                self.conn,
                parent.threat_id,
                child_id,
            )? {
                ensure_link(self.conn, child.id, parent.id)?;
            }
            return Ok(());
        }

        let (child, created) = apply_to_child(self.conn, parent, child_id)?;
        ensure_link(self.conn, child.id, parent.id)?;
        tracing::debug!(
            parent_assignment_id = %parent.id,
            child_assignment_id = %child.id,
            component_id = %child_id,
            created,
            "propagated threat assignment"
        );
        self.events.push(ThreatInheritedEvent {
            parent_assignment_id: parent.id,
            child_assignment_id: child.id,
            child_component_id: child_id,
            severity: child.severity,
            created,
        });

        self.on_path.insert(child_id);
        let result = self.walk_children(&child, depth);
        self.on_path.remove(&child_id);
        result
    }
}

/// Find or create the child's assignment for the parent's threat and bring
/// its severities in line with the parent.
fn apply_to_child(
    conn: &Connection,
    parent: &ThreatAssignment,
    child_id: ComponentId,
) -> RegistryResult<(ThreatAssignment, bool)> {
    let severity = parent.residual_severity;
    match assignments::get_assignment_by_threat_and_component(conn, parent.threat_id, child_id)? {
        Some(existing) => {
            let residual_severity = existing.derived_residual(severity);
            if existing.severity != severity || existing.residual_severity != residual_severity {
                assignments::update_severities(conn, existing.id, severity, residual_severity)?;
            }
            Ok((
                ThreatAssignment {
                    severity,
                    residual_severity,
                    ..existing
                },
                false,
            ))
        }
        None => {
            let child = ThreatAssignment {
                id: AssignmentId::new(),
                threat_id: parent.threat_id,
                component_id: child_id,
                severity,
                residual_severity: severity,
            };
            assignments::insert_assignment(conn, &child)?;
            Ok((child, true))
        }
    }
}

fn ensure_link(conn: &Connection, child: AssignmentId, parent: AssignmentId) -> RegistryResult<()> {
    if child == parent {
        return Ok(());
    }
    if assignment_links::get_link(conn, child, parent, INHERITS_FROM_LABEL)?.is_none() {
        assignment_links::insert_link(
            conn,
            &AssignmentLink {
                id: AssignmentLinkId::new(),
                from_id: child,
                to_id: parent,
                label: INHERITS_FROM_LABEL.to_string(),
            },
        )?;
    }
    Ok(())
}

/// Push `parent` down to every component that inherits from its component.
pub(crate) fn propagate_assignment(
    conn: &Connection,
    parent: &ThreatAssignment,
    max_depth: usize,
) -> RegistryResult<Vec<ThreatInheritedEvent>> {
    let mut walk = Propagation::new(conn, max_depth, parent.component_id);
    walk.walk_children(parent, 0)?;
    Ok(walk.events)
}

/// Push `parent` into the subtree under one newly linked child.
fn propagate_into_child(
    conn: &Connection,
    parent: &ThreatAssignment,
    child_id: ComponentId,
    max_depth: usize,
) -> RegistryResult<Vec<ThreatInheritedEvent>> {
    let mut walk = Propagation::new(conn, max_depth, parent.component_id);
    walk.visit_child(parent, child_id, 1)?;
    Ok(walk.events)
}

/// True if `from` already inherits, directly or transitively, from `target`.
/// Unbounded by `max_depth`: every ancestor is checked.
fn inherits_transitively(
    conn: &Connection,
    from: ComponentId,
    target: ComponentId,
) -> RegistryResult<bool> {
    let mut seen = FxHashSet::default();
    let mut queue = VecDeque::from([from]);
    while let Some(current) = queue.pop_front() {
        if current == target {
            return Ok(true);
        }
        if !seen.insert(current) {
            continue;
        }
        for edge in
            relationships::list_relationships_from_with_label(conn, current, INHERITS_THREATS_LABEL)?
        {
            queue.push_back(edge.to_id);
        }
    }
    Ok(false)
}

/// Drop the `__inherits_from` links between the two components' assignments.
pub(crate) fn unlink_assignments(
    conn: &Connection,
    child_id: ComponentId,
    parent_id: ComponentId,
) -> RegistryResult<usize> {
    let mut removed = 0;
    for parent in assignments::list_assignments_by_component(conn, parent_id)? {
        if let Some(child) =
            assignments::get_assignment_by_threat_and_component(conn, parent.threat_id, child_id)?
        {
            removed += assignment_links::delete_link(conn, child.id, parent.id, INHERITS_FROM_LABEL)?;
        }
    }
    Ok(removed)
}

impl Registry {
    /// `child` inherits the threats of `parent`. Existing parent assignments
    /// flow into the child subtree right away.
    pub fn create_inherits_threats_relationship(
        &self,
        child_id: ComponentId,
        parent_id: ComponentId,
    ) -> RegistryResult<ComponentRelationship> {
        if child_id == parent_id {
            return Err(ValidationError::SelfRelationship.into());
        }
        let max_depth = self.max_depth();
        let (relationship, events) = self.db.with_transaction(|conn| {
            require_component(conn, child_id)?;
            require_component(conn, parent_id)?;
            if relationships::get_relationship_by_triple(
                conn,
                child_id,
                parent_id,
                INHERITS_THREATS_LABEL,
            )?
            .is_some()
            {
                return Err(RegistryError::AlreadyExists {
                    entity: "inherits threats relationship",
                    detail: format!("{child_id} -> {parent_id}"),
                });
            }
            if inherits_transitively(conn, parent_id, child_id)? {
                return Err(RegistryError::CycleDetected {
                    detail: "threat inheritance".to_string(),
                });
            }

            let relationship = ComponentRelationship {
                id: RelationshipId::new(),
                from_id: child_id,
                to_id: parent_id,
                label: INHERITS_THREATS_LABEL.to_string(),
            };
            relationships::insert_relationship(conn, &relationship)?;

            let mut events = Vec::new();
            for parent in assignments::list_assignments_by_component(conn, parent_id)? {
                events.extend(propagate_into_child(conn, &parent, child_id, max_depth)?);
            }
            Ok((relationship, events))
        })?;

        tracing::info!(
            child_id = %child_id,
            parent_id = %parent_id,
            inherited = events.len(),
            "created inherits threats relationship"
        );
        for event in &events {
            self.events.emit_threat_inherited(event);
        }
        Ok(relationship)
    }

    /// No-op when the relationship does not exist. The child keeps its
    /// assignments; only the links to the parent's assignments go.
    pub fn remove_inherits_threats_relationship(
        &self,
        child_id: ComponentId,
        parent_id: ComponentId,
    ) -> RegistryResult<()> {
        self.db.with_transaction(|conn| {
            let removed = relationships::delete_relationships_by_from_and_to(
                conn,
                child_id,
                parent_id,
                Some(INHERITS_THREATS_LABEL),
            )?;
            if removed > 0 {
                let links = unlink_assignments(conn, child_id, parent_id)?;
                tracing::info!(
                    child_id = %child_id,
                    parent_id = %parent_id,
                    links,
                    "removed inherits threats relationship"
                );
            }
            Ok(())
        })
    }

    /// Components `child_id` inherits threats from.
    pub fn list_component_parents(&self, child_id: ComponentId) -> RegistryResult<Vec<Component>> {
        self.db.with_reader(|conn| {
            require_component(conn, child_id)?;
            Ok(components::list_components_linked_from(
                conn,
                child_id,
                INHERITS_THREATS_LABEL,
            )?)
        })
    }

    /// Components that inherit threats from `parent_id`.
    pub fn list_component_children(&self, parent_id: ComponentId) -> RegistryResult<Vec<Component>> {
        self.db.with_reader(|conn| {
            require_component(conn, parent_id)?;
            Ok(components::list_components_linked_to(
                conn,
                parent_id,
                INHERITS_THREATS_LABEL,
            )?)
        })
    }
}
