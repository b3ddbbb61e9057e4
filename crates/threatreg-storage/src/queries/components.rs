//! components table queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Component, ComponentWithThreatStats};
use threatreg_core::types::{ComponentId, ComponentType, DomainId};

use super::{collect_rows, count_to_u64, first_row};
use crate::sqlite_err;

const COLUMNS: &str = "id, name, description, component_type";

pub(crate) fn row_to_component(row: &Row) -> rusqlite::Result<Component> {
    Ok(Component {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        component_type: row.get(3)?,
    })
}

pub fn insert_component(conn: &Connection, component: &Component) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO components (id, name, description, component_type) VALUES (?1, ?2, ?3, ?4)",
        params![
            component.id,
            component.name,
            component.description,
            component.component_type,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_component(conn: &Connection, id: ComponentId) -> Result<Option<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM components WHERE id = ?1"))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_component).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn component_exists(conn: &Connection, id: ComponentId) -> Result<bool, StorageError> {
    conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM components WHERE id = ?1)",
        params![id],
        |row| row.get(0),
    )
    .map_err(sqlite_err)
}

/// Overwrite name and description. Returns the number of rows touched.
pub fn update_component(conn: &Connection, component: &Component) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE components SET name = ?2, description = ?3, component_type = ?4 WHERE id = ?1",
        params![
            component.id,
            component.name,
            component.description,
            component.component_type,
        ],
    )
    .map_err(sqlite_err)
}

pub fn delete_component(conn: &Connection, id: ComponentId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM components WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_components(conn: &Connection) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!("SELECT {COLUMNS} FROM components ORDER BY name, id"))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_component).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_components_by_type(
    conn: &Connection,
    component_type: ComponentType,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM components WHERE component_type = ?1 ORDER BY name, id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![component_type], row_to_component)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Case-insensitive substring match on the component name.
pub fn filter_components_by_name(
    conn: &Connection,
    needle: &str,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM components
             WHERE instr(lower(name), lower(?1)) > 0
             ORDER BY name, id"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![needle], row_to_component).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Components of a domain with the number of their unresolved threat
/// assignments. Unresolved: no resolution by the component itself, or a
/// status other than resolved/accepted.
pub fn list_components_with_threat_stats(
    conn: &Connection,
    domain_id: DomainId,
) -> Result<Vec<ComponentWithThreatStats>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type,
                    (SELECT COUNT(*)
                       FROM threat_assignments ta
                       LEFT JOIN resolutions r
                         ON r.threat_assignment_id = ta.id AND r.component_id = c.id
                      WHERE ta.component_id = c.id
                        AND (r.id IS NULL OR r.status NOT IN ('resolved', 'accepted'))
                    ) AS unresolved
               FROM components c
               JOIN domain_components dc ON dc.component_id = c.id
              WHERE dc.domain_id = ?1
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![domain_id], |row| {
            Ok(ComponentWithThreatStats {
                component: row_to_component(row)?,
                unresolved_threat_count: count_to_u64(row.get(4)?),
            })
        })
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Targets of the component's outgoing edges with the given label.
pub fn list_components_linked_from(
    conn: &Connection,
    from_id: ComponentId,
    label: &str,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN component_relationships r ON r.to_id = c.id
              WHERE r.from_id = ?1 AND r.label = ?2
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![from_id, label], row_to_component)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Sources of the edges into the component with the given label.
pub fn list_components_linked_to(
    conn: &Connection,
    to_id: ComponentId,
    label: &str,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN component_relationships r ON r.from_id = c.id
              WHERE r.to_id = ?1 AND r.label = ?2
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![to_id, label], row_to_component)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
