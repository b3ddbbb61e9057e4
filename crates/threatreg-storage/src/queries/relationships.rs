//! component_relationships queries. One table holds every labeled edge,
//! threat inheritance included.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::ComponentRelationship;
use threatreg_core::types::{ComponentId, RelationshipId};

use super::{collect_rows, first_row};
use crate::sqlite_err;

const COLUMNS: &str = "id, from_id, to_id, label";

fn row_to_relationship(row: &Row) -> rusqlite::Result<ComponentRelationship> {
    Ok(ComponentRelationship {
        id: row.get(0)?,
        from_id: row.get(1)?,
        to_id: row.get(2)?,
        label: row.get(3)?,
    })
}

fn query_list(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    let mut stmt = conn.prepare_cached(sql).map_err(sqlite_err)?;
    let rows = stmt.query_map(params, row_to_relationship).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn insert_relationship(
    conn: &Connection,
    rel: &ComponentRelationship,
) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO component_relationships (id, from_id, to_id, label) VALUES (?1, ?2, ?3, ?4)",
        params![rel.id, rel.from_id, rel.to_id, rel.label],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_relationship(
    conn: &Connection,
    id: RelationshipId,
) -> Result<Option<ComponentRelationship>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_relationships WHERE id = ?1"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_relationship).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn get_relationship_by_triple(
    conn: &Connection,
    from_id: ComponentId,
    to_id: ComponentId,
    label: &str,
) -> Result<Option<ComponentRelationship>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_relationships
             WHERE from_id = ?1 AND to_id = ?2 AND label = ?3"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![from_id, to_id, label], row_to_relationship)
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn delete_relationship(conn: &Connection, id: RelationshipId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM component_relationships WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_relationships(conn: &Connection) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!("SELECT {COLUMNS} FROM component_relationships ORDER BY label, from_id, to_id"),
        [],
    )
}

/// Outgoing edges of a component.
pub fn list_relationships_from(
    conn: &Connection,
    from_id: ComponentId,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM component_relationships WHERE from_id = ?1 ORDER BY label, to_id"
        ),
        params![from_id],
    )
}

/// Incoming edges of a component.
pub fn list_relationships_to(
    conn: &Connection,
    to_id: ComponentId,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM component_relationships WHERE to_id = ?1 ORDER BY label, from_id"
        ),
        params![to_id],
    )
}

pub fn list_relationships_by_label(
    conn: &Connection,
    label: &str,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM component_relationships WHERE label = ?1 ORDER BY from_id, to_id"
        ),
        params![label],
    )
}

pub fn list_relationships_from_with_label(
    conn: &Connection,
    from_id: ComponentId,
    label: &str,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM component_relationships
             WHERE from_id = ?1 AND label = ?2 ORDER BY to_id"
        ),
        params![from_id, label],
    )
}

pub fn list_relationships_to_with_label(
    conn: &Connection,
    to_id: ComponentId,
    label: &str,
) -> Result<Vec<ComponentRelationship>, StorageError> {
    query_list(
        conn,
        &format!(
            "SELECT {COLUMNS} FROM component_relationships
             WHERE to_id = ?1 AND label = ?2 ORDER BY from_id"
        ),
        params![to_id, label],
    )
}

/// First edge between two components, any label.
pub fn get_relationship_by_from_and_to(
    conn: &Connection,
    from_id: ComponentId,
    to_id: ComponentId,
) -> Result<Option<ComponentRelationship>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_relationships
             WHERE from_id = ?1 AND to_id = ?2 ORDER BY label LIMIT 1"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![from_id, to_id], row_to_relationship)
        .map_err(sqlite_err)?;
    first_row(rows)
}

/// Delete every edge between two components, optionally restricted to a label.
pub fn delete_relationships_by_from_and_to(
    conn: &Connection,
    from_id: ComponentId,
    to_id: ComponentId,
    label: Option<&str>,
) -> Result<usize, StorageError> {
    match label {
        Some(label) => conn.execute(
            "DELETE FROM component_relationships WHERE from_id = ?1 AND to_id = ?2 AND label = ?3",
            params![from_id, to_id, label],
        ),
        None => conn.execute(
            "DELETE FROM component_relationships WHERE from_id = ?1 AND to_id = ?2",
            params![from_id, to_id],
        ),
    }
    .map_err(sqlite_err)
}
