//! domains and domain_components queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Component, Domain};
use threatreg_core::types::{ComponentId, DomainId};

use super::components::row_to_component;
use super::{collect_rows, first_row};
use crate::sqlite_err;

fn row_to_domain(row: &Row) -> rusqlite::Result<Domain> {
    Ok(Domain {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
    })
}

pub fn insert_domain(conn: &Connection, domain: &Domain) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO domains (id, name, description) VALUES (?1, ?2, ?3)",
        params![domain.id, domain.name, domain.description],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_domain(conn: &Connection, id: DomainId) -> Result<Option<Domain>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, description FROM domains WHERE id = ?1")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_domain).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_domain(conn: &Connection, domain: &Domain) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE domains SET name = ?2, description = ?3 WHERE id = ?1",
        params![domain.id, domain.name, domain.description],
    )
    .map_err(sqlite_err)
}

pub fn delete_domain(conn: &Connection, id: DomainId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM domains WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_domains(conn: &Connection) -> Result<Vec<Domain>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, description FROM domains ORDER BY name, id")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_domain).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Idempotent. Returns 1 when the membership was new.
pub fn add_component(
    conn: &Connection,
    domain_id: DomainId,
    component_id: ComponentId,
) -> Result<usize, StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO domain_components (domain_id, component_id) VALUES (?1, ?2)",
        params![domain_id, component_id],
    )
    .map_err(sqlite_err)
}

pub fn remove_component(
    conn: &Connection,
    domain_id: DomainId,
    component_id: ComponentId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM domain_components WHERE domain_id = ?1 AND component_id = ?2",
        params![domain_id, component_id],
    )
    .map_err(sqlite_err)
}

pub fn list_components_by_domain(
    conn: &Connection,
    domain_id: DomainId,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN domain_components dc ON dc.component_id = c.id
              WHERE dc.domain_id = ?1
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![domain_id], row_to_component).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_domains_by_component(
    conn: &Connection,
    component_id: ComponentId,
) -> Result<Vec<Domain>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.id, d.name, d.description
               FROM domains d
               JOIN domain_components dc ON dc.domain_id = d.id
              WHERE dc.component_id = ?1
              ORDER BY d.name, d.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![component_id], row_to_domain).map_err(sqlite_err)?;
    collect_rows(rows)
}
