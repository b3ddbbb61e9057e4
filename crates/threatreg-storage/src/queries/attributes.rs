//! component_attributes queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Component, ComponentAttribute};
use threatreg_core::types::{AttributeId, AttributeType, ComponentId};

use super::components::row_to_component;
use super::{collect_rows, first_row};
use crate::sqlite_err;

const COLUMNS: &str = "id, component_id, name, attribute_type, value";

fn row_to_attribute(row: &Row) -> rusqlite::Result<ComponentAttribute> {
    Ok(ComponentAttribute {
        id: row.get(0)?,
        component_id: row.get(1)?,
        name: row.get(2)?,
        attribute_type: row.get(3)?,
        value: row.get(4)?,
    })
}

pub fn insert_attribute(conn: &Connection, attr: &ComponentAttribute) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO component_attributes (id, component_id, name, attribute_type, value)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![attr.id, attr.component_id, attr.name, attr.attribute_type, attr.value],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_attribute(
    conn: &Connection,
    id: AttributeId,
) -> Result<Option<ComponentAttribute>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_attributes WHERE id = ?1"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_attribute).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn get_attribute_by_name(
    conn: &Connection,
    component_id: ComponentId,
    name: &str,
) -> Result<Option<ComponentAttribute>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_attributes WHERE component_id = ?1 AND name = ?2"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![component_id, name], row_to_attribute)
        .map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_attribute(conn: &Connection, attr: &ComponentAttribute) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE component_attributes SET name = ?2, attribute_type = ?3, value = ?4 WHERE id = ?1",
        params![attr.id, attr.name, attr.attribute_type, attr.value],
    )
    .map_err(sqlite_err)
}

pub fn delete_attribute(conn: &Connection, id: AttributeId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM component_attributes WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn delete_attribute_by_name(
    conn: &Connection,
    component_id: ComponentId,
    name: &str,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM component_attributes WHERE component_id = ?1 AND name = ?2",
        params![component_id, name],
    )
    .map_err(sqlite_err)
}

pub fn list_attributes_by_component(
    conn: &Connection,
    component_id: ComponentId,
) -> Result<Vec<ComponentAttribute>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {COLUMNS} FROM component_attributes WHERE component_id = ?1 ORDER BY name"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![component_id], row_to_attribute)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn find_components_by_attribute(
    conn: &Connection,
    name: &str,
    value: &str,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN component_attributes a ON a.component_id = c.id
              WHERE a.name = ?1 AND a.value = ?2
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![name, value], row_to_component)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn find_components_by_attribute_and_type(
    conn: &Connection,
    name: &str,
    attribute_type: AttributeType,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN component_attributes a ON a.component_id = c.id
              WHERE a.name = ?1 AND a.attribute_type = ?2
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![name, attribute_type], row_to_component)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
