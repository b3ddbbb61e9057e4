//! tags and component_tags queries.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{Component, Tag};
use threatreg_core::types::{ComponentId, TagId};

use super::components::row_to_component;
use super::{collect_rows, first_row};
use crate::sqlite_err;

fn row_to_tag(row: &Row) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        color: row.get(3)?,
    })
}

pub fn insert_tag(conn: &Connection, tag: &Tag) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO tags (id, name, description, color) VALUES (?1, ?2, ?3, ?4)",
        params![tag.id, tag.name, tag.description, tag.color],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_tag(conn: &Connection, id: TagId) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, description, color FROM tags WHERE id = ?1")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_tag).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn get_tag_by_name(conn: &Connection, name: &str) -> Result<Option<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, description, color FROM tags WHERE name = ?1")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![name], row_to_tag).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_tag(conn: &Connection, tag: &Tag) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE tags SET name = ?2, description = ?3, color = ?4 WHERE id = ?1",
        params![tag.id, tag.name, tag.description, tag.color],
    )
    .map_err(sqlite_err)
}

pub fn delete_tag(conn: &Connection, id: TagId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM tags WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_tags(conn: &Connection) -> Result<Vec<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached("SELECT id, name, description, color FROM tags ORDER BY name")
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_tag).map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_tags_by_component(
    conn: &Connection,
    component_id: ComponentId,
) -> Result<Vec<Tag>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT t.id, t.name, t.description, t.color
               FROM tags t
               JOIN component_tags ct ON ct.tag_id = t.id
              WHERE ct.component_id = ?1
              ORDER BY t.name",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![component_id], row_to_tag).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Idempotent. Returns 1 when the tag was newly attached.
pub fn assign_tag(
    conn: &Connection,
    component_id: ComponentId,
    tag_id: TagId,
) -> Result<usize, StorageError> {
    conn.execute(
        "INSERT OR IGNORE INTO component_tags (component_id, tag_id) VALUES (?1, ?2)",
        params![component_id, tag_id],
    )
    .map_err(sqlite_err)
}

pub fn unassign_tag(
    conn: &Connection,
    component_id: ComponentId,
    tag_id: TagId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM component_tags WHERE component_id = ?1 AND tag_id = ?2",
        params![component_id, tag_id],
    )
    .map_err(sqlite_err)
}

pub fn list_components_by_tag(
    conn: &Connection,
    tag_id: TagId,
) -> Result<Vec<Component>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT c.id, c.name, c.description, c.component_type
               FROM components c
               JOIN component_tags ct ON ct.component_id = c.id
              WHERE ct.tag_id = ?1
              ORDER BY c.name, c.id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![tag_id], row_to_component).map_err(sqlite_err)?;
    collect_rows(rows)
}

/// Every (component, tag name) pair. Feeds the pattern evaluation snapshot.
pub fn list_component_tag_names(
    conn: &Connection,
) -> Result<Vec<(ComponentId, String)>, StorageError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT ct.component_id, t.name
               FROM component_tags ct
               JOIN tags t ON t.id = ct.tag_id",
        )
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(sqlite_err)?;
    collect_rows(rows)
}
