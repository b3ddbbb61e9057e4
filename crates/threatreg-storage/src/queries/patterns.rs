//! threat_patterns and pattern_conditions queries.
//!
//! Pattern rows come back with `conditions` filled in: one query for the
//! patterns, one for all of their conditions.

use rusqlite::{params, Connection, Row};
use threatreg_core::errors::StorageError;
use threatreg_core::models::{PatternCondition, ThreatPattern};
use threatreg_core::types::{ConditionId, FxHashMap, PatternId, ThreatId};

use super::{collect_rows, first_row};
use crate::sqlite_err;

const PATTERN_COLUMNS: &str = "id, name, description, threat_id, is_active";
const CONDITION_COLUMNS: &str = "id, pattern_id, condition_type, operator, value, relationship_type";

fn row_to_pattern(row: &Row) -> rusqlite::Result<ThreatPattern> {
    Ok(ThreatPattern {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        threat_id: row.get(3)?,
        is_active: row.get(4)?,
        conditions: Vec::new(),
    })
}

fn row_to_condition(row: &Row) -> rusqlite::Result<PatternCondition> {
    Ok(PatternCondition {
        id: row.get(0)?,
        pattern_id: row.get(1)?,
        condition_type: row.get(2)?,
        operator: row.get(3)?,
        value: row.get(4)?,
        relationship_type: row.get(5)?,
    })
}

fn query_patterns(
    conn: &Connection,
    sql: &str,
    params: impl rusqlite::Params,
) -> Result<Vec<ThreatPattern>, StorageError> {
    let mut patterns = {
        let mut stmt = conn.prepare_cached(sql).map_err(sqlite_err)?;
        let rows = stmt.query_map(params, row_to_pattern).map_err(sqlite_err)?;
        collect_rows(rows)?
    };
    if patterns.is_empty() {
        return Ok(patterns);
    }

    let mut by_pattern: FxHashMap<PatternId, Vec<PatternCondition>> = FxHashMap::default();
    for condition in list_all_conditions(conn)? {
        by_pattern.entry(condition.pattern_id).or_default().push(condition);
    }
    for pattern in &mut patterns {
        pattern.conditions = by_pattern.remove(&pattern.id).unwrap_or_default();
    }
    Ok(patterns)
}

// ---- patterns ----

/// Insert the pattern row only. Conditions are written separately.
pub fn insert_pattern(conn: &Connection, p: &ThreatPattern) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO threat_patterns (id, name, description, threat_id, is_active)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![p.id, p.name, p.description, p.threat_id, p.is_active],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_pattern(conn: &Connection, id: PatternId) -> Result<Option<ThreatPattern>, StorageError> {
    let pattern = {
        let mut stmt = conn
            .prepare_cached(&format!(
                "SELECT {PATTERN_COLUMNS} FROM threat_patterns WHERE id = ?1"
            ))
            .map_err(sqlite_err)?;
        let rows = stmt.query_map(params![id], row_to_pattern).map_err(sqlite_err)?;
        first_row(rows)?
    };
    match pattern {
        Some(mut pattern) => {
            pattern.conditions = list_conditions_by_pattern(conn, id)?;
            Ok(Some(pattern))
        }
        None => Ok(None),
    }
}

pub fn update_pattern(conn: &Connection, p: &ThreatPattern) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE threat_patterns SET name = ?2, description = ?3, threat_id = ?4, is_active = ?5
         WHERE id = ?1",
        params![p.id, p.name, p.description, p.threat_id, p.is_active],
    )
    .map_err(sqlite_err)
}

pub fn set_pattern_active(
    conn: &Connection,
    id: PatternId,
    is_active: bool,
) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE threat_patterns SET is_active = ?2 WHERE id = ?1",
        params![id, is_active],
    )
    .map_err(sqlite_err)
}

pub fn delete_pattern(conn: &Connection, id: PatternId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM threat_patterns WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn list_patterns(conn: &Connection) -> Result<Vec<ThreatPattern>, StorageError> {
    query_patterns(
        conn,
        &format!("SELECT {PATTERN_COLUMNS} FROM threat_patterns ORDER BY name, id"),
        [],
    )
}

pub fn list_active_patterns(conn: &Connection) -> Result<Vec<ThreatPattern>, StorageError> {
    query_patterns(
        conn,
        &format!(
            "SELECT {PATTERN_COLUMNS} FROM threat_patterns WHERE is_active = 1 ORDER BY name, id"
        ),
        [],
    )
}

pub fn list_patterns_by_threat(
    conn: &Connection,
    threat_id: ThreatId,
) -> Result<Vec<ThreatPattern>, StorageError> {
    query_patterns(
        conn,
        &format!(
            "SELECT {PATTERN_COLUMNS} FROM threat_patterns WHERE threat_id = ?1 ORDER BY name, id"
        ),
        params![threat_id],
    )
}

// ---- conditions ----

pub fn insert_condition(conn: &Connection, c: &PatternCondition) -> Result<(), StorageError> {
    conn.execute(
        "INSERT INTO pattern_conditions
            (id, pattern_id, condition_type, operator, value, relationship_type)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            c.id,
            c.pattern_id,
            c.condition_type,
            c.operator,
            c.value,
            c.relationship_type,
        ],
    )
    .map_err(sqlite_err)?;
    Ok(())
}

pub fn get_condition(
    conn: &Connection,
    id: ConditionId,
) -> Result<Option<PatternCondition>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CONDITION_COLUMNS} FROM pattern_conditions WHERE id = ?1"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map(params![id], row_to_condition).map_err(sqlite_err)?;
    first_row(rows)
}

pub fn update_condition(conn: &Connection, c: &PatternCondition) -> Result<usize, StorageError> {
    conn.execute(
        "UPDATE pattern_conditions
            SET condition_type = ?2, operator = ?3, value = ?4, relationship_type = ?5
          WHERE id = ?1",
        params![c.id, c.condition_type, c.operator, c.value, c.relationship_type],
    )
    .map_err(sqlite_err)
}

pub fn delete_condition(conn: &Connection, id: ConditionId) -> Result<usize, StorageError> {
    conn.execute("DELETE FROM pattern_conditions WHERE id = ?1", params![id])
        .map_err(sqlite_err)
}

pub fn delete_conditions_by_pattern(
    conn: &Connection,
    pattern_id: PatternId,
) -> Result<usize, StorageError> {
    conn.execute(
        "DELETE FROM pattern_conditions WHERE pattern_id = ?1",
        params![pattern_id],
    )
    .map_err(sqlite_err)
}

pub fn list_conditions_by_pattern(
    conn: &Connection,
    pattern_id: PatternId,
) -> Result<Vec<PatternCondition>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CONDITION_COLUMNS} FROM pattern_conditions WHERE pattern_id = ?1 ORDER BY rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt
        .query_map(params![pattern_id], row_to_condition)
        .map_err(sqlite_err)?;
    collect_rows(rows)
}

pub fn list_all_conditions(conn: &Connection) -> Result<Vec<PatternCondition>, StorageError> {
    let mut stmt = conn
        .prepare_cached(&format!(
            "SELECT {CONDITION_COLUMNS} FROM pattern_conditions ORDER BY rowid"
        ))
        .map_err(sqlite_err)?;
    let rows = stmt.query_map([], row_to_condition).map_err(sqlite_err)?;
    collect_rows(rows)
}
