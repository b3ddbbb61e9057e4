//! V003: threat patterns and their conditions.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS threat_patterns (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    threat_id TEXT NOT NULL REFERENCES threats(id) ON DELETE CASCADE,
    is_active INTEGER NOT NULL DEFAULT 1
) STRICT;

CREATE INDEX IF NOT EXISTS idx_threat_patterns_threat ON threat_patterns(threat_id);
CREATE INDEX IF NOT EXISTS idx_threat_patterns_active
    ON threat_patterns(threat_id) WHERE is_active = 1;

CREATE TABLE IF NOT EXISTS pattern_conditions (
    id TEXT PRIMARY KEY,
    pattern_id TEXT NOT NULL REFERENCES threat_patterns(id) ON DELETE CASCADE,
    condition_type TEXT NOT NULL,
    operator TEXT NOT NULL,
    value TEXT NOT NULL DEFAULT '',
    relationship_type TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE INDEX IF NOT EXISTS idx_pattern_conditions_pattern
    ON pattern_conditions(pattern_id);
"#;
