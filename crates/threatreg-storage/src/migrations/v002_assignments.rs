//! V002: threat assignments, inheritance links, control assignments,
//! resolutions and delegations.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS threat_assignments (
    id TEXT PRIMARY KEY,
    threat_id TEXT NOT NULL REFERENCES threats(id) ON DELETE CASCADE,
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    severity TEXT,
    residual_severity TEXT,
    UNIQUE (threat_id, component_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_threat_assignments_component
    ON threat_assignments(component_id);

-- Assignment-to-assignment edges. `__inherits_from` points child -> parent.
CREATE TABLE IF NOT EXISTS assignment_links (
    id TEXT PRIMARY KEY,
    from_id TEXT NOT NULL REFERENCES threat_assignments(id) ON DELETE CASCADE,
    to_id TEXT NOT NULL REFERENCES threat_assignments(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    CHECK (from_id <> to_id),
    UNIQUE (from_id, to_id, label)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_assignment_links_to ON assignment_links(to_id, label);

CREATE TABLE IF NOT EXISTS control_assignments (
    id TEXT PRIMARY KEY,
    threat_assignment_id TEXT NOT NULL
        REFERENCES threat_assignments(id) ON DELETE CASCADE,
    control_id TEXT NOT NULL REFERENCES controls(id) ON DELETE CASCADE,
    UNIQUE (threat_assignment_id, control_id)
) STRICT;

CREATE TABLE IF NOT EXISTS resolutions (
    id TEXT PRIMARY KEY,
    threat_assignment_id TEXT NOT NULL
        REFERENCES threat_assignments(id) ON DELETE CASCADE,
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    status TEXT NOT NULL CHECK (status IN ('resolved', 'awaiting', 'accepted')),
    description TEXT NOT NULL DEFAULT '',
    UNIQUE (threat_assignment_id, component_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_resolutions_component ON resolutions(component_id);

-- A resolution delegates to at most one other resolution.
CREATE TABLE IF NOT EXISTS delegations (
    id TEXT PRIMARY KEY,
    delegated_by TEXT NOT NULL UNIQUE REFERENCES resolutions(id) ON DELETE CASCADE,
    delegated_to TEXT NOT NULL REFERENCES resolutions(id) ON DELETE CASCADE,
    CHECK (delegated_by <> delegated_to)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_delegations_to ON delegations(delegated_to);
"#;
