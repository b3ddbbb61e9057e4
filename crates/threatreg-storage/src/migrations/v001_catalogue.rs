//! V001: catalogue tables.
//! components, threats, controls, domains, tags and the links between them.

pub const MIGRATION_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS components (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT '',
    component_type TEXT NOT NULL CHECK (component_type IN ('product', 'instance'))
) STRICT;

CREATE INDEX IF NOT EXISTS idx_components_type ON components(component_type);
CREATE INDEX IF NOT EXISTS idx_components_name ON components(name);

CREATE TABLE IF NOT EXISTS threats (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE TABLE IF NOT EXISTS controls (
    id TEXT PRIMARY KEY,
    title TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE TABLE IF NOT EXISTS threat_controls (
    id TEXT PRIMARY KEY,
    threat_id TEXT NOT NULL REFERENCES threats(id) ON DELETE CASCADE,
    control_id TEXT NOT NULL REFERENCES controls(id) ON DELETE CASCADE,
    UNIQUE (threat_id, control_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_threat_controls_control ON threat_controls(control_id);

CREATE TABLE IF NOT EXISTS domains (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    description TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE TABLE IF NOT EXISTS domain_components (
    domain_id TEXT NOT NULL REFERENCES domains(id) ON DELETE CASCADE,
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    PRIMARY KEY (domain_id, component_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_domain_components_component
    ON domain_components(component_id);

CREATE TABLE IF NOT EXISTS tags (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL UNIQUE,
    description TEXT NOT NULL DEFAULT '',
    color TEXT NOT NULL DEFAULT ''
) STRICT;

CREATE TABLE IF NOT EXISTS component_tags (
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
    PRIMARY KEY (component_id, tag_id)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_component_tags_tag ON component_tags(tag_id);

-- One table for every labeled edge, including threat inheritance.
CREATE TABLE IF NOT EXISTS component_relationships (
    id TEXT PRIMARY KEY,
    from_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    to_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    label TEXT NOT NULL,
    CHECK (from_id <> to_id),
    UNIQUE (from_id, to_id, label)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_component_relationships_to
    ON component_relationships(to_id, label);
CREATE INDEX IF NOT EXISTS idx_component_relationships_label
    ON component_relationships(label);

CREATE TABLE IF NOT EXISTS component_attributes (
    id TEXT PRIMARY KEY,
    component_id TEXT NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    name TEXT NOT NULL,
    attribute_type TEXT NOT NULL
        CHECK (attribute_type IN ('string', 'text', 'number', 'component')),
    value TEXT NOT NULL,
    UNIQUE (component_id, name)
) STRICT;

CREATE INDEX IF NOT EXISTS idx_component_attributes_name_value
    ON component_attributes(name, value);
"#;
