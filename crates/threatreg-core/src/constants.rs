//! Shared constants for the threat registry.

/// Registry version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Component relationship label that makes `from` inherit the threats of `to`.
pub const INHERITS_THREATS_LABEL: &str = "__inherits_threats_from";

/// Assignment link label recorded when an assignment was propagated from a parent.
pub const INHERITS_FROM_LABEL: &str = "__inherits_from";

/// Label for "`from` consumes the API of `to`".
pub const CONSUMES_API_OF_LABEL: &str = "CONSUMES_API_OF";

/// Reverse of [`CONSUMES_API_OF_LABEL`].
pub const API_CONSUMED_BY_LABEL: &str = "API_CONSUMED_BY";

/// Labels with this prefix can only be written by the registry itself.
pub const RESERVED_LABEL_PREFIX: &str = "__";

/// Default SQLite database file name.
pub const DEFAULT_DATABASE_PATH: &str = "app.db";

/// Default number of read connections.
pub const DEFAULT_READ_POOL_SIZE: usize = 4;

/// Upper bound for the read pool.
pub const MAX_READ_POOL_SIZE: usize = 8;

/// Default SQLite busy timeout in milliseconds.
pub const DEFAULT_BUSY_TIMEOUT_MS: u32 = 5000;

/// Default depth cap for tree paths and inheritance propagation.
pub const DEFAULT_MAX_TREE_DEPTH: usize = 100;

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "threatreg.toml";

/// Environment variable holding the log filter.
pub const LOG_ENV_VAR: &str = "THREATREG_LOG";
