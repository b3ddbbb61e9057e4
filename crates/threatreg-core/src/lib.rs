//! threatreg-core: shared foundation for the threat registry.
//!
//! - `types`: typed ids, severity and the enumerations stored in SQLite
//! - `models`: plain domain records (components, threats, assignments, ...)
//! - `errors`: one `thiserror` enum per subsystem plus error codes
//! - `config`: layered TOML configuration
//! - `events`: handler trait with no-op defaults and a synchronous dispatcher
//! - `tracing`: subscriber setup driven by `THREATREG_LOG`

pub mod config;
pub mod constants;
pub mod errors;
pub mod events;
pub mod models;
pub mod tracing;
pub mod types;

pub use errors::{ConfigError, RegistryError, StorageError, ValidationError};
pub use types::ThreatSeverity;
