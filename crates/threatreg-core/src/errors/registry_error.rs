//! Service-level errors returned by the registry.

use super::error_code::{self, RegistryErrorCode};
use super::{ConfigError, StorageError, ValidationError};

/// Errors surfaced by registry operations.
/// Aggregates subsystem errors via `From` conversions.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("{entity} already exists: {detail}")]
    AlreadyExists { entity: &'static str, detail: String },

    #[error("cycle detected in {detail}")]
    CycleDetected { detail: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl RegistryError {
    /// Shorthand for a `NotFound` error.
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// True if this is a `NotFound` error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl RegistryErrorCode for RegistryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => error_code::NOT_FOUND,
            Self::AlreadyExists { .. } => error_code::ALREADY_EXISTS,
            Self::CycleDetected { .. } => error_code::CYCLE_DETECTED,
            Self::Validation(e) => e.error_code(),
            Self::Storage(e) => e.error_code(),
            Self::Config(e) => e.error_code(),
        }
    }
}

/// Convenience alias used across the registry crate.
pub type RegistryResult<T> = Result<T, RegistryError>;
