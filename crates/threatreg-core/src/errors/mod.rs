//! Error handling for the threat registry.
//! One error enum per subsystem, `thiserror` only, zero `anyhow`.

pub mod config_error;
pub mod error_code;
pub mod registry_error;
pub mod storage_error;
pub mod validation_error;

pub use config_error::ConfigError;
pub use error_code::RegistryErrorCode;
pub use registry_error::{RegistryError, RegistryResult};
pub use storage_error::StorageError;
pub use validation_error::ValidationError;
