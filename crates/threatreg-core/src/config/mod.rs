//! Configuration system for the threat registry.
//! TOML-based, layered resolution: overrides > env > project > user > defaults.

pub mod database_config;
pub mod inheritance_config;
pub mod registry_config;

pub use database_config::DatabaseConfig;
pub use inheritance_config::InheritanceConfig;
pub use registry_config::{ConfigOverrides, RegistryConfig};
