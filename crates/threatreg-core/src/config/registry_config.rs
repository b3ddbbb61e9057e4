//! Top-level registry configuration with layered resolution.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{DatabaseConfig, InheritanceConfig};
use crate::constants::{MAX_READ_POOL_SIZE, PROJECT_CONFIG_FILE};
use crate::errors::ConfigError;

/// Top-level configuration aggregating all sub-configs.
///
/// Resolution order (highest priority first):
/// 1. Overrides passed in code (`ConfigOverrides`)
/// 2. Environment variables (`THREATREG_*`)
/// 3. Project config (`threatreg.toml` in the project root)
/// 4. User config (`~/.threatreg/config.toml`)
/// 5. Compiled defaults
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RegistryConfig {
    pub database: DatabaseConfig,
    pub inheritance: InheritanceConfig,
}

/// Programmatic overrides, applied last.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<String>,
    pub read_pool_size: Option<usize>,
    pub max_depth: Option<usize>,
}

impl RegistryConfig {
    /// Load configuration with layered resolution.
    pub fn load(root: &Path, overrides: Option<&ConfigOverrides>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(user_config_path) = Self::user_config_path() {
            if user_config_path.exists() {
                match Self::merge_toml_file(&mut config, &user_config_path) {
                    Ok(()) => {}
                    Err(e @ ConfigError::ParseError { .. }) => return Err(e),
                    Err(e) => {
                        tracing::warn!(
                            path = %user_config_path.display(),
                            error = %e,
                            "ignoring unreadable user config"
                        );
                    }
                }
            }
        }

        let project_config_path = root.join(PROJECT_CONFIG_FILE);
        if project_config_path.exists() {
            Self::merge_toml_file(&mut config, &project_config_path)?;
        }

        Self::apply_env_overrides(&mut config)?;

        if let Some(overrides) = overrides {
            Self::apply_overrides(&mut config, overrides);
        }

        Self::validate(&config)?;

        Ok(config)
    }

    /// Load configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml_str).map_err(|e| ConfigError::ParseError {
            path: "<string>".to_string(),
            message: e.to_string(),
        })
    }

    /// Validate the configuration values.
    pub fn validate(config: &RegistryConfig) -> Result<(), ConfigError> {
        if let Some(ref path) = config.database.path {
            if path.trim().is_empty() {
                return Err(ConfigError::ValidationFailed {
                    field: "database.path".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
        }
        if let Some(size) = config.database.read_pool_size {
            if size == 0 || size > MAX_READ_POOL_SIZE {
                return Err(ConfigError::ValidationFailed {
                    field: "database.read_pool_size".to_string(),
                    message: format!("must be between 1 and {MAX_READ_POOL_SIZE}"),
                });
            }
        }
        if config.inheritance.max_depth == Some(0) {
            return Err(ConfigError::ValidationFailed {
                field: "inheritance.max_depth".to_string(),
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Returns the user config path: `~/.threatreg/config.toml`.
    fn user_config_path() -> Option<PathBuf> {
        dirs_path().map(|d| d.join("config.toml"))
    }

    /// Merge a TOML file into the existing config.
    /// Unknown keys are silently ignored.
    fn merge_toml_file(config: &mut RegistryConfig, path: &Path) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|_| ConfigError::FileNotFound {
            path: path.display().to_string(),
        })?;

        let file_config: RegistryConfig =
            toml::from_str(&content).map_err(|e| ConfigError::ParseError {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        Self::merge(config, &file_config);
        Ok(())
    }

    /// Merge `other` into `base`; only `Some` values in `other` win.
    fn merge(base: &mut RegistryConfig, other: &RegistryConfig) {
        if other.database.path.is_some() {
            base.database.path = other.database.path.clone();
        }
        if other.database.read_pool_size.is_some() {
            base.database.read_pool_size = other.database.read_pool_size;
        }
        if other.database.busy_timeout_ms.is_some() {
            base.database.busy_timeout_ms = other.database.busy_timeout_ms;
        }
        if other.inheritance.max_depth.is_some() {
            base.inheritance.max_depth = other.inheritance.max_depth;
        }
    }

    /// Apply environment variable overrides.
    /// Pattern: `THREATREG_DATABASE_PATH`, `THREATREG_INHERITANCE_MAX_DEPTH`, etc.
    fn apply_env_overrides(config: &mut RegistryConfig) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("THREATREG_DATABASE_PATH") {
            config.database.path = Some(val);
        }
        if let Ok(val) = std::env::var("THREATREG_DATABASE_READ_POOL_SIZE") {
            config.database.read_pool_size =
                Some(parse_env("THREATREG_DATABASE_READ_POOL_SIZE", &val)?);
        }
        if let Ok(val) = std::env::var("THREATREG_DATABASE_BUSY_TIMEOUT_MS") {
            config.database.busy_timeout_ms =
                Some(parse_env("THREATREG_DATABASE_BUSY_TIMEOUT_MS", &val)?);
        }
        if let Ok(val) = std::env::var("THREATREG_INHERITANCE_MAX_DEPTH") {
            config.inheritance.max_depth =
                Some(parse_env("THREATREG_INHERITANCE_MAX_DEPTH", &val)?);
        }
        Ok(())
    }

    fn apply_overrides(config: &mut RegistryConfig, overrides: &ConfigOverrides) {
        if let Some(ref v) = overrides.database_path {
            config.database.path = Some(v.clone());
        }
        if let Some(v) = overrides.read_pool_size {
            config.database.read_pool_size = Some(v);
        }
        if let Some(v) = overrides.max_depth {
            config.inheritance.max_depth = Some(v);
        }
    }

    /// Serialize the config back to TOML.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ParseError {
            path: "<serialization>".to_string(),
            message: e.to_string(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(field: &str, raw: &str) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("{raw:?}: {e}"),
    })
}

/// Returns the user-level config directory: `~/.threatreg/`.
fn dirs_path() -> Option<PathBuf> {
    home_dir().map(|h| h.join(".threatreg"))
}

/// Cross-platform home directory resolution.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}
