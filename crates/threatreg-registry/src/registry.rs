//! The `Registry` service handle.

use std::path::Path;
use std::sync::Arc;

use threatreg_core::config::{ConfigOverrides, RegistryConfig};
use threatreg_core::errors::RegistryResult;
use threatreg_core::events::{EventDispatcher, RegistryEventHandler};
use threatreg_storage::DatabaseManager;

/// Entry point for every registry operation.
///
/// Writes go through the single writer connection; multi-step writes run in
/// one `BEGIN IMMEDIATE` transaction and emit their events after commit.
pub struct Registry {
    pub(crate) db: DatabaseManager,
    pub(crate) events: EventDispatcher,
    pub(crate) config: RegistryConfig,
}

impl Registry {
    /// Wrap an open database with the default configuration.
    pub fn new(db: DatabaseManager) -> Self {
        Self::with_config(db, RegistryConfig::default())
    }

    pub fn with_config(db: DatabaseManager, config: RegistryConfig) -> Self {
        Self {
            db,
            events: EventDispatcher::new(),
            config,
        }
    }

    /// Resolve the layered configuration for `root`, then open its database.
    /// A relative database path is taken relative to `root`.
    pub fn open(root: &Path, overrides: Option<&ConfigOverrides>) -> RegistryResult<Self> {
        let mut config = RegistryConfig::load(root, overrides)?;
        let db_path = root.join(config.database.effective_path());
        config.database.path = Some(db_path.to_string_lossy().into_owned());
        let db = DatabaseManager::from_config(&config.database)?;
        tracing::info!(path = config.database.effective_path(), "opened registry");
        Ok(Self::with_config(db, config))
    }

    /// A throwaway registry backed by an in-memory database.
    pub fn open_in_memory() -> RegistryResult<Self> {
        Ok(Self::new(DatabaseManager::open_in_memory()?))
    }

    /// Register an event handler. Handlers run synchronously after commit.
    pub fn register_handler(&mut self, handler: Arc<dyn RegistryEventHandler>) {
        self.events.register(handler);
    }

    pub fn db(&self) -> &DatabaseManager {
        &self.db
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub(crate) fn max_depth(&self) -> usize {
        self.config.inheritance.effective_max_depth()
    }
}
