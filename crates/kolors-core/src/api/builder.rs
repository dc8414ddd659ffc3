//! Builder for configuring KolorsApi initialization.

use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::combination::CombinationService;
use crate::config::MigrationConfig;
use crate::error::{KolorsError, Result};
use crate::migration::MigrationTracker;
use crate::store::SqliteStore;
use crate::KolorsApi;

/// Builder for configuring KolorsApi initialization.
///
/// # Example
///
/// ```rust,ignore
/// use kolors_core::{KolorsApi, MigrationConfig};
///
/// let api = KolorsApi::builder()
///     .database_path("./data/kolors.sqlite")
///     .migration_config(MigrationConfig::default())
///     .build()?;
/// ```
#[derive(Debug, Default)]
pub struct KolorsApiBuilder {
    database_path: Option<PathBuf>,
    migration_config: MigrationConfig,
}

impl KolorsApiBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store data in a SQLite file at `path`.
    ///
    /// Default: an in-memory database that disappears with the API.
    pub fn database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Override how migrated combinations are named and which legacy names qualify.
    pub fn migration_config(mut self, config: MigrationConfig) -> Self {
        self.migration_config = config;
        self
    }

    /// Open the store and wire the services together.
    pub fn build(self) -> Result<KolorsApi> {
        let store = match &self.database_path {
            Some(path) => {
                if path.is_dir() {
                    return Err(KolorsError::Config {
                        message: format!("Database path is a directory: {}", path.display()),
                    });
                }
                info!("Opening Kolors database at {}", path.display());
                Arc::new(SqliteStore::open_at(path)?)
            }
            None => {
                info!("Opening in-memory Kolors database");
                Arc::new(SqliteStore::open_in_memory()?)
            }
        };

        let tracker = MigrationTracker::new(store.clone(), store.clone(), self.migration_config);
        let combinations = CombinationService::new(store.clone(), store.clone());

        Ok(KolorsApi {
            database_path: self.database_path,
            store,
            tracker,
            combinations,
        })
    }
}
