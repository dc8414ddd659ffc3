//! Kolors Core - ordered color combinations and the legacy color migration.
//!
//! This crate keeps the colors of every combination at dense, 1-based
//! positions and migrates the old flat color table into single-color
//! combinations. It has no HTTP/RPC layer of its own; see `kolors-rpc`.
//!
//! # Example
//!
//! ```rust,ignore
//! use kolors_core::KolorsApi;
//!
//! fn main() -> kolors_core::Result<()> {
//!     let api = KolorsApi::builder().database_path("kolors.sqlite").build()?;
//!
//!     let result = api.migration().run_migration();
//!     println!("{}", result.summary());
//!
//!     let stats = api.migration().statistics()?;
//!     println!("Progress: {:.1}%", stats.migration_progress);
//!     Ok(())
//! }
//! ```

pub mod combination;
pub mod config;
pub mod error;
pub mod migration;
pub mod models;
pub mod position;
pub mod store;

mod api;

// Re-export commonly used types
pub use combination::{CombinationService, CombinationStatistics};
pub use config::{AppConfig, ColorConfig, MigrationConfig, StoreConfig};
pub use error::{KolorsError, Result};
pub use migration::{
    LegacyMigrator, MigrationResult, MigrationStatistics, MigrationStatus, MigrationTracker,
    MigrationValidation, RecordOutcome,
};
pub use models::{ColorCombination, ColorId, ColorInCombination, CombinationId, LegacyColor};
pub use position::ColorPositionService;
pub use store::{ColorStore, CombinationStore, LegacyStore, SqliteStore};

pub use api::KolorsApiBuilder;

use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Main entry point: one store shared by the migration tracker and the
/// combination service.
pub struct KolorsApi {
    database_path: Option<PathBuf>,
    store: Arc<SqliteStore>,
    tracker: MigrationTracker,
    combinations: CombinationService,
}

impl KolorsApi {
    pub fn builder() -> KolorsApiBuilder {
        KolorsApiBuilder::new()
    }

    /// Open (or create) a database file with default settings.
    pub fn open(database_path: impl Into<PathBuf>) -> Result<Self> {
        Self::builder().database_path(database_path).build()
    }

    /// Fresh in-memory instance with default settings.
    pub fn open_in_memory() -> Result<Self> {
        Self::builder().build()
    }

    /// `None` for in-memory instances.
    pub fn database_path(&self) -> Option<&Path> {
        self.database_path.as_deref()
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub fn migration(&self) -> &MigrationTracker {
        &self.tracker
    }

    pub fn combinations(&self) -> &CombinationService {
        &self.combinations
    }

    pub fn positions(&self) -> &ColorPositionService {
        self.combinations.positions()
    }
}
