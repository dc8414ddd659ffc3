//! One-time migration of the flat legacy color table into combinations.
//!
//! [`LegacyMigrator`] performs a single pass and folds per-record outcomes
//! into a [`MigrationResult`]. [`MigrationTracker`] owns the lifecycle state
//! around it and keeps the last result until reset.

mod engine;
mod integrity;
mod result;
mod statistics;
mod status;
mod tracker;

pub use engine::LegacyMigrator;
pub use result::{MigrationResult, RecordOutcome};
pub use statistics::{MigrationStatistics, MigrationValidation};
pub use status::MigrationStatus;
pub use tracker::MigrationTracker;
