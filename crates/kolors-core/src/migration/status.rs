use super::result::MigrationResult;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of the one-time legacy migration.
///
/// `NotStarted -> InProgress -> {Completed | CompletedWithErrors | Failed}`,
/// or `NotStarted -> NoLegacyData` when there is nothing to migrate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MigrationStatus {
    #[default]
    NotStarted,
    InProgress,
    Completed,
    CompletedWithErrors,
    Failed,
    NoLegacyData,
}

impl MigrationStatus {
    pub fn description(&self) -> &'static str {
        match self {
            MigrationStatus::NotStarted => "Migration not started",
            MigrationStatus::InProgress => "Migration in progress",
            MigrationStatus::Completed => "Migration completed successfully",
            MigrationStatus::CompletedWithErrors => "Migration completed with errors",
            MigrationStatus::Failed => "Migration failed",
            MigrationStatus::NoLegacyData => "No legacy data found",
        }
    }

    pub fn is_completed(&self) -> bool {
        matches!(
            self,
            MigrationStatus::Completed | MigrationStatus::CompletedWithErrors
        )
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(self, MigrationStatus::InProgress)
    }

    pub fn has_errors(&self) -> bool {
        matches!(
            self,
            MigrationStatus::CompletedWithErrors | MigrationStatus::Failed
        )
    }

    /// The terminal status a finished run lands in.
    ///
    /// A failed run that migrated nothing is `Failed`, whether the fetch
    /// broke or every record was rejected. Partial failures complete with
    /// errors.
    pub fn from_result(result: &MigrationResult) -> Self {
        match (result.is_success(), result.total_legacy_records()) {
            (true, 0) => MigrationStatus::NoLegacyData,
            (true, _) => MigrationStatus::Completed,
            (false, _) if result.migrated_records() == 0 => MigrationStatus::Failed,
            (false, _) => MigrationStatus::CompletedWithErrors,
        }
    }
}

impl fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
