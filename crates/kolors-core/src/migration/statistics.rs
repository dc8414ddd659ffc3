use super::result::MigrationResult;
use super::status::MigrationStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Snapshot of migration progress, recomputed on every read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationStatistics {
    pub legacy_record_count: u64,
    /// Combinations holding exactly one color, i.e. the shape a migrated record takes.
    pub migrated_record_count: u64,
    pub total_combination_count: u64,
    pub status: MigrationStatus,
    pub last_migration_time: Option<DateTime<Utc>>,
    pub last_migration_success: Option<bool>,
    /// `migrated / legacy * 100`, or 100 when there is no legacy data.
    pub migration_progress: f64,
    pub migration_needed: bool,
    pub migration_complete: bool,
}

impl MigrationStatistics {
    pub fn new(
        legacy_record_count: u64,
        migrated_record_count: u64,
        total_combination_count: u64,
        status: MigrationStatus,
        last_result: Option<&MigrationResult>,
    ) -> Self {
        let migration_progress = if legacy_record_count == 0 {
            100.0
        } else {
            migrated_record_count as f64 / legacy_record_count as f64 * 100.0
        };

        Self {
            legacy_record_count,
            migrated_record_count,
            total_combination_count,
            status,
            last_migration_time: last_result.and_then(MigrationResult::end_time),
            last_migration_success: last_result.map(MigrationResult::is_success),
            migration_progress,
            migration_needed: legacy_record_count > 0 && status == MigrationStatus::NotStarted,
            migration_complete: status.is_completed(),
        }
    }
}

/// Record-count parity check between the legacy table and migrated combinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MigrationValidation {
    pub legacy_record_count: u64,
    pub new_record_count: u64,
    pub valid: bool,
    pub message: String,
}

impl MigrationValidation {
    /// Valid when at least as many migrated combinations exist as legacy rows.
    pub fn compare(legacy_record_count: u64, new_record_count: u64) -> Self {
        let valid = new_record_count >= legacy_record_count;
        let message = if valid {
            "Migration validation passed".to_string()
        } else {
            format!(
                "Migration validation failed: {} legacy records but only {} migrated combinations",
                legacy_record_count, new_record_count
            )
        };

        Self {
            legacy_record_count,
            new_record_count,
            valid,
            message,
        }
    }
}
