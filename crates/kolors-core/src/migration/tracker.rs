//! Owner of the migration lifecycle.

use super::engine::LegacyMigrator;
use super::integrity::check_combination;
use super::result::MigrationResult;
use super::statistics::{MigrationStatistics, MigrationValidation};
use super::status::MigrationStatus;
use crate::config::MigrationConfig;
use crate::error::Result;
use crate::store::{CombinationStore, LegacyStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{error, info, warn};

#[derive(Debug, Default)]
struct TrackerState {
    status: MigrationStatus,
    last_result: Option<MigrationResult>,
}

/// Tracks where the legacy migration stands and runs it.
///
/// All status changes go through the methods here; the state is guarded by a
/// mutex so the tracker can be shared across threads behind an `Arc`.
pub struct MigrationTracker {
    legacy: Arc<dyn LegacyStore>,
    combinations: Arc<dyn CombinationStore>,
    migrator: LegacyMigrator,
    state: Mutex<TrackerState>,
}

impl MigrationTracker {
    pub fn new(
        legacy: Arc<dyn LegacyStore>,
        combinations: Arc<dyn CombinationStore>,
        config: MigrationConfig,
    ) -> Self {
        let migrator = LegacyMigrator::new(legacy.clone(), combinations.clone(), config);
        Self {
            legacy,
            combinations,
            migrator,
            state: Mutex::new(TrackerState::default()),
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn current_status(&self) -> MigrationStatus {
        self.lock_state().status
    }

    pub fn last_result(&self) -> Option<MigrationResult> {
        self.lock_state().last_result.clone()
    }

    /// Run the migration unless one is already going.
    ///
    /// An empty legacy table short-circuits to `NoLegacyData` without invoking
    /// the migrator. A run requested while another is in progress gets an
    /// unsuccessful result and leaves the state alone.
    pub fn run_migration(&self) -> MigrationResult {
        let legacy_count = self.legacy.count_legacy();

        {
            let mut state = self.lock_state();
            if state.status.is_in_progress() {
                warn!("Migration requested while another run is in progress");
                return MigrationResult::rejected("Migration is already in progress");
            }

            match legacy_count {
                Ok(0) => {
                    info!("No legacy data found, nothing to migrate");
                    let result = MigrationResult::no_legacy_data();
                    state.status = MigrationStatus::NoLegacyData;
                    state.last_result = Some(result.clone());
                    return result;
                }
                Ok(count) => info!("Migration starting for {} legacy records", count),
                Err(e) => {
                    error!("Failed to count legacy records: {}", e);
                    let result = MigrationResult::fetch_failed(format!("Migration failed: {}", e));
                    state.status = MigrationStatus::Failed;
                    state.last_result = Some(result.clone());
                    return result;
                }
            }

            state.status = MigrationStatus::InProgress;
        }

        let result = self.migrator.migrate();

        let mut state = self.lock_state();
        state.status = MigrationStatus::from_result(&result);
        state.last_result = Some(result.clone());
        if state.status.has_errors() {
            warn!("Migration finished: {}", state.status);
        } else {
            info!("Migration finished: {}", state.status);
        }
        result
    }

    pub fn statistics(&self) -> Result<MigrationStatistics> {
        let legacy_count = self.legacy.count_legacy()?;
        let migrated_count = self.combinations.count_combinations_by_color_count(1)?;
        let total_count = self.combinations.count_combinations()?;

        let state = self.lock_state();
        Ok(MigrationStatistics::new(
            legacy_count,
            migrated_count,
            total_count,
            state.status,
            state.last_result.as_ref(),
        ))
    }

    pub fn has_legacy_data(&self) -> Result<bool> {
        Ok(self.legacy.count_legacy()? > 0)
    }

    /// Back to `NotStarted`, forgetting the last result. Migrated data stays.
    pub fn reset(&self) {
        let mut state = self.lock_state();
        state.status = MigrationStatus::NotStarted;
        state.last_result = None;
        info!("Migration status reset");
    }

    /// Compare legacy row count with the number of single-color combinations.
    pub fn validate_migration(&self) -> Result<MigrationValidation> {
        let legacy_count = self.legacy.count_legacy()?;
        let new_count = self.combinations.count_combinations_by_color_count(1)?;
        let validation = MigrationValidation::compare(legacy_count, new_count);

        if validation.valid {
            info!(
                "Migration validation passed: {} legacy, {} migrated",
                legacy_count, new_count
            );
        } else {
            warn!("{}", validation.message);
        }
        Ok(validation)
    }

    /// Walk every stored combination and check it is well formed.
    ///
    /// Each problem becomes an error on the returned result, which succeeds
    /// only when every combination passes. Tracker state is left alone.
    pub fn validate_migrated_data(&self) -> MigrationResult {
        info!("Validating migrated data integrity");

        let combinations = match self.combinations.find_all_combinations() {
            Ok(combinations) => combinations,
            Err(e) => {
                error!("Data validation could not load combinations: {}", e);
                return MigrationResult::fetch_failed(format!("Data validation failed: {}", e));
            }
        };

        let mut result = MigrationResult::integrity_check(combinations.len() as u64);
        let mut invalid = 0usize;
        for combination in &combinations {
            if let Err(reason) = check_combination(combination) {
                let id = combination.id.map_or(0, |id| id.0);
                result.add_error(format!("Invalid combination ID {}: {}", id, reason));
                invalid += 1;
            }
        }
        let result = result.finish();

        if invalid == 0 {
            info!(
                "Data validation passed for {} combinations",
                combinations.len()
            );
        } else {
            warn!(
                "Data validation found issues. Valid: {}, Invalid: {}",
                combinations.len() - invalid,
                invalid
            );
        }
        result
    }
}
