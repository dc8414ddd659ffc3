//! Legacy color rows to single-color combinations.

use super::result::{MigrationResult, RecordOutcome};
use crate::config::{ColorConfig, MigrationConfig};
use crate::error::{KolorsError, Result};
use crate::models::{normalize_hex, ColorCombination, LegacyColor};
use crate::store::{CombinationStore, LegacyStore};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Converts every legacy row into a combination holding one color.
///
/// Each record is migrated on its own: a record that fails to transform or
/// persist is counted and reported, and the run moves on. Only failing to
/// read the legacy table ends the run early.
pub struct LegacyMigrator {
    legacy: Arc<dyn LegacyStore>,
    combinations: Arc<dyn CombinationStore>,
    config: MigrationConfig,
}

impl LegacyMigrator {
    pub fn new(
        legacy: Arc<dyn LegacyStore>,
        combinations: Arc<dyn CombinationStore>,
        config: MigrationConfig,
    ) -> Self {
        Self {
            legacy,
            combinations,
            config,
        }
    }

    /// Run one migration pass. Never fails; problems end up in the result.
    pub fn migrate(&self) -> MigrationResult {
        info!("Starting legacy color migration");

        let records = match self.legacy.find_all_legacy() {
            Ok(records) => records,
            Err(e) => {
                error!("Failed to read legacy colors: {}", e);
                return MigrationResult::fetch_failed(format!("Migration failed: {}", e));
            }
        };

        if records.is_empty() {
            warn!("No legacy data found to migrate");
            return MigrationResult::no_legacy_data();
        }

        info!("Found {} legacy colors to migrate", records.len());

        let result = records
            .iter()
            .map(|record| self.migrate_record(record))
            .fold(
                MigrationResult::started(records.len() as u64),
                MigrationResult::record,
            )
            .finish();

        if result.is_success() {
            info!("{}", result.summary());
        } else {
            warn!("{}", result.summary());
        }
        result
    }

    fn migrate_record(&self, record: &LegacyColor) -> RecordOutcome {
        match self.to_combination(record).and_then(|c| self.save_unless_present(c)) {
            Ok((combination, false)) => {
                debug!(
                    "Migrated legacy color {} into combination {:?} '{}'",
                    record.id, combination.id, combination.name
                );
                RecordOutcome::Migrated
            }
            Ok((existing, true)) => {
                let combination_id = existing.id.map_or(0, |id| id.0);
                warn!(
                    "Legacy color {} already migrated as combination {}",
                    record.id, combination_id
                );
                RecordOutcome::AlreadyMigrated {
                    legacy_id: record.id,
                    combination_id,
                }
            }
            Err(e) => {
                let reason = match e {
                    KolorsError::RecordTransform { message, .. } => message,
                    other => other.to_string(),
                };
                error!("Failed to migrate legacy color {}: {}", record.id, reason);
                RecordOutcome::Failed {
                    legacy_id: record.id,
                    reason,
                }
            }
        }
    }

    /// Save `combination` unless an identical single-color combination exists.
    ///
    /// The flag is true when the existing combination was returned instead.
    fn save_unless_present(&self, combination: ColorCombination) -> Result<(ColorCombination, bool)> {
        let hex = combination.colors.first().map_or("", |c| c.hex_value.as_str());
        if let Some(existing) = self
            .combinations
            .find_single_color_combination(&combination.name, hex)?
        {
            return Ok((existing, true));
        }
        Ok((self.combinations.save_combination(&combination)?, false))
    }

    /// Build the unsaved combination a legacy record becomes.
    fn to_combination(&self, record: &LegacyColor) -> Result<ColorCombination> {
        let reject = |message: String| KolorsError::RecordTransform {
            legacy_id: record.id,
            message,
        };

        let name = record
            .name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or_else(|| reject("Name is required".to_string()))?;
        if name.chars().count() < self.config.min_name_length {
            return Err(reject(format!(
                "Name must be at least {} characters",
                self.config.min_name_length
            )));
        }

        let hex = record
            .hex
            .as_deref()
            .ok_or_else(|| reject("Hex value is required".to_string()))?;
        let hex = normalize_hex(hex).map_err(|_| reject(format!("Invalid hex value: {}", hex)))?;

        let name = self.config.migrated_name(name);
        if name.chars().count() > ColorConfig::MAX_NAME_LENGTH {
            return Err(reject(format!(
                "Migrated name exceeds {} characters",
                ColorConfig::MAX_NAME_LENGTH
            )));
        }

        let mut combination = ColorCombination::new(name);
        combination.push_color(hex);
        Ok(combination)
    }
}
