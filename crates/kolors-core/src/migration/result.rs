//! Outcome of one migration run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// What happened to a single legacy record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    Migrated,
    /// An identical single-color combination already exists; nothing was saved.
    AlreadyMigrated { legacy_id: i64, combination_id: i64 },
    Failed { legacy_id: i64, reason: String },
}

/// Counters, messages and timing of a migration run.
///
/// Built up by the migration engine while the run is going and finalized once
/// it ends; after that the value is never changed, only replaced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MigrationResult {
    success: bool,
    total_legacy_records: u64,
    migrated_records: u64,
    failed_records: u64,
    start_time: DateTime<Utc>,
    end_time: Option<DateTime<Utc>>,
    errors: Vec<String>,
    warnings: Vec<String>,
    summary: String,
}

impl MigrationResult {
    /// A run about to process `total_legacy_records` records.
    pub(crate) fn started(total_legacy_records: u64) -> Self {
        Self {
            success: false,
            total_legacy_records,
            migrated_records: 0,
            failed_records: 0,
            start_time: Utc::now(),
            end_time: None,
            errors: Vec::new(),
            warnings: Vec::new(),
            summary: String::new(),
        }
    }

    /// Fold one record's outcome into the counters.
    pub(crate) fn record(mut self, outcome: RecordOutcome) -> Self {
        match outcome {
            RecordOutcome::Migrated => self.migrated_records += 1,
            RecordOutcome::AlreadyMigrated {
                legacy_id,
                combination_id,
            } => {
                self.migrated_records += 1;
                self.add_warning(format!(
                    "Legacy record ID {} already migrated as combination {}",
                    legacy_id, combination_id
                ));
            }
            RecordOutcome::Failed { legacy_id, reason } => {
                self.failed_records += 1;
                self.errors.push(format!(
                    "Failed to migrate legacy record ID {}: {}",
                    legacy_id, reason
                ));
            }
        }
        self
    }

    pub(crate) fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    pub(crate) fn add_error(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    /// Stamp the end time, settle `success` and render the summary.
    pub(crate) fn finish(mut self) -> Self {
        self.success = self.failed_records == 0 && self.errors.is_empty();
        self.end_time = Some(Utc::now());
        self.summary = self.render_summary();
        self
    }

    /// An integrity pass over `checked` stored combinations. Problems are added
    /// as errors before the result is finished.
    pub(crate) fn integrity_check(checked: u64) -> Self {
        let mut result = Self::started(0);
        result.migrated_records = checked;
        result
    }

    /// Successful run over an empty legacy table.
    pub fn no_legacy_data() -> Self {
        let mut result = Self::started(0);
        result.add_warning("No legacy data found to migrate");
        result.finish()
    }

    /// The legacy table could not be read at all.
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        let mut result = Self::started(0);
        result.add_error(message);
        result.finish()
    }

    /// A run refused before it started, e.g. because another is in progress.
    pub fn rejected(reason: impl Into<String>) -> Self {
        Self::fetch_failed(reason)
    }

    fn render_summary(&self) -> String {
        let mut summary = format!(
            "Migration completed {}. Total records: {}, Migrated: {}, Failed: {}, Duration: {} seconds",
            if self.success { "successfully" } else { "with errors" },
            self.total_legacy_records,
            self.migrated_records,
            self.failed_records,
            self.duration_seconds(),
        );
        if !self.errors.is_empty() {
            summary.push_str(&format!(", Errors: {}", self.errors.len()));
        }
        if !self.warnings.is_empty() {
            summary.push_str(&format!(", Warnings: {}", self.warnings.len()));
        }
        summary
    }

    /// Whole seconds between start and end; 0 while the run is open.
    pub fn duration_seconds(&self) -> i64 {
        self.end_time
            .map_or(0, |end| (end - self.start_time).num_seconds())
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn total_legacy_records(&self) -> u64 {
        self.total_legacy_records
    }

    pub fn migrated_records(&self) -> u64 {
        self.migrated_records
    }

    pub fn failed_records(&self) -> u64 {
        self.failed_records
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        self.end_time
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}
