//! Centralized configuration for Kolors.
//!
//! Constant limits live on zero-sized config structs; the migration run takes
//! a small runtime `MigrationConfig` so the renaming rule can be overridden.

use serde::{Deserialize, Serialize};

/// Application-level configuration.
pub struct AppConfig;

impl AppConfig {
    pub const APP_NAME: &'static str = "Kolors";
    pub const DATABASE_FILENAME: &'static str = "kolors.sqlite";
}

/// SQLite store configuration.
pub struct StoreConfig;

impl StoreConfig {
    pub const BUSY_TIMEOUT_MS: u32 = 5_000;
}

/// Limits that apply to combinations and their colors.
pub struct ColorConfig;

impl ColorConfig {
    pub const MIN_COLORS: usize = 2;
    pub const MAX_COLORS: usize = 4;
    pub const HEX_LENGTH: usize = 6;
    pub const MIN_NAME_LENGTH: usize = 3;
    pub const MAX_NAME_LENGTH: usize = 100;
}

/// Configuration for the legacy migration run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct MigrationConfig {
    /// Marker prepended to every legacy name when it becomes a combination name.
    pub name_prefix: String,
    /// Minimum trimmed length of a legacy name.
    pub min_name_length: usize,
}

impl MigrationConfig {
    /// Default marker for migrated combination names.
    pub const DEFAULT_NAME_PREFIX: &'static str = "[Migrated] ";

    /// Build the combination name for a legacy record name.
    pub fn migrated_name(&self, legacy_name: &str) -> String {
        format!("{}{}", self.name_prefix, legacy_name.trim())
    }
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            name_prefix: MigrationConfig::DEFAULT_NAME_PREFIX.to_string(),
            min_name_length: ColorConfig::MIN_NAME_LENGTH,
        }
    }
}
