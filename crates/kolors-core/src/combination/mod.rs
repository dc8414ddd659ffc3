//! Creating and editing combinations while keeping their positions dense.

use crate::config::ColorConfig;
use crate::error::{KolorsError, Result};
use crate::models::{is_valid_hex, normalize_hex, ColorCombination, ColorInCombination, CombinationId};
use crate::position::ColorPositionService;
use crate::store::{ColorStore, CombinationStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

mod statistics;

pub use statistics::CombinationStatistics;

/// Combination operations that route every insert and removal through the
/// position engine.
///
/// Edits to existing combinations hold `edits` from the first read to the
/// final color count update, so concurrent callers never interleave their
/// read-modify-write steps.
pub struct CombinationService {
    combinations: Arc<dyn CombinationStore>,
    colors: Arc<dyn ColorStore>,
    positions: ColorPositionService,
    edits: Mutex<()>,
}

impl CombinationService {
    pub fn new(combinations: Arc<dyn CombinationStore>, colors: Arc<dyn ColorStore>) -> Self {
        let positions = ColorPositionService::new(colors.clone());
        Self {
            combinations,
            colors,
            positions,
            edits: Mutex::new(()),
        }
    }

    fn lock_edits(&self) -> MutexGuard<'_, ()> {
        self.edits.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn positions(&self) -> &ColorPositionService {
        &self.positions
    }

    /// Create a combination with colors at positions `1..=N`.
    ///
    /// All validation problems are reported together.
    pub fn create_combination(&self, name: &str, hex_values: &[String]) -> Result<ColorCombination> {
        let name = name.trim();
        let mut errors = Vec::new();

        let name_length = name.chars().count();
        if !(ColorConfig::MIN_NAME_LENGTH..=ColorConfig::MAX_NAME_LENGTH).contains(&name_length) {
            errors.push(format!(
                "Name must be between {} and {} characters",
                ColorConfig::MIN_NAME_LENGTH,
                ColorConfig::MAX_NAME_LENGTH
            ));
        }
        if !(ColorConfig::MIN_COLORS..=ColorConfig::MAX_COLORS).contains(&hex_values.len()) {
            errors.push(format!(
                "A combination must have between {} and {} colors",
                ColorConfig::MIN_COLORS,
                ColorConfig::MAX_COLORS
            ));
        }
        for hex in hex_values {
            if !is_valid_hex(hex.trim()) {
                errors.push(format!("Invalid hexadecimal color format: {}", hex));
            }
        }
        if !errors.is_empty() {
            return Err(KolorsError::Validation { errors });
        }

        let mut combination = ColorCombination::new(name);
        for hex in hex_values {
            combination.push_color(normalize_hex(hex)?);
        }

        let saved = self.combinations.save_combination(&combination)?;
        info!(
            "Created combination {:?} '{}' with {} colors",
            saved.id, saved.name, saved.color_count
        );
        Ok(saved)
    }

    pub fn get_combination(&self, id: CombinationId) -> Result<ColorCombination> {
        self.combinations
            .find_combination_by_id(id)?
            .ok_or(KolorsError::CombinationNotFound { id: id.0 })
    }

    /// Every combination, most recently created first.
    pub fn list_combinations(&self) -> Result<Vec<ColorCombination>> {
        let mut combinations = self.combinations.find_all_combinations()?;
        combinations.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        debug!("Listed {} combinations", combinations.len());
        Ok(combinations)
    }

    pub fn statistics(&self) -> Result<CombinationStatistics> {
        Ok(CombinationStatistics {
            total_combinations: self.combinations.count_combinations()?,
            single_color_combinations: self.combinations.count_combinations_by_color_count(1)?,
            combinations_with_2_colors: self.combinations.count_combinations_by_color_count(2)?,
            combinations_with_3_colors: self.combinations.count_combinations_by_color_count(3)?,
            combinations_with_4_colors: self.combinations.count_combinations_by_color_count(4)?,
        })
    }

    /// Append a color after the current last position.
    pub fn add_color(&self, id: CombinationId, hex_value: &str) -> Result<ColorCombination> {
        let hex_value = normalize_hex(hex_value)?;
        let _edit = self.lock_edits();
        let combination = self.get_combination(id)?;

        if combination.colors.len() >= ColorConfig::MAX_COLORS {
            return Err(KolorsError::Validation {
                errors: vec![format!(
                    "A combination cannot have more than {} colors",
                    ColorConfig::MAX_COLORS
                )],
            });
        }

        let position = self.positions.next_available_position(Some(id))?;
        let mut color = ColorInCombination::new(hex_value, position);
        color.combination_id = Some(id);
        self.colors.save_color(&color)?;
        debug!("Added color {} at position {} to combination {}", color.hex_value, position, id);

        self.sync_color_count(id)
    }

    /// Remove the color at `position` and close the gap it leaves.
    ///
    /// The declared color count is brought in line with the stored colors
    /// even when closing the gap fails; `check_integrity` repairs the gap.
    pub fn remove_color(&self, id: CombinationId, position: u32) -> Result<ColorCombination> {
        if position < 1 {
            return Err(KolorsError::invalid_argument(
                "position",
                "Position must be at least 1",
            ));
        }

        let _edit = self.lock_edits();
        let combination = self.get_combination(id)?;
        if combination.colors.len() <= 1 {
            return Err(KolorsError::Validation {
                errors: vec!["Cannot remove the last color from a combination".to_string()],
            });
        }

        let color_id = combination
            .colors
            .iter()
            .find(|c| c.position == position)
            .and_then(|c| c.id)
            .ok_or(KolorsError::ColorNotFound {
                combination_id: id.0,
                position,
            })?;

        self.colors.delete_color_by_id(color_id)?;
        let reordered = self.positions.reorder_after_removal(Some(id), Some(position));
        let synced = self.sync_color_count(id);
        if let Err(e) = &reordered {
            warn!(
                "Removed color at position {} from combination {} but could not close the gap: {}",
                position, id, e
            );
        }
        reordered?;
        debug!("Removed color at position {} from combination {}", position, id);
        synced
    }

    /// Re-read a combination and store its actual number of colors.
    fn sync_color_count(&self, id: CombinationId) -> Result<ColorCombination> {
        let mut combination = self.get_combination(id)?;
        let actual = combination.colors.len() as u32;
        if combination.color_count == actual {
            return Ok(combination);
        }
        combination.color_count = actual;
        self.combinations.save_combination(&combination)
    }

    pub fn delete_combination(&self, id: CombinationId) -> Result<()> {
        let _edit = self.lock_edits();
        if !self.combinations.delete_combination_by_id(id)? {
            return Err(KolorsError::CombinationNotFound { id: id.0 });
        }
        info!("Deleted combination {}", id);
        Ok(())
    }

    /// Check a combination's positions and renumber them if they drifted.
    ///
    /// Returns true when a repair was needed. The declared color count is
    /// brought back in line with the stored colors as well.
    pub fn check_integrity(&self, id: CombinationId) -> Result<bool> {
        let _edit = self.lock_edits();
        let mut combination = self.get_combination(id)?;
        let mut repaired = false;

        if !self.positions.validate_sequential(&combination.colors) {
            self.positions.fix_sequential(Some(id))?;
            repaired = true;
        }

        let actual = combination.colors.len() as u32;
        if combination.color_count != actual {
            info!(
                "Combination {} declared {} colors but holds {}",
                id, combination.color_count, actual
            );
            combination.color_count = actual;
            self.combinations.save_combination(&combination)?;
            repaired = true;
        }

        Ok(repaired)
    }
}
