//! Storage traits consumed by the position engine, combination service and migration.
//!
//! All operations are synchronous to match rusqlite's API. Method names follow
//! the query they run so that call sites read like the SQL they trigger.

use crate::error::Result;
use crate::models::{ColorCombination, ColorId, ColorInCombination, CombinationId, LegacyColor};

/// Persistence for combination aggregates.
pub trait CombinationStore: Send + Sync {
    /// All combinations with their colors, ordered by id.
    fn find_all_combinations(&self) -> Result<Vec<ColorCombination>>;

    /// One combination with its colors ordered by position.
    fn find_combination_by_id(&self, id: CombinationId) -> Result<Option<ColorCombination>>;

    /// Insert or update a combination.
    ///
    /// An unsaved combination (no id) is inserted together with all of its
    /// colors in a single transaction. A saved combination only has its own
    /// columns updated; colors are managed through [`ColorStore`].
    fn save_combination(&self, combination: &ColorCombination) -> Result<ColorCombination>;

    /// Delete a combination and, by cascade, its colors.
    fn delete_combination_by_id(&self, id: CombinationId) -> Result<bool>;

    fn combination_exists(&self, id: CombinationId) -> Result<bool>;

    /// A combination called `name` holding exactly one color, `hex_value`.
    fn find_single_color_combination(
        &self,
        name: &str,
        hex_value: &str,
    ) -> Result<Option<ColorCombination>>;

    fn count_combinations(&self) -> Result<u64>;

    /// Count combinations whose declared color count equals `color_count`.
    fn count_combinations_by_color_count(&self, color_count: u32) -> Result<u64>;
}

/// Persistence for positioned colors, keyed by combination and position.
pub trait ColorStore: Send + Sync {
    fn find_by_combination_id_order_by_position(
        &self,
        combination_id: CombinationId,
    ) -> Result<Vec<ColorInCombination>>;

    fn find_by_combination_id_and_position_greater_than_order_by_position(
        &self,
        combination_id: CombinationId,
        position: u32,
    ) -> Result<Vec<ColorInCombination>>;

    fn find_max_position_by_combination_id(&self, combination_id: CombinationId)
        -> Result<Option<u32>>;

    fn exists_by_combination_id_and_position(
        &self,
        combination_id: CombinationId,
        position: u32,
    ) -> Result<bool>;

    /// Insert a color (no id) or update its hex value and position.
    fn save_color(&self, color: &ColorInCombination) -> Result<ColorInCombination>;

    fn delete_color_by_id(&self, id: ColorId) -> Result<bool>;

    /// Apply a batch of `(color, new position)` rewrites atomically.
    ///
    /// Implementations must not trip the `(combination, position)` uniqueness
    /// rule while the batch is half applied.
    fn update_positions(&self, updates: &[(ColorId, u32)]) -> Result<()>;

    fn count_colors(&self) -> Result<u64>;
}

/// Read access to the pre-migration color table.
pub trait LegacyStore: Send + Sync {
    fn find_all_legacy(&self) -> Result<Vec<LegacyColor>>;

    fn count_legacy(&self) -> Result<u64>;
}
