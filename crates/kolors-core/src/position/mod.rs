//! Position consistency for the colors of a combination.
//!
//! Positions inside one combination are a dense, 1-based permutation. Colors
//! are only ever appended past the current maximum and removed with the gap
//! closed afterwards; there is no insert-in-the-middle primitive. Repairs
//! rewrite position numbers only, never a color's identity or hex value.

use crate::error::{KolorsError, Result};
use crate::models::{ColorId, ColorInCombination, CombinationId};
use crate::store::ColorStore;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Keeps color positions contiguous after removals and repairs drift.
pub struct ColorPositionService {
    colors: Arc<dyn ColorStore>,
}

impl ColorPositionService {
    pub fn new(colors: Arc<dyn ColorStore>) -> Self {
        Self { colors }
    }

    /// Close the gap left by a removed color.
    ///
    /// Every color after `removed_position` moves down by one. The shift only
    /// happens while the slot is actually vacant, so repeating the call after
    /// the gap has been closed does nothing. Missing arguments are logged and
    /// ignored.
    ///
    /// Returns the number of colors that moved.
    pub fn reorder_after_removal(
        &self,
        combination_id: Option<CombinationId>,
        removed_position: Option<u32>,
    ) -> Result<usize> {
        let (Some(combination_id), Some(removed_position)) = (combination_id, removed_position)
        else {
            warn!(
                "Cannot reorder positions: combination_id={:?}, removed_position={:?}",
                combination_id, removed_position
            );
            return Ok(0);
        };

        if removed_position < 1 {
            warn!(
                "Ignoring reorder for combination {} at invalid position {}",
                combination_id, removed_position
            );
            return Ok(0);
        }

        if self
            .colors
            .exists_by_combination_id_and_position(combination_id, removed_position)?
        {
            debug!(
                "Position {} in combination {} is occupied, nothing to close",
                removed_position, combination_id
            );
            return Ok(0);
        }

        let trailing = self
            .colors
            .find_by_combination_id_and_position_greater_than_order_by_position(
                combination_id,
                removed_position,
            )?;

        let updates: Vec<(ColorId, u32)> = trailing
            .iter()
            .filter_map(|color| {
                let id = color.id?;
                debug!(
                    "Moving color {} from position {} to {}",
                    id,
                    color.position,
                    color.position - 1
                );
                Some((id, color.position - 1))
            })
            .collect();

        self.colors.update_positions(&updates)?;

        info!(
            "Reordered {} colors in combination {} after removal at position {}",
            updates.len(),
            combination_id,
            removed_position
        );
        Ok(updates.len())
    }

    /// `max(position) + 1`, or 1 for a combination without colors.
    ///
    /// Gaps are not filled: positions `{1, 3}` yield 4.
    pub fn next_available_position(&self, combination_id: Option<CombinationId>) -> Result<u32> {
        let combination_id = require_combination_id(combination_id)?;
        let max = self
            .colors
            .find_max_position_by_combination_id(combination_id)?;
        Ok(max.map_or(1, |max| max + 1))
    }

    /// True iff the positions, once sorted, read exactly `1..=N`.
    pub fn validate_sequential(&self, colors: &[ColorInCombination]) -> bool {
        let mut positions: Vec<u32> = colors.iter().map(|c| c.position).collect();
        positions.sort_unstable();

        for (index, position) in positions.iter().enumerate() {
            let expected = index as u32 + 1;
            if *position != expected {
                warn!(
                    "Position sequence broken: expected {} but found {}",
                    expected, position
                );
                return false;
            }
        }
        true
    }

    /// Renumber a combination's colors to `1..=N` in their current order.
    ///
    /// Only colors whose position differs are written. Returns the number of
    /// rewritten colors.
    pub fn fix_sequential(&self, combination_id: Option<CombinationId>) -> Result<usize> {
        let combination_id = require_combination_id(combination_id)?;
        let colors = self
            .colors
            .find_by_combination_id_order_by_position(combination_id)?;

        let updates: Vec<(ColorId, u32)> = colors
            .iter()
            .enumerate()
            .filter_map(|(index, color)| {
                let expected = index as u32 + 1;
                if color.position == expected {
                    return None;
                }
                let id = color.id?;
                debug!(
                    "Fixing color {} position {} -> {}",
                    id, color.position, expected
                );
                Some((id, expected))
            })
            .collect();

        if updates.is_empty() {
            return Ok(0);
        }

        self.colors.update_positions(&updates)?;
        info!(
            "Fixed {} positions in combination {}",
            updates.len(),
            combination_id
        );
        Ok(updates.len())
    }

    /// True iff no color of the combination sits at `position`.
    ///
    /// Missing arguments and positions below 1 are simply unavailable.
    pub fn is_position_available(
        &self,
        combination_id: Option<CombinationId>,
        position: Option<u32>,
    ) -> Result<bool> {
        match (combination_id, position) {
            (Some(combination_id), Some(position)) if position >= 1 => Ok(!self
                .colors
                .exists_by_combination_id_and_position(combination_id, position)?),
            _ => Ok(false),
        }
    }

    /// Occupied positions in ascending order.
    pub fn used_positions(&self, combination_id: Option<CombinationId>) -> Result<Vec<u32>> {
        let combination_id = require_combination_id(combination_id)?;
        Ok(self
            .colors
            .find_by_combination_id_order_by_position(combination_id)?
            .into_iter()
            .map(|c| c.position)
            .collect())
    }
}

fn require_combination_id(combination_id: Option<CombinationId>) -> Result<CombinationId> {
    combination_id.ok_or_else(|| {
        KolorsError::invalid_argument("combination_id", "Combination ID cannot be null")
    })
}
