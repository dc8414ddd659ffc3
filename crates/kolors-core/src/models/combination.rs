//! Color combinations and the positioned colors they own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Store-assigned identifier of a color combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CombinationId(pub i64);

impl fmt::Display for CombinationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Store-assigned identifier of a single color row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColorId(pub i64);

impl fmt::Display for ColorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A color placed at a 1-based position inside one combination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorInCombination {
    /// `None` until the row has been persisted.
    pub id: Option<ColorId>,
    /// Owning combination. `None` while the color is attached to an unsaved combination.
    pub combination_id: Option<CombinationId>,
    /// Six uppercase hex digits, no leading `#`.
    pub hex_value: String,
    pub position: u32,
}

impl ColorInCombination {
    pub fn new(hex_value: impl Into<String>, position: u32) -> Self {
        Self {
            id: None,
            combination_id: None,
            hex_value: hex_value.into(),
            position,
        }
    }

    /// The hex value with a leading `#`, as shown to users.
    pub fn formatted_hex(&self) -> String {
        format!("#{}", self.hex_value)
    }
}

/// A named, ordered set of colors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorCombination {
    pub id: Option<CombinationId>,
    pub name: String,
    /// Declared number of colors; kept equal to `colors.len()` by every mutation.
    pub color_count: u32,
    pub created_at: DateTime<Utc>,
    /// Colors ordered by position.
    pub colors: Vec<ColorInCombination>,
}

impl ColorCombination {
    /// Create an unsaved combination with no colors.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            color_count: 0,
            created_at: Utc::now(),
            colors: Vec::new(),
        }
    }

    /// Append a color after the current highest position.
    pub fn push_color(&mut self, hex_value: impl Into<String>) -> &ColorInCombination {
        let position = self.next_available_position();
        let mut color = ColorInCombination::new(hex_value, position);
        color.combination_id = self.id;
        self.colors.push(color);
        self.color_count = self.colors.len() as u32;
        &self.colors[self.colors.len() - 1]
    }

    /// `max(position) + 1`, or 1 when the combination has no colors.
    pub fn next_available_position(&self) -> u32 {
        self.colors
            .iter()
            .map(|c| c.position)
            .max()
            .map_or(1, |max| max + 1)
    }

    /// Hex values in position order.
    pub fn hex_values(&self) -> Vec<&str> {
        let mut sorted: Vec<&ColorInCombination> = self.colors.iter().collect();
        sorted.sort_by_key(|c| c.position);
        sorted.into_iter().map(|c| c.hex_value.as_str()).collect()
    }
}
