use serde::{Deserialize, Serialize};

/// How many combinations exist, broken down by declared color count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CombinationStatistics {
    pub total_combinations: u64,
    /// Single-color combinations, which is what migrated legacy rows become.
    pub single_color_combinations: u64,
    pub combinations_with_2_colors: u64,
    pub combinations_with_3_colors: u64,
    pub combinations_with_4_colors: u64,
}
