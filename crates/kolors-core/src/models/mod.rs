//! Data models for color combinations and the legacy color table.

mod combination;
mod hex;
mod legacy;

pub use combination::{ColorCombination, ColorId, ColorInCombination, CombinationId};
pub use hex::{is_valid_hex, normalize_hex};
pub use legacy::LegacyColor;
