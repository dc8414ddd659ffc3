//! Per-combination integrity rules checked after a migration.

use crate::config::ColorConfig;
use crate::models::{is_valid_hex, ColorCombination};

/// Why a stored combination is not well formed, or `Ok` when it is.
///
/// Colors are expected in position order, as the store returns them.
pub(crate) fn check_combination(combination: &ColorCombination) -> Result<(), String> {
    let name = combination.name.trim();
    if name.is_empty() {
        return Err("name is empty".to_string());
    }
    if name.chars().count() < ColorConfig::MIN_NAME_LENGTH {
        return Err(format!(
            "name too short (< {} characters)",
            ColorConfig::MIN_NAME_LENGTH
        ));
    }

    if combination.colors.is_empty() {
        return Err("has no colors".to_string());
    }
    if combination.color_count as usize != combination.colors.len() {
        return Err(format!(
            "color count mismatch: expected {}, found {}",
            combination.color_count,
            combination.colors.len()
        ));
    }

    for (index, color) in combination.colors.iter().enumerate() {
        let expected = index as u32 + 1;
        if !is_valid_hex(&color.hex_value) {
            return Err(format!(
                "invalid hex value at position {}: '{}'",
                expected, color.hex_value
            ));
        }
        if color.position != expected {
            return Err(format!(
                "invalid position at index {}: expected {}, found {}",
                index, expected, color.position
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ColorInCombination;

    fn combination(name: &str, colors: &[(&str, u32)]) -> ColorCombination {
        let mut combination = ColorCombination::new(name);
        for (hex, position) in colors {
            combination.colors.push(ColorInCombination::new(*hex, *position));
        }
        combination.color_count = colors.len() as u32;
        combination
    }

    #[test]
    fn test_well_formed_combination_passes() {
        let ok = combination("Sunset", &[("FF4500", 1), ("FFD700", 2)]);
        assert_eq!(check_combination(&ok), Ok(()));
    }

    #[test]
    fn test_each_rule_reports() {
        let short = combination("Ab", &[("FF4500", 1)]);
        assert!(check_combination(&short).unwrap_err().contains("name too short"));

        let empty = combination("Empty", &[]);
        assert_eq!(check_combination(&empty).unwrap_err(), "has no colors");

        let mut miscounted = combination("Miscounted", &[("FF4500", 1)]);
        miscounted.color_count = 2;
        assert!(check_combination(&miscounted)
            .unwrap_err()
            .contains("expected 2, found 1"));

        let bad_hex = combination("Bad hex", &[("FF4500", 1), ("XYZ", 2)]);
        assert!(check_combination(&bad_hex)
            .unwrap_err()
            .contains("invalid hex value at position 2"));

        let gappy = combination("Gappy", &[("FF4500", 1), ("FFD700", 3)]);
        assert!(check_combination(&gappy)
            .unwrap_err()
            .contains("expected 2, found 3"));
    }
}
