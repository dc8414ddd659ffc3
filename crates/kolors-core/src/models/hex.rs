//! Hex color parsing.

use crate::config::ColorConfig;
use crate::error::{KolorsError, Result};
use regex::Regex;
use std::sync::LazyLock;

static HEX_COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^[0-9A-Fa-f]{{{}}}$", ColorConfig::HEX_LENGTH))
        .expect("hex color regex must compile")
});

/// Returns true for exactly `ColorConfig::HEX_LENGTH` hexadecimal digits,
/// without a leading `#`.
pub fn is_valid_hex(value: &str) -> bool {
    HEX_COLOR_RE.is_match(value)
}

/// Validate a hex color and return it uppercased.
pub fn normalize_hex(value: &str) -> Result<String> {
    let trimmed = value.trim();
    if !is_valid_hex(trimmed) {
        return Err(KolorsError::InvalidHexColor {
            value: value.to_string(),
        });
    }
    Ok(trimmed.to_ascii_uppercase())
}
