use serde::{Deserialize, Serialize};

/// A row of the pre-migration flat color table: one name, one hex value.
///
/// Both columns were nullable in the legacy schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyColor {
    pub id: i64,
    pub name: Option<String>,
    pub hex: Option<String>,
}

impl LegacyColor {
    pub fn new(id: i64, name: Option<&str>, hex: Option<&str>) -> Self {
        Self {
            id,
            name: name.map(str::to_string),
            hex: hex.map(str::to_string),
        }
    }
}
