//! Persistence for combinations, positioned colors and legacy rows.
//!
//! The engines depend only on the traits; `SqliteStore` is the shipped
//! implementation.

mod sqlite;
mod traits;

pub use sqlite::SqliteStore;
pub use traits::{ColorStore, CombinationStore, LegacyStore};
