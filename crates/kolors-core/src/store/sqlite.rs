//! SQLite-backed store for combinations, their colors and the legacy color table.

use super::traits::{ColorStore, CombinationStore, LegacyStore};
use crate::config::StoreConfig;
use crate::error::{KolorsError, Result};
use crate::models::{ColorCombination, ColorId, ColorInCombination, CombinationId, LegacyColor};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::debug;

/// SQLite store implementing every storage trait over one database.
///
/// Thread-safe via an internal mutex on the connection; each multi-row write
/// runs in its own transaction.
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open the store at a specific path.
    ///
    /// Creates the database and parent directories if they don't exist.
    pub fn open_at(db_path: &Path) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|e| KolorsError::io_with_path(e, parent))?;
            }
        }

        let conn = Connection::open(db_path)?;
        conn.execute_batch(&format!(
            "PRAGMA journal_mode=WAL;\n\
             PRAGMA busy_timeout={};\n\
             PRAGMA synchronous=NORMAL;",
            StoreConfig::BUSY_TIMEOUT_MS,
        ))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database.
    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Self::ensure_schema(&conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn ensure_schema(conn: &Connection) -> Result<()> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS legacy_colors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT,
                hex TEXT
            );

            CREATE TABLE IF NOT EXISTS color_combinations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                color_count INTEGER NOT NULL,
                created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS colors_in_combination (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                combination_id INTEGER NOT NULL
                    REFERENCES color_combinations(id) ON DELETE CASCADE,
                hex_value TEXT NOT NULL,
                position INTEGER NOT NULL,
                UNIQUE (combination_id, position)
            );

            CREATE INDEX IF NOT EXISTS idx_colors_combination_position
                ON colors_in_combination(combination_id, position);

            CREATE INDEX IF NOT EXISTS idx_combinations_color_count
                ON color_combinations(color_count);",
        )?;
        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| KolorsError::Database {
            message: "Failed to acquire store connection lock".to_string(),
            source: None,
        })
    }

    // ========================================
    // Legacy table maintenance
    // ========================================

    /// Insert a legacy row. Used to seed data and by tests.
    pub fn insert_legacy(&self, name: Option<&str>, hex: Option<&str>) -> Result<LegacyColor> {
        let conn = self.lock_conn()?;
        conn.execute(
            "INSERT INTO legacy_colors (name, hex) VALUES (?1, ?2)",
            params![name, hex],
        )?;
        let id = conn.last_insert_rowid();
        debug!("Inserted legacy color {}", id);
        Ok(LegacyColor::new(id, name, hex))
    }

    /// Remove every legacy row, returning how many were deleted.
    pub fn delete_all_legacy(&self) -> Result<usize> {
        let conn = self.lock_conn()?;
        Ok(conn.execute("DELETE FROM legacy_colors", [])?)
    }
}

// ========================================
// Row mapping helpers
// ========================================

fn count_to_u64(n: i64) -> u64 {
    u64::try_from(n).unwrap_or(0)
}

fn color_from_row(row: &Row<'_>) -> rusqlite::Result<ColorInCombination> {
    Ok(ColorInCombination {
        id: Some(ColorId(row.get(0)?)),
        combination_id: Some(CombinationId(row.get(1)?)),
        hex_value: row.get(2)?,
        position: row.get(3)?,
    })
}

fn combination_from_row(row: &Row<'_>) -> rusqlite::Result<ColorCombination> {
    let created_at: String = row.get(3)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e)))?;

    Ok(ColorCombination {
        id: Some(CombinationId(row.get(0)?)),
        name: row.get(1)?,
        color_count: row.get(2)?,
        created_at,
        colors: Vec::new(),
    })
}

fn load_colors(conn: &Connection, combination_id: CombinationId) -> Result<Vec<ColorInCombination>> {
    let mut stmt = conn.prepare(
        "SELECT id, combination_id, hex_value, position
         FROM colors_in_combination
         WHERE combination_id = ?1
         ORDER BY position",
    )?;
    let rows = stmt.query_map(params![combination_id.0], color_from_row)?;

    let mut colors = Vec::new();
    for row in rows {
        colors.push(row?);
    }
    Ok(colors)
}

fn load_combination(conn: &Connection, id: CombinationId) -> Result<Option<ColorCombination>> {
    let combination = conn
        .query_row(
            "SELECT id, name, color_count, created_at FROM color_combinations WHERE id = ?1",
            params![id.0],
            combination_from_row,
        )
        .optional()?;

    match combination {
        Some(mut combination) => {
            combination.colors = load_colors(conn, id)?;
            Ok(Some(combination))
        }
        None => Ok(None),
    }
}

// ========================================
// CombinationStore
// ========================================

impl CombinationStore for SqliteStore {
    fn find_all_combinations(&self) -> Result<Vec<ColorCombination>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, color_count, created_at FROM color_combinations ORDER BY id",
        )?;
        let rows = stmt.query_map([], combination_from_row)?;

        let mut combinations = Vec::new();
        for row in rows {
            combinations.push(row?);
        }
        for combination in &mut combinations {
            if let Some(id) = combination.id {
                combination.colors = load_colors(&conn, id)?;
            }
        }
        Ok(combinations)
    }

    fn find_combination_by_id(&self, id: CombinationId) -> Result<Option<ColorCombination>> {
        let conn = self.lock_conn()?;
        load_combination(&conn, id)
    }

    fn save_combination(&self, combination: &ColorCombination) -> Result<ColorCombination> {
        let mut conn = self.lock_conn()?;

        if let Some(id) = combination.id {
            let rows = conn.execute(
                "UPDATE color_combinations SET name = ?1, color_count = ?2 WHERE id = ?3",
                params![combination.name, combination.color_count, id.0],
            )?;
            if rows == 0 {
                return Err(KolorsError::CombinationNotFound { id: id.0 });
            }
            debug!("Updated combination {}", id);
            return load_combination(&conn, id)?
                .ok_or(KolorsError::CombinationNotFound { id: id.0 });
        }

        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO color_combinations (name, color_count, created_at) VALUES (?1, ?2, ?3)",
            params![
                combination.name,
                combination.color_count,
                combination.created_at.to_rfc3339()
            ],
        )?;
        let id = CombinationId(tx.last_insert_rowid());

        for color in &combination.colors {
            tx.execute(
                "INSERT INTO colors_in_combination (combination_id, hex_value, position)
                 VALUES (?1, ?2, ?3)",
                params![id.0, color.hex_value, color.position],
            )?;
        }

        let saved = load_combination(&tx, id)?.ok_or(KolorsError::CombinationNotFound { id: id.0 })?;
        tx.commit()?;

        debug!(
            "Inserted combination {} '{}' with {} colors",
            id,
            saved.name,
            saved.colors.len()
        );
        Ok(saved)
    }

    fn delete_combination_by_id(&self, id: CombinationId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let rows = conn.execute("DELETE FROM color_combinations WHERE id = ?1", params![id.0])?;
        if rows > 0 {
            debug!("Deleted combination {}", id);
        }
        Ok(rows > 0)
    }

    fn combination_exists(&self, id: CombinationId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM color_combinations WHERE id = ?1)",
            params![id.0],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    fn find_single_color_combination(
        &self,
        name: &str,
        hex_value: &str,
    ) -> Result<Option<ColorCombination>> {
        let conn = self.lock_conn()?;
        let id: Option<i64> = conn
            .query_row(
                "SELECT c.id
                 FROM color_combinations c
                 JOIN colors_in_combination col ON col.combination_id = c.id
                 WHERE c.name = ?1 AND c.color_count = 1
                 GROUP BY c.id
                 HAVING COUNT(col.id) = 1 AND MAX(col.hex_value) = ?2
                 ORDER BY c.id
                 LIMIT 1",
                params![name, hex_value],
                |row| row.get(0),
            )
            .optional()?;

        match id {
            Some(id) => load_combination(&conn, CombinationId(id)),
            None => Ok(None),
        }
    }

    fn count_combinations(&self) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM color_combinations", [], |row| row.get(0))?;
        Ok(count_to_u64(count))
    }

    fn count_combinations_by_color_count(&self, color_count: u32) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM color_combinations WHERE color_count = ?1",
            params![color_count],
            |row| row.get(0),
        )?;
        Ok(count_to_u64(count))
    }
}

// ========================================
// ColorStore
// ========================================

impl ColorStore for SqliteStore {
    fn find_by_combination_id_order_by_position(
        &self,
        combination_id: CombinationId,
    ) -> Result<Vec<ColorInCombination>> {
        let conn = self.lock_conn()?;
        load_colors(&conn, combination_id)
    }

    fn find_by_combination_id_and_position_greater_than_order_by_position(
        &self,
        combination_id: CombinationId,
        position: u32,
    ) -> Result<Vec<ColorInCombination>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, combination_id, hex_value, position
             FROM colors_in_combination
             WHERE combination_id = ?1 AND position > ?2
             ORDER BY position",
        )?;
        let rows = stmt.query_map(params![combination_id.0, position], color_from_row)?;

        let mut colors = Vec::new();
        for row in rows {
            colors.push(row?);
        }
        Ok(colors)
    }

    fn find_max_position_by_combination_id(
        &self,
        combination_id: CombinationId,
    ) -> Result<Option<u32>> {
        let conn = self.lock_conn()?;
        let max: Option<u32> = conn.query_row(
            "SELECT MAX(position) FROM colors_in_combination WHERE combination_id = ?1",
            params![combination_id.0],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    fn exists_by_combination_id_and_position(
        &self,
        combination_id: CombinationId,
        position: u32,
    ) -> Result<bool> {
        let conn = self.lock_conn()?;
        let exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM colors_in_combination WHERE combination_id = ?1 AND position = ?2
             )",
            params![combination_id.0, position],
            |row| row.get(0),
        )?;
        Ok(exists != 0)
    }

    fn save_color(&self, color: &ColorInCombination) -> Result<ColorInCombination> {
        let combination_id = color.combination_id.ok_or_else(|| {
            KolorsError::invalid_argument("combination_id", "color is not attached to a combination")
        })?;
        let conn = self.lock_conn()?;

        match color.id {
            Some(id) => {
                conn.execute(
                    "UPDATE colors_in_combination SET hex_value = ?1, position = ?2 WHERE id = ?3",
                    params![color.hex_value, color.position, id.0],
                )?;
                Ok(color.clone())
            }
            None => {
                conn.execute(
                    "INSERT INTO colors_in_combination (combination_id, hex_value, position)
                     VALUES (?1, ?2, ?3)",
                    params![combination_id.0, color.hex_value, color.position],
                )?;
                let mut saved = color.clone();
                saved.id = Some(ColorId(conn.last_insert_rowid()));
                Ok(saved)
            }
        }
    }

    fn delete_color_by_id(&self, id: ColorId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let rows = conn.execute("DELETE FROM colors_in_combination WHERE id = ?1", params![id.0])?;
        Ok(rows > 0)
    }

    fn update_positions(&self, updates: &[(ColorId, u32)]) -> Result<()> {
        if updates.is_empty() {
            return Ok(());
        }

        let mut conn = self.lock_conn()?;
        let tx = conn.transaction()?;
        // Park every touched row on a negative position first so the unique
        // (combination_id, position) index never sees two rows on one slot.
        for (id, _) in updates {
            tx.execute(
                "UPDATE colors_in_combination SET position = -position WHERE id = ?1",
                params![id.0],
            )?;
        }
        for (id, position) in updates {
            tx.execute(
                "UPDATE colors_in_combination SET position = ?1 WHERE id = ?2",
                params![position, id.0],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn count_colors(&self) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM colors_in_combination", [], |row| row.get(0))?;
        Ok(count_to_u64(count))
    }
}

// ========================================
// LegacyStore
// ========================================

impl LegacyStore for SqliteStore {
    fn find_all_legacy(&self) -> Result<Vec<LegacyColor>> {
        let conn = self.lock_conn()?;
        let mut stmt = conn.prepare("SELECT id, name, hex FROM legacy_colors ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(LegacyColor {
                id: row.get(0)?,
                name: row.get(1)?,
                hex: row.get(2)?,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    fn count_legacy(&self) -> Result<u64> {
        let conn = self.lock_conn()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM legacy_colors", [], |row| row.get(0))?;
        Ok(count_to_u64(count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_store() -> SqliteStore {
        SqliteStore::open_in_memory().unwrap()
    }

    fn saved_combination(store: &SqliteStore, name: &str, hexes: &[&str]) -> ColorCombination {
        let mut combination = ColorCombination::new(name);
        for hex in hexes {
            combination.push_color(*hex);
        }
        store.save_combination(&combination).unwrap()
    }

    #[test]
    fn test_save_combination_inserts_colors() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Primary", &["FF0000", "00FF00", "0000FF"]);

        let id = saved.id.unwrap();
        assert_eq!(saved.color_count, 3);
        assert_eq!(saved.colors.len(), 3);
        assert!(saved.colors.iter().all(|c| c.combination_id == Some(id)));
        assert_eq!(store.count_colors().unwrap(), 3);
    }

    #[test]
    fn test_find_combination_by_id_missing() {
        let store = create_test_store();
        assert!(store.find_combination_by_id(CombinationId(99)).unwrap().is_none());
        assert!(!store.combination_exists(CombinationId(99)).unwrap());
    }

    #[test]
    fn test_update_combination_columns() {
        let store = create_test_store();
        let mut saved = saved_combination(&store, "Before", &["111111", "222222"]);
        saved.name = "After".to_string();

        let updated = store.save_combination(&saved).unwrap();
        assert_eq!(updated.name, "After");
        assert_eq!(updated.colors.len(), 2);
    }

    #[test]
    fn test_update_missing_combination_errors() {
        let store = create_test_store();
        let mut ghost = ColorCombination::new("Ghost");
        ghost.id = Some(CombinationId(7));

        let err = store.save_combination(&ghost).unwrap_err();
        assert!(matches!(err, KolorsError::CombinationNotFound { id: 7 }));
    }

    #[test]
    fn test_delete_combination_cascades_to_colors() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Doomed", &["ABCDEF", "123456"]);

        assert!(store.delete_combination_by_id(saved.id.unwrap()).unwrap());
        assert_eq!(store.count_colors().unwrap(), 0);
        assert!(!store.delete_combination_by_id(saved.id.unwrap()).unwrap());
    }

    #[test]
    fn test_position_queries() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Four", &["000001", "000002", "000003", "000004"]);
        let id = saved.id.unwrap();

        let tail = store
            .find_by_combination_id_and_position_greater_than_order_by_position(id, 2)
            .unwrap();
        let positions: Vec<u32> = tail.iter().map(|c| c.position).collect();
        assert_eq!(positions, vec![3, 4]);

        assert_eq!(store.find_max_position_by_combination_id(id).unwrap(), Some(4));
        assert!(store.exists_by_combination_id_and_position(id, 4).unwrap());
        assert!(!store.exists_by_combination_id_and_position(id, 5).unwrap());
    }

    #[test]
    fn test_max_position_of_empty_combination() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Empty", &[]);
        assert_eq!(
            store.find_max_position_by_combination_id(saved.id.unwrap()).unwrap(),
            None
        );
    }

    #[test]
    fn test_unique_position_is_enforced() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Clash", &["AAAAAA"]);

        let mut duplicate = ColorInCombination::new("BBBBBB", 1);
        duplicate.combination_id = saved.id;
        assert!(store.save_color(&duplicate).is_err());
    }

    #[test]
    fn test_save_color_requires_combination() {
        let store = create_test_store();
        let orphan = ColorInCombination::new("BBBBBB", 1);
        let err = store.save_color(&orphan).unwrap_err();
        assert!(matches!(err, KolorsError::InvalidArgument { .. }));
    }

    #[test]
    fn test_update_positions_swaps_without_conflict() {
        let store = create_test_store();
        let saved = saved_combination(&store, "Swap", &["AAAAAA", "BBBBBB"]);
        let a = saved.colors[0].id.unwrap();
        let b = saved.colors[1].id.unwrap();

        store.update_positions(&[(a, 2), (b, 1)]).unwrap();

        let colors = store
            .find_by_combination_id_order_by_position(saved.id.unwrap())
            .unwrap();
        assert_eq!(colors[0].hex_value, "BBBBBB");
        assert_eq!(colors[1].hex_value, "AAAAAA");
    }

    #[test]
    fn test_count_by_color_count() {
        let store = create_test_store();
        saved_combination(&store, "Single", &["AAAAAA"]);
        saved_combination(&store, "Pair", &["AAAAAA", "BBBBBB"]);
        saved_combination(&store, "Another single", &["CCCCCC"]);

        assert_eq!(store.count_combinations().unwrap(), 3);
        assert_eq!(store.count_combinations_by_color_count(1).unwrap(), 2);
        assert_eq!(store.count_combinations_by_color_count(2).unwrap(), 1);
    }

    #[test]
    fn test_find_single_color_combination() {
        let store = create_test_store();
        let single = saved_combination(&store, "[Migrated] Red", &["FF0000"]);
        saved_combination(&store, "[Migrated] Pair", &["FF0000", "00FF00"]);

        let found = store
            .find_single_color_combination("[Migrated] Red", "FF0000")
            .unwrap();
        assert_eq!(found.and_then(|c| c.id), single.id);

        assert!(store
            .find_single_color_combination("[Migrated] Red", "00FF00")
            .unwrap()
            .is_none());
        assert!(store
            .find_single_color_combination("[Migrated] Pair", "FF0000")
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_legacy_rows() {
        let store = create_test_store();
        store.insert_legacy(Some("Red"), Some("FF0000")).unwrap();
        store.insert_legacy(None, None).unwrap();

        let rows = store.find_all_legacy().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name.as_deref(), Some("Red"));
        assert!(rows[1].hex.is_none());
        assert_eq!(store.count_legacy().unwrap(), 2);

        assert_eq!(store.delete_all_legacy().unwrap(), 2);
        assert_eq!(store.count_legacy().unwrap(), 0);
    }

    #[test]
    fn test_on_disk_store_persists_between_opens() {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("nested").join("kolors.sqlite");

        {
            let store = SqliteStore::open_at(&db_path).unwrap();
            saved_combination(&store, "Persisted", &["FFFFFF", "000000"]);
        }

        let reopened = SqliteStore::open_at(&db_path).unwrap();
        let all = reopened.find_all_combinations().unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].name, "Persisted");
        assert_eq!(all[0].colors.len(), 2);
    }
}
