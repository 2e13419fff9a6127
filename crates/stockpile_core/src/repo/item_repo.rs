//! Catalog cache store over SQLite.
//!
//! # Responsibility
//! - Provide scoped atomic writes (clear/upsert) and cursor-based paged
//!   reads ordered by item id.
//! - Guard against connections whose schema is missing or stale.
//!
//! # Invariants
//! - `run_atomic` commits everything or nothing; an error inside the block
//!   rolls the whole transaction back.
//! - `version()` increases only on a committed write, never on rollback.
//! - The connection mutex is the sole serialization point for concurrent
//!   load directions.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::item::{CatalogItem, ItemId, ItemValidationError};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

const ITEM_SELECT_SQL: &str = "SELECT id, name, summary, image_url FROM catalog_items";

pub type StoreResult<T> = Result<T, StoreError>;

/// Cache store error taxonomy for commit and read operations.
#[derive(Debug)]
pub enum StoreError {
    Validation(ItemValidationError),
    Db(DbError),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    ConnectionPoisoned,
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "cache connection has schema version {actual_version}, expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "cache connection is missing required table `{table}`")
            }
            Self::ConnectionPoisoned => {
                write!(f, "cache connection mutex was poisoned by a panicking writer")
            }
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ItemValidationError> for StoreError {
    fn from(value: ItemValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Write half of the store, only reachable inside [`CacheStore::run_atomic`].
pub trait CacheWriter {
    /// Removes every cached item. Returns the number of rows removed.
    fn clear_all(&mut self) -> StoreResult<usize>;
    /// Inserts or replaces items by id. Returns the number of rows written.
    fn upsert_all(&mut self, items: &[CatalogItem]) -> StoreResult<usize>;
}

/// Cache store consumed by the load coordinator and the paged reader.
pub trait CacheStore {
    /// Runs `block` inside one scoped transaction; commit on `Ok`, full
    /// rollback on `Err`.
    fn run_atomic<T>(
        &self,
        block: impl FnOnce(&mut dyn CacheWriter) -> StoreResult<T>,
    ) -> StoreResult<T>;

    /// Highest-id cached item, the append cursor anchor.
    fn last_item(&self) -> StoreResult<Option<CatalogItem>>;

    /// Up to `limit` items with id strictly greater than `after`, ascending.
    /// `None` starts from the beginning.
    fn items_after(&self, after: Option<ItemId>, limit: u32) -> StoreResult<Vec<CatalogItem>>;

    /// Up to `limit` items with id strictly less than `before`, returned
    /// ascending (the window immediately preceding `before`).
    fn items_before(&self, before: ItemId, limit: u32) -> StoreResult<Vec<CatalogItem>>;

    /// Monotonic counter bumped on every committed write. Readers compare it
    /// to detect that their current window is stale.
    fn version(&self) -> u64;
}

/// SQLite-backed cache store owning its connection.
pub struct SqliteCatalogStore {
    conn: Mutex<Connection>,
    commits: AtomicU64,
}

impl SqliteCatalogStore {
    /// Wraps a migrated connection, rejecting handles whose schema is not
    /// ready for cache traffic.
    pub fn try_new(conn: Connection) -> StoreResult<Self> {
        let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
        let expected_version = latest_version();
        if actual_version != expected_version {
            return Err(StoreError::UninitializedConnection {
                expected_version,
                actual_version,
            });
        }

        let table_exists: i64 = conn.query_row(
            "SELECT EXISTS(
                SELECT 1 FROM sqlite_master
                WHERE type = 'table' AND name = 'catalog_items'
            );",
            [],
            |row| row.get(0),
        )?;
        if table_exists == 0 {
            return Err(StoreError::MissingRequiredTable("catalog_items"));
        }

        Ok(Self {
            conn: Mutex::new(conn),
            commits: AtomicU64::new(0),
        })
    }

    fn lock(&self) -> StoreResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::ConnectionPoisoned)
    }
}

struct SqliteCacheWriter<'tx, 'conn> {
    tx: &'tx Transaction<'conn>,
}

impl CacheWriter for SqliteCacheWriter<'_, '_> {
    fn clear_all(&mut self) -> StoreResult<usize> {
        let removed = self.tx.execute("DELETE FROM catalog_items;", [])?;
        Ok(removed)
    }

    fn upsert_all(&mut self, items: &[CatalogItem]) -> StoreResult<usize> {
        let mut stmt = self.tx.prepare(
            "INSERT INTO catalog_items (id, name, summary, image_url)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                summary = excluded.summary,
                image_url = excluded.image_url,
                fetched_at = (strftime('%s', 'now') * 1000);",
        )?;

        for item in items {
            item.validate()?;
            stmt.execute(params![
                item.id,
                item.name.as_str(),
                item.summary.as_str(),
                item.image_url.as_deref(),
            ])?;
        }

        Ok(items.len())
    }
}

impl CacheStore for SqliteCatalogStore {
    fn run_atomic<T>(
        &self,
        block: impl FnOnce(&mut dyn CacheWriter) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let mut writer = SqliteCacheWriter { tx: &tx };

        // An Err return drops the transaction, which rolls everything back.
        let value = block(&mut writer)?;
        drop(writer);
        tx.commit()?;
        self.commits.fetch_add(1, Ordering::Release);
        Ok(value)
    }

    fn last_item(&self) -> StoreResult<Option<CatalogItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!("{ITEM_SELECT_SQL} ORDER BY id DESC LIMIT 1;"))?;
        let mut rows = stmt.query([])?;
        match rows.next()? {
            Some(row) => Ok(Some(parse_item_row(row)?)),
            None => Ok(None),
        }
    }

    fn items_after(&self, after: Option<ItemId>, limit: u32) -> StoreResult<Vec<CatalogItem>> {
        let conn = self.lock()?;
        let mut sql = ITEM_SELECT_SQL.to_string();
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(after) = after {
            sql.push_str(" WHERE id > ?");
            bind_values.push(Value::Integer(after));
        }
        sql.push_str(" ORDER BY id ASC LIMIT ?");
        bind_values.push(Value::Integer(i64::from(limit)));

        let mut stmt = conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        Ok(items)
    }

    fn items_before(&self, before: ItemId, limit: u32) -> StoreResult<Vec<CatalogItem>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{ITEM_SELECT_SQL} WHERE id < ?1 ORDER BY id DESC LIMIT ?2;"
        ))?;
        let mut rows = stmt.query(params![before, i64::from(limit)])?;
        let mut items = Vec::new();
        while let Some(row) = rows.next()? {
            items.push(parse_item_row(row)?);
        }
        items.reverse();
        Ok(items)
    }

    fn version(&self) -> u64 {
        self.commits.load(Ordering::Acquire)
    }
}

fn parse_item_row(row: &Row<'_>) -> StoreResult<CatalogItem> {
    let item = CatalogItem {
        id: row.get("id")?,
        name: row.get("name")?,
        summary: row.get("summary")?,
        image_url: row.get("image_url")?,
    };
    item.validate()?;
    Ok(item)
}

#[cfg(test)]
mod tests {
    use super::{CacheStore, SqliteCatalogStore, StoreError};
    use crate::db::open_db_in_memory;
    use crate::model::item::CatalogItem;

    fn store() -> SqliteCatalogStore {
        let conn = open_db_in_memory().expect("in-memory cache should open");
        SqliteCatalogStore::try_new(conn).expect("migrated connection should be accepted")
    }

    fn item(id: i64) -> CatalogItem {
        CatalogItem::new(id, format!("item {id}"), format!("summary {id}"))
    }

    #[test]
    fn upsert_replaces_existing_row_by_id() {
        let store = store();
        store
            .run_atomic(|cache| cache.upsert_all(&[item(1)]))
            .expect("first upsert should commit");

        let mut replacement = item(1);
        replacement.name = "renamed".to_string();
        store
            .run_atomic(|cache| cache.upsert_all(&[replacement.clone()]))
            .expect("second upsert should commit");

        let all = store.items_after(None, 10).expect("read should succeed");
        assert_eq!(all, vec![replacement]);
    }

    #[test]
    fn version_bumps_on_commit_but_not_on_rollback() {
        let store = store();
        assert_eq!(store.version(), 0);

        store
            .run_atomic(|cache| cache.upsert_all(&[item(1)]))
            .expect("commit should succeed");
        assert_eq!(store.version(), 1);

        let failed = store.run_atomic(|cache| {
            cache.clear_all()?;
            cache.upsert_all(&[item(0)])
        });
        assert!(matches!(failed, Err(StoreError::Validation(_))));
        assert_eq!(store.version(), 1);
        assert_eq!(
            store.items_after(None, 10).expect("read should succeed"),
            vec![item(1)]
        );
    }

    #[test]
    fn last_item_returns_highest_id() {
        let store = store();
        store
            .run_atomic(|cache| cache.upsert_all(&[item(5), item(2), item(9)]))
            .expect("upsert should commit");

        let last = store.last_item().expect("read should succeed");
        assert_eq!(last.map(|found| found.id), Some(9));
    }
}
