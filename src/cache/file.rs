//! Durable file-backed cache store
//!
//! Each table is one SQLite database file with a single `cache` table:
//!
//! | column | meaning |
//! |---|---|
//! | `k` | cache key (primary key) |
//! | `addr` | address |
//! | `ttl` | expiry, epoch seconds |
//!
//! Expired records are ignored on read and purged on the next write. The
//! database runs in WAL mode with a busy timeout, so several handles (and
//! several processes) can share one table without losing writes.

use crate::cache::{CacheEntry, CacheStore};
use crate::constants::cache::{BUSY_TIMEOUT_MS, TABLE_FILE_EXT};
use crate::error::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, TransactionBehavior};
use tokio_rusqlite::{params, Connection};

const APP_DIR_NAME: &str = "where-am-i";

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS cache (
        k    TEXT PRIMARY KEY NOT NULL,
        addr TEXT NOT NULL,
        ttl  INTEGER NOT NULL
     );
     CREATE INDEX IF NOT EXISTS cache_ttl ON cache (ttl);";

/// File-backed store for one table
///
/// The database is opened on first use.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    conn: OnceCell<Connection>,
}

fn store_err(context: &str, err: impl std::fmt::Display) -> Error {
    Error::Store(format!("{}: {}", context, err))
}

impl FileStore {
    /// Open the table `table` inside `dir`
    ///
    /// The table identifier becomes the file name, so it is restricted to
    /// ASCII letters, digits, `-`, `_` and `.` (and may not start with `.`).
    pub fn new(dir: impl AsRef<Path>, table: &str) -> Result<Self> {
        validate_table_name(table)?;
        let path = dir
            .as_ref()
            .join(format!("{}.{}", table, TABLE_FILE_EXT));
        Ok(Self {
            path,
            conn: OnceCell::new(),
        })
    }

    /// Open the table `table` in the user cache directory
    ///
    /// Location: ~/.cache/where-am-i/{table}.db
    pub fn in_cache_dir(table: &str) -> Result<Self> {
        let dir = dirs::cache_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine cache directory".to_string()))?;
        Self::new(dir, table)
    }

    /// Path of the table file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn conn(&self) -> Result<&Connection> {
        self.conn.get_or_try_init(|| self.open()).await
    }

    async fn open(&self) -> Result<Connection> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                Error::Store(format!("Failed to create {}: {}", parent.display(), e))
            })?;
        }

        let context = format!("Failed to open {}", self.path.display());
        let conn = Connection::open(&self.path)
            .await
            .map_err(|e| store_err(&context, e))?;

        conn.call(|conn| -> rusqlite::Result<()> {
            conn.busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS))?;
            conn.execute_batch(
                "PRAGMA journal_mode=WAL;
                 PRAGMA synchronous=NORMAL;",
            )?;
            conn.execute_batch(SCHEMA)
        })
        .await
        .map_err(|e| store_err(&context, e))?;

        Ok(conn)
    }

    /// Number of unexpired records
    pub async fn len(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        let count = self
            .conn()
            .await?
            .call(move |conn| -> rusqlite::Result<i64> {
                conn.query_row(
                    "SELECT COUNT(*) FROM cache WHERE ttl >= ?1",
                    params![now],
                    |row| row.get(0),
                )
            })
            .await
            .map_err(|e| store_err("Failed to count cache records", e))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Whether the table holds no unexpired records
    pub async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Drop every expired record, returning how many were removed
    pub async fn purge_expired(&self) -> Result<usize> {
        let now = Utc::now().timestamp();
        self.conn()
            .await?
            .call(move |conn| -> rusqlite::Result<usize> {
                conn.execute("DELETE FROM cache WHERE ttl < ?1", params![now])
            })
            .await
            .map_err(|e| store_err("Failed to purge cache", e))
    }

    /// Delete every record in the table
    pub async fn clear(&self) -> Result<()> {
        self.conn()
            .await?
            .call(|conn| -> rusqlite::Result<usize> { conn.execute("DELETE FROM cache", []) })
            .await
            .map_err(|e| store_err("Failed to clear cache", e))?;
        Ok(())
    }
}

fn validate_table_name(table: &str) -> Result<()> {
    let valid = !table.is_empty()
        && !table.starts_with('.')
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'));

    if valid {
        Ok(())
    } else {
        Err(Error::Config(format!("Invalid cache table name: '{}'", table)))
    }
}

impl CacheStore for FileStore {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheEntry>> {
        let key = key.to_string();
        let now = Utc::now().timestamp();

        let row = self
            .conn()
            .await?
            .call(move |conn| -> rusqlite::Result<Option<(String, String, i64)>> {
                conn.query_row(
                    "SELECT k, addr, ttl FROM cache WHERE k = ?1 AND ttl >= ?2",
                    params![key, now],
                    |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
                )
                .optional()
            })
            .await
            .map_err(|e| store_err("Failed to read cache", e))?;

        Ok(row.map(|(key, address, ttl)| CacheEntry {
            key,
            address,
            expires_at: DateTime::from_timestamp(ttl, 0).unwrap_or(DateTime::<Utc>::MIN_UTC),
        }))
    }

    async fn put(&self, key: &str, address: &str, ttl_secs: u64) -> Result<()> {
        let entry = CacheEntry::new(key, address, ttl_secs);
        let now = Utc::now().timestamp();

        self.conn()
            .await?
            .call(move |conn| -> rusqlite::Result<()> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
                tx.execute("DELETE FROM cache WHERE ttl < ?1", params![now])?;
                tx.execute(
                    "INSERT OR REPLACE INTO cache (k, addr, ttl) VALUES (?1, ?2, ?3)",
                    params![entry.key, entry.address, entry.expires_at.timestamp()],
                )?;
                tx.commit()
            })
            .await
            .map_err(|e| store_err("Failed to write cache", e))
    }
}
