//! SQLite-backed watchlist that keeps names and cursors across restarts.
//!
//! The configured watchlist seeds the table on open:
//! - new symbols are inserted without cursors
//! - known symbols keep their stored cursors and fetched names
//! - symbols dropped from the configuration stay in the table but are
//!   hidden until they are configured again

use std::collections::HashSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use rusqlite::{params, Connection};
use tracing::{debug, error, info};

use crate::error::{AppError, Result};
use crate::services::watchlist::WatchlistStore;
use crate::types::WatchlistEntry;

/// Watchlist persisted in a single SQLite table.
pub struct SqliteWatchlist {
    conn: Mutex<Connection>,
}

impl SqliteWatchlist {
    /// Open (or create) the database at `path` and seed it.
    pub fn open<P: AsRef<Path>>(path: P, seed: &[WatchlistEntry]) -> Result<Self> {
        let conn = Connection::open(path.as_ref())?;
        let store = Self::with_connection(conn, seed)?;
        info!("Watchlist database opened at {}", path.as_ref().display());
        Ok(store)
    }

    /// In-memory database, gone when the store is dropped.
    pub fn open_in_memory(seed: &[WatchlistEntry]) -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self::with_connection(conn, seed)?;
        debug!("In-memory watchlist database opened");
        Ok(store)
    }

    fn with_connection(conn: Connection, seed: &[WatchlistEntry]) -> Result<Self> {
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.init_schema()?;
        store.seed(seed)?;
        Ok(store)
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Internal("watchlist database lock poisoned".to_string()))
    }

    fn init_schema(&self) -> Result<()> {
        self.conn()?.execute(
            "CREATE TABLE IF NOT EXISTS watchlist (
                symbol TEXT PRIMARY KEY,
                name TEXT,
                last_revenue_period TEXT,
                last_financial_quarter TEXT,
                position INTEGER
            )",
            [],
        )?;
        Ok(())
    }

    /// Make `seed` the visible watchlist, in order; later duplicates are ignored.
    fn seed(&self, seed: &[WatchlistEntry]) -> Result<()> {
        let mut conn = self.conn()?;
        let tx = conn.transaction()?;
        tx.execute("UPDATE watchlist SET position = NULL", [])?;

        let mut seen = HashSet::new();
        for entry in seed {
            if !seen.insert(entry.symbol.as_str()) {
                debug!("Skipping duplicate watchlist symbol {}", entry.symbol);
                continue;
            }
            tx.execute(
                "INSERT INTO watchlist (symbol, name, position) VALUES (?1, ?2, ?3)
                 ON CONFLICT(symbol) DO UPDATE SET
                    position = excluded.position,
                    name = COALESCE(excluded.name, watchlist.name)",
                params![entry.symbol, entry.name, seen.len() as i64 - 1],
            )?;
        }

        tx.commit()?;
        debug!("Watchlist seeded with {} symbols", seen.len());
        Ok(())
    }

    fn load(&self) -> Result<Vec<WatchlistEntry>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT symbol, name, last_revenue_period, last_financial_quarter
             FROM watchlist WHERE position IS NOT NULL ORDER BY position",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(WatchlistEntry {
                symbol: row.get(0)?,
                name: row.get(1)?,
                last_revenue_period: row.get(2)?,
                last_financial_quarter: row.get(3)?,
            })
        })?;
        let entries = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn update(&self, sql: &str, symbol: &str, value: &str) -> Result<()> {
        let changed = self.conn()?.execute(sql, params![symbol, value])?;
        if changed == 0 {
            return Err(AppError::NotFound(format!("Symbol {} is not on the watchlist", symbol)));
        }
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for SqliteWatchlist {
    async fn entries(&self) -> Vec<WatchlistEntry> {
        self.load().unwrap_or_else(|e| {
            error!("Failed to load watchlist: {}", e);
            Vec::new()
        })
    }

    async fn set_name(&self, symbol: &str, name: &str) -> Result<()> {
        self.update(
            "UPDATE watchlist SET name = ?2 WHERE symbol = ?1 AND position IS NOT NULL",
            symbol,
            name,
        )
    }

    async fn set_revenue_period(&self, symbol: &str, period: &str) -> Result<()> {
        self.update(
            "UPDATE watchlist SET last_revenue_period = ?2 WHERE symbol = ?1 AND position IS NOT NULL",
            symbol,
            period,
        )
    }

    async fn set_financial_quarter(&self, symbol: &str, quarter: &str) -> Result<()> {
        self.update(
            "UPDATE watchlist SET last_financial_quarter = ?2 WHERE symbol = ?1 AND position IS NOT NULL",
            symbol,
            quarter,
        )
    }
}
