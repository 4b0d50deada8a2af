/**
 * Watchlist Service
 *
 * Holds the watched symbols with their display names and the revenue and
 * financial cursors that gate fundamental reports.
 *
 * Storage:
 * - DashMap: in-memory entries keyed by symbol
 * - Vec: watchlist order, fixed at construction
 *
 * The in-memory store forgets cursors on restart; the binary uses
 * `SqliteWatchlist` instead.
 */

use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use crate::error::{AppError, Result};
use crate::types::WatchlistEntry;

/// Persistence seam for the watchlist and its cursors.
#[async_trait]
pub trait WatchlistStore: Send + Sync {
    /// All entries in watchlist order.
    async fn entries(&self) -> Vec<WatchlistEntry>;

    async fn set_name(&self, symbol: &str, name: &str) -> Result<()>;

    /// Record the last reported revenue month (`YYYY-MM`).
    async fn set_revenue_period(&self, symbol: &str, period: &str) -> Result<()>;

    /// Record the last reported financial quarter (`YYYY-Qn`).
    async fn set_financial_quarter(&self, symbol: &str, quarter: &str) -> Result<()>;
}

/// In-memory watchlist seeded from configuration.
#[derive(Clone)]
pub struct MemoryWatchlist {
    entries: Arc<DashMap<String, WatchlistEntry>>,
    order: Arc<Vec<String>>,
}

impl MemoryWatchlist {
    /// Create a watchlist; later duplicates of a symbol are ignored.
    pub fn new(seed: Vec<WatchlistEntry>) -> Self {
        let entries = DashMap::new();
        let mut order = Vec::with_capacity(seed.len());

        for entry in seed {
            if entries.contains_key(&entry.symbol) {
                debug!("Skipping duplicate watchlist symbol {}", entry.symbol);
                continue;
            }
            order.push(entry.symbol.clone());
            entries.insert(entry.symbol.clone(), entry);
        }

        Self {
            entries: Arc::new(entries),
            order: Arc::new(order),
        }
    }

    fn update(&self, symbol: &str, apply: impl FnOnce(&mut WatchlistEntry)) -> Result<()> {
        let mut entry = self
            .entries
            .get_mut(symbol)
            .ok_or_else(|| AppError::NotFound(format!("Symbol {} is not on the watchlist", symbol)))?;
        apply(&mut entry);
        Ok(())
    }
}

#[async_trait]
impl WatchlistStore for MemoryWatchlist {
    async fn entries(&self) -> Vec<WatchlistEntry> {
        self.order
            .iter()
            .filter_map(|symbol| self.entries.get(symbol).map(|e| e.clone()))
            .collect()
    }

    async fn set_name(&self, symbol: &str, name: &str) -> Result<()> {
        self.update(symbol, |e| e.name = Some(name.to_string()))
    }

    async fn set_revenue_period(&self, symbol: &str, period: &str) -> Result<()> {
        self.update(symbol, |e| e.last_revenue_period = Some(period.to_string()))
    }

    async fn set_financial_quarter(&self, symbol: &str, quarter: &str) -> Result<()> {
        self.update(symbol, |e| e.last_financial_quarter = Some(quarter.to_string()))
    }
}
