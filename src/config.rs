use std::env;
use std::time::Duration;

use crate::types::{MarketIndex, WatchlistEntry};

const DEFAULT_INDICES: &str = "TAIEX:Weighted index,TPEx:OTC index";
const DEFAULT_DATABASE_PATH: &str = "trendwatch.db";

/// LINE push credentials.
#[derive(Debug, Clone)]
pub struct LineConfig {
    /// Channel access token.
    pub access_token: String,
    /// Push target user id.
    pub user_id: String,
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address.
    pub host: String,
    /// Server port.
    pub port: u16,
    /// FinMind API token (optional, anonymous access is rate limited).
    pub finmind_token: Option<String>,
    /// LINE credentials; reports go to the log when unset.
    pub line: Option<LineConfig>,
    /// Gemini key for analyst estimates; skipped when unset.
    pub gemini_api_key: Option<String>,
    /// SQLite file holding names and cursors.
    pub database_path: String,
    /// Seed watchlist.
    pub watchlist: Vec<WatchlistEntry>,
    /// Indices analyzed ahead of the watchlist.
    pub market_indices: Vec<MarketIndex>,
    /// Calendar days of daily prices fetched per symbol.
    pub price_lookback_days: u32,
    /// Symbols analyzed concurrently.
    pub max_concurrency: usize,
    /// Outbound HTTP request timeout.
    pub http_timeout: Duration,
    /// Trigger one run right after startup.
    pub run_on_startup: bool,
}

/// Parse `"2330:TSMC,2317"` into entries; the name part is optional.
pub fn parse_watchlist(value: &str) -> Vec<WatchlistEntry> {
    value
        .split(',')
        .filter_map(|item| {
            let mut parts = item.splitn(2, ':');
            let symbol = parts.next()?.trim();
            if symbol.is_empty() {
                return None;
            }
            let entry = WatchlistEntry::new(symbol);
            Some(match parts.next().map(str::trim).filter(|n| !n.is_empty()) {
                Some(name) => entry.with_name(name),
                None => entry,
            })
        })
        .collect()
}

/// Parse `"TAIEX:Weighted index,TPEx:OTC index"`; the id doubles as name.
pub fn parse_indices(value: &str) -> Vec<MarketIndex> {
    value
        .split(',')
        .filter_map(|item| {
            let mut parts = item.splitn(2, ':');
            let id = parts.next()?.trim();
            if id.is_empty() {
                return None;
            }
            let name = parts
                .next()
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .unwrap_or(id);
            Some(MarketIndex {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let line = match (non_empty("LINE_CHANNEL_ACCESS_TOKEN"), non_empty("LINE_USER_ID")) {
            (Some(access_token), Some(user_id)) => Some(LineConfig {
                access_token,
                user_id,
            }),
            _ => None,
        };

        Self {
            host,
            port,
            finmind_token: non_empty("FINMIND_API_TOKEN"),
            line,
            gemini_api_key: non_empty("GEMINI_API_KEY"),
            database_path: non_empty("DATABASE_PATH").unwrap_or_else(|| DEFAULT_DATABASE_PATH.to_string()),
            watchlist: env::var("WATCHLIST")
                .ok()
                .map(|s| parse_watchlist(&s))
                .unwrap_or_default(),
            market_indices: parse_indices(
                &env::var("MARKET_INDICES").unwrap_or_else(|_| DEFAULT_INDICES.to_string()),
            ),
            price_lookback_days: env::var("PRICE_LOOKBACK_DAYS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(180),
            max_concurrency: env::var("MAX_CONCURRENCY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&n: &usize| n > 0)
                .unwrap_or(4),
            http_timeout: Duration::from_secs(
                env::var("HTTP_TIMEOUT_SECS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(30),
            ),
            run_on_startup: env::var("RUN_ON_STARTUP")
                .ok()
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
        }
    }
}
