use serde::{Deserialize, Serialize};

/// A watched symbol and its processing cursors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchlistEntry {
    pub symbol: String,
    pub name: Option<String>,
    /// Last reported revenue month, `YYYY-MM`.
    pub last_revenue_period: Option<String>,
    /// Last reported financial quarter, `YYYY-Qn`.
    pub last_financial_quarter: Option<String>,
}

impl WatchlistEntry {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            name: None,
            last_revenue_period: None,
            last_financial_quarter: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `"2330 TSMC"`, or just the symbol when the name is unknown.
    pub fn title(&self) -> String {
        match &self.name {
            Some(name) if !name.is_empty() => format!("{} {}", self.symbol, name),
            _ => self.symbol.clone(),
        }
    }
}

/// Market index analyzed ahead of the watchlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketIndex {
    pub id: String,
    pub name: String,
}

/// Outcome of one analysis run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub indices: usize,
    pub analyzed: usize,
    pub revenue_updates: usize,
    pub financial_updates: usize,
    pub failures: Vec<String>,
    pub delivered: bool,
}
