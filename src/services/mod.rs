pub mod fundamentals;
pub mod notifier;
pub mod report;
pub mod runner;
pub mod signals;
pub mod sqlite_watchlist;
pub mod watchlist;

pub use notifier::{LineNotifier, LogNotifier, Notifier};
pub use runner::AnalysisRunner;
pub use sqlite_watchlist::SqliteWatchlist;
pub use watchlist::{MemoryWatchlist, WatchlistStore};
