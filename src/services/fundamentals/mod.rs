//! Fundamental analysis: monthly revenue, quarterly statements and
//! shareholder distribution.
//!
//! Revenue and statement analyzers are gated by a per-symbol cursor and only
//! report periods that have not been reported before.

pub mod chips;
pub mod financials;
pub mod revenue;

pub use chips::analyze_shareholders;
pub use financials::{analyze_financials, quarter_label};
pub use revenue::analyze_revenue;
