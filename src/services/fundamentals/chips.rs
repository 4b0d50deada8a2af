//! Shareholder-distribution ("chips") trend analysis.

use crate::types::{HolderChange, HolderMetric, HolderTrend, ShareholderSnapshot};

/// Week-over-week trend of every tracked metric.
///
/// Snapshots must be ascending by date. Fewer than two gives no trends.
pub fn analyze_shareholders(snapshots: &[ShareholderSnapshot]) -> Vec<HolderTrend> {
    let [.., previous, current] = snapshots else {
        return Vec::new();
    };

    HolderMetric::ALL
        .iter()
        .map(|&metric| {
            let diff = metric.value(current) - metric.value(previous);
            let change = HolderChange::from_diff(diff);

            let mut run_count = 0;
            let mut dates = Vec::new();

            if change != HolderChange::Flat {
                // walk pairs backwards from the newest while the direction matches
                for pair in snapshots.windows(2).rev() {
                    let step = HolderChange::from_diff(metric.value(&pair[1]) - metric.value(&pair[0]));
                    if step != change {
                        break;
                    }
                    run_count += 1;
                    dates.insert(0, pair[1].date);
                }
            }

            HolderTrend {
                metric,
                current: metric.value(current),
                diff,
                change,
                run_count,
                dates,
                as_of: current.date,
            }
        })
        .collect()
}
