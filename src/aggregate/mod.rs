//! Derived views over the row table. Every function here is a pure full scan
//! of the rows; nothing is cached between calls.

mod changes;
mod peaks;
mod ranking;
mod series;

pub use changes::{classify_changes, ChangeClassification, DeltaEntry, Trend, TrendCounts};
pub use peaks::{peaks, PeakEntry};
pub use ranking::{top_n, ShareRing, TopEntry, TopRanking};
pub use series::{
    global_series, local_extremes, summarize, visible_series, Extremes, SeriesPoint, Summary,
};

/// Entries in the top emitters ranking.
pub const TOP_N: usize = 5;

/// Entries in the historical peaks ranking.
pub const PEAKS_TOP_K: usize = 15;

/// Entries of each rising/falling/unchanged list shown by the dashboard.
pub const LIST_PREVIEW: usize = 10;

/// Year shown by year-anchored views: the requested upper bound, but never past
/// the data's last year.
pub fn display_year(year_max: i32, latest: i32) -> i32 {
    year_max.min(latest)
}
