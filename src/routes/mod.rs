//! Completed route records and per-client duration statistics.

pub mod history;
pub mod stats;
pub mod types;

pub use history::RouteLog;
pub use stats::ClientStatsAggregator;
pub use types::{ClientRouteStats, HistoryFilter, RouteError, RouteHistory};
