//! LogiTrack - Fleet Route Scoring
//!
//! Route-scoring engine for a courier fleet. Completed delivery stops are
//! scored against configurable rules and each client's duration history,
//! points accumulate in an append-only ledger, and messengers are ranked on
//! a leaderboard. Data lives in a collection store backed by a JSON file or
//! a SQLite database.

pub mod dispatch;
pub mod evaluations;
pub mod fleet;
pub mod gamification;
pub mod reports;
pub mod routes;
pub mod storage;

// Re-export commonly used types
pub use dispatch::{DispatchCard, RouteCompletion, RouteCompletionService};
pub use evaluations::EvaluationBook;
pub use fleet::FleetDirectory;
pub use gamification::{PointLedger, RankingView, RuleTable, ScoringEngine, StreakEvaluator};
pub use routes::{ClientStatsAggregator, RouteLog};
pub use storage::{open_store, AppConfig, CollectionStore};
