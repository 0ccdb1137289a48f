//! Gamification: scoring rules, the scoring engine, streak bonuses, the
//! point ledger and the messenger leaderboard.

pub mod engine;
pub mod error;
pub mod ledger;
pub mod ranking;
pub mod rule_table;
pub mod rules;
pub mod streak;

// Re-exports for convenience
pub use engine::{score_route, PointBreakdown, ScoringEngine};
pub use error::GamificationError;
pub use ledger::{GrantReason, PointGrant, PointLedger};
pub use ranking::{RankedMessenger, RankingView};
pub use rule_table::RuleTable;
pub use rules::{default_rules, GamificationRule, RuleKind, RuleUpdate};
pub use streak::StreakEvaluator;
