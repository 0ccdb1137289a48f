//! Route scoring engine.
//!
//! Evaluates the enabled rules against one completed stop:
//! - the volume rule awards a flat amount per stop
//! - the star rule whose rating equals the stop's rating adds its net points
//! - when the client has a duration history, the fast and slow rules compare
//!   the stop against the client's average

use std::sync::Arc;

use super::error::GamificationError;
use super::rule_table::RuleTable;
use super::rules::{GamificationRule, RuleKind};
use crate::routes::{ClientRouteStats, ClientStatsAggregator};
use crate::storage::CollectionStore;

/// One rule's effect on a stop's score.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub rule_id: String,
    pub delta: i64,
}

/// Itemized result of scoring a stop.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointBreakdown {
    pub contributions: Vec<Contribution>,
    /// Percent difference from the client average, when a baseline existed.
    pub percentage_diff: Option<f64>,
}

impl PointBreakdown {
    /// Signed point total.
    pub fn total(&self) -> i64 {
        self.contributions.iter().map(|c| c.delta).sum()
    }

    fn push(&mut self, rule: &GamificationRule, delta: i64) {
        tracing::debug!("Rule {} contributes {:+}", rule.id, delta);
        self.contributions.push(Contribution {
            rule_id: rule.id.clone(),
            delta,
        });
    }
}

/// Percent difference of `duration` against `average`, negative when faster.
pub fn percentage_diff(duration: f64, average: f64) -> f64 {
    (duration - average) * 100.0 / average
}

/// Score one stop against a rule set. Disabled rules are ignored.
///
/// Ratings outside 1-5 (including 0 for "unrated") match no star rule.
pub fn score_route(
    rules: &[GamificationRule],
    stats: Option<&ClientRouteStats>,
    duration: f64,
    star_rating: u8,
) -> PointBreakdown {
    let mut breakdown = PointBreakdown::default();
    let enabled = || rules.iter().filter(|r| r.enabled);

    if let Some(volume) = enabled().find(|r| r.kind == RuleKind::Volume) {
        breakdown.push(volume, volume.points_awarded);
    }

    if let Some(star) = enabled().find(|r| r.kind == RuleKind::StarExact { stars: star_rating }) {
        breakdown.push(star, star.net_points());
    }

    let baseline = stats.filter(|s| s.average_duration > 0.0);
    if let Some(stats) = baseline {
        let diff = percentage_diff(duration, stats.average_duration);
        breakdown.percentage_diff = Some(diff);

        let fast = enabled().find_map(|r| match r.kind {
            RuleKind::FastThreshold { pct } => Some((r, pct)),
            _ => None,
        });
        if let Some((rule, pct)) = fast {
            if pct > 0.0 && diff <= -pct {
                breakdown.push(rule, rule.points_awarded);
            }
        }

        let slow = enabled().find_map(|r| match r.kind {
            RuleKind::SlowThreshold { pct } => Some((r, pct)),
            _ => None,
        });
        if let Some((rule, pct)) = slow {
            if pct > 0.0 && diff >= pct {
                breakdown.push(rule, -rule.points_deducted);
            }
        }
    }

    breakdown
}

/// Scoring engine bound to the rule table and client statistics.
pub struct ScoringEngine {
    rules: RuleTable,
    stats: ClientStatsAggregator,
}

impl ScoringEngine {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            rules: RuleTable::new(Arc::clone(&store)),
            stats: ClientStatsAggregator::new(store),
        }
    }

    /// Itemized score for a stop of `duration` minutes.
    pub fn score(
        &self,
        duration: f64,
        star_rating: u8,
        client_id: &str,
    ) -> Result<PointBreakdown, GamificationError> {
        let rules = self.rules.get_rules()?;
        let stats = self.stats.client_route_stats(client_id)?;

        if stats.is_none() {
            tracing::debug!("No duration history for client {}; skipping time rules", client_id);
        }

        Ok(score_route(&rules, stats.as_ref(), duration, star_rating))
    }

    /// Signed point delta for a stop of `duration` minutes.
    pub fn calculate_route_points(
        &self,
        duration: f64,
        star_rating: u8,
        client_id: &str,
    ) -> Result<i64, GamificationError> {
        Ok(self.score(duration, star_rating, client_id)?.total())
    }
}
