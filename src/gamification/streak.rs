//! Streak evaluator.
//!
//! Walks backward from today one calendar day at a time. A day qualifies
//! when the messenger closed at least one stop that day with a high enough
//! rating. Only the most recent window is considered: a streak that ended
//! before today never pays out.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Duration, FixedOffset, NaiveDate, Utc};

use super::error::GamificationError;
use super::rule_table::RuleTable;
use super::rules::RuleKind;
use crate::routes::{HistoryFilter, RouteHistory, RouteLog};
use crate::storage::CollectionStore;

/// Calendar day of an instant in the given zone.
pub fn local_day(at: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    at.with_timezone(&offset).date_naive()
}

/// Number of consecutive qualifying days ending at `today`, capped at `max_days`.
pub fn consecutive_qualifying_days(
    history: &[RouteHistory],
    today: NaiveDate,
    max_days: u32,
    min_stars: u8,
    offset: FixedOffset,
) -> u32 {
    let qualifying: HashSet<NaiveDate> = history
        .iter()
        .filter(|r| r.star_rating >= min_stars)
        .map(|r| local_day(r.completed_at, offset))
        .collect();

    let mut streak = 0;
    for back in 0..max_days {
        let day = today - Duration::days(back as i64);
        if !qualifying.contains(&day) {
            break;
        }
        streak += 1;
    }
    streak
}

/// Evaluates the streak rule for a messenger.
pub struct StreakEvaluator {
    rules: RuleTable,
    log: RouteLog,
    offset: FixedOffset,
}

impl StreakEvaluator {
    pub fn new(store: Arc<dyn CollectionStore>, offset: FixedOffset) -> Self {
        Self {
            rules: RuleTable::new(Arc::clone(&store)),
            log: RouteLog::new(store),
            offset,
        }
    }

    /// Today's date in the evaluator's zone.
    pub fn today(&self) -> NaiveDate {
        local_day(Utc::now(), self.offset)
    }

    /// Bonus earned as of today, 0 if the streak is not complete.
    pub fn check_streak_bonus(&self, messenger_id: &str) -> Result<i64, GamificationError> {
        self.check_streak_bonus_on(messenger_id, self.today())
    }

    /// Bonus earned as of `today`, 0 if the streak is not complete.
    pub fn check_streak_bonus_on(
        &self,
        messenger_id: &str,
        today: NaiveDate,
    ) -> Result<i64, GamificationError> {
        let rules = self.rules.enabled_rules()?;
        let Some((rule, days, min_stars)) = rules.iter().find_map(|r| match r.kind {
            RuleKind::Streak { days, min_stars } => Some((r, days, min_stars)),
            _ => None,
        }) else {
            return Ok(0);
        };

        if days == 0 {
            return Ok(0);
        }

        let history = self
            .log
            .route_history(&HistoryFilter::for_messenger(messenger_id))?;
        let streak = consecutive_qualifying_days(&history, today, days, min_stars, self.offset);

        tracing::debug!(
            "Messenger {} has {}/{} qualifying days",
            messenger_id,
            streak,
            days
        );

        if streak >= days {
            Ok(rule.points_awarded)
        } else {
            Ok(0)
        }
    }

    /// Length of the streak window currently configured, if the rule is enabled.
    pub fn window_days(&self) -> Result<Option<u32>, GamificationError> {
        Ok(self
            .rules
            .enabled_rules()?
            .iter()
            .find_map(|r| match r.kind {
                RuleKind::Streak { days, .. } if days > 0 => Some(days),
                _ => None,
            }))
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }
}
