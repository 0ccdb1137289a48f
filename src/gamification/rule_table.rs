//! Rule table management.
//!
//! Rules are seeded with the default set the first time the table is read
//! while empty, edited one at a time, and can be reset to the defaults.

use std::sync::Arc;

use super::error::GamificationError;
use super::rules::{default_rules, GamificationRule, RuleUpdate};
use crate::storage::collection::{load, save};
use crate::storage::{names, CollectionStore};

/// Manager for the scoring rule table.
pub struct RuleTable {
    store: Arc<dyn CollectionStore>,
}

impl RuleTable {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Seed the default rules if the table is empty. Returns the table.
    pub fn initialize_default_rules(&self) -> Result<Vec<GamificationRule>, GamificationError> {
        let existing: Vec<GamificationRule> =
            load(self.store.as_ref(), names::GAMIFICATION_RULES)?;
        if !existing.is_empty() {
            return Ok(existing);
        }

        let defaults = default_rules();
        save(self.store.as_ref(), names::GAMIFICATION_RULES, &defaults)?;
        tracing::info!("Seeded {} default scoring rules", defaults.len());

        Ok(defaults)
    }

    /// All rules, seeding defaults on first access.
    pub fn get_rules(&self) -> Result<Vec<GamificationRule>, GamificationError> {
        self.initialize_default_rules()
    }

    /// Enabled rules only, in table order.
    pub fn enabled_rules(&self) -> Result<Vec<GamificationRule>, GamificationError> {
        let mut rules = self.get_rules()?;
        rules.retain(|r| r.enabled);
        Ok(rules)
    }

    /// Apply a partial update to one rule.
    pub fn update_rule(
        &self,
        rule_id: &str,
        update: RuleUpdate,
    ) -> Result<GamificationRule, GamificationError> {
        let mut rules = self.get_rules()?;
        let rule = rules
            .iter_mut()
            .find(|r| r.id == rule_id)
            .ok_or_else(|| GamificationError::RuleNotFound(rule_id.to_string()))?;

        // Validate everything before touching the rule.
        for amount in [update.points_awarded, update.points_deducted].into_iter().flatten() {
            if amount < 0 {
                return Err(GamificationError::ValidationError(format!(
                    "point amounts must not be negative, got {}",
                    amount
                )));
            }
        }
        let kind = match update.threshold {
            Some(threshold) => rule
                .kind
                .with_threshold(threshold)
                .map_err(GamificationError::ValidationError)?,
            None => rule.kind,
        };

        rule.kind = kind;
        if let Some(enabled) = update.enabled {
            rule.enabled = enabled;
        }
        if let Some(awarded) = update.points_awarded {
            rule.points_awarded = awarded;
        }
        if let Some(deducted) = update.points_deducted {
            rule.points_deducted = deducted;
        }
        if let Some(description) = update.description {
            rule.description = description;
        }

        let updated = rule.clone();
        save(self.store.as_ref(), names::GAMIFICATION_RULES, &rules)?;
        tracing::info!("Updated scoring rule {}", rule_id);

        Ok(updated)
    }

    /// Toggle a rule on or off.
    pub fn set_enabled(
        &self,
        rule_id: &str,
        enabled: bool,
    ) -> Result<GamificationRule, GamificationError> {
        self.update_rule(
            rule_id,
            RuleUpdate {
                enabled: Some(enabled),
                ..Default::default()
            },
        )
    }

    /// Discard all edits and restore the default rule set.
    pub fn reset_rules(&self) -> Result<Vec<GamificationRule>, GamificationError> {
        save::<GamificationRule>(self.store.as_ref(), names::GAMIFICATION_RULES, &[])?;
        tracing::info!("Scoring rules reset to defaults");
        self.initialize_default_rules()
    }
}
