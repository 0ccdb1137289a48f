//! Append-only point ledger.
//!
//! Every change to a messenger's score is a `PointGrant`. Totals are always
//! folded from the grants; the `points` field on a messenger record is only
//! a cache refreshed after each grant.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::GamificationError;
use super::streak::local_day;
use crate::fleet::{FleetDirectory, Messenger};
use crate::storage::collection::{append, load};
use crate::storage::{names, CollectionStore};

/// Why points were granted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GrantReason {
    /// Points scored by one completed stop
    #[serde(rename_all = "camelCase")]
    Route { history_id: String },
    /// Streak bonus for a run of qualifying days
    StreakBonus { days: u32 },
    /// Manual correction or an opening balance carried over from a cached total
    Adjustment { note: String },
}

/// One ledger entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointGrant {
    pub id: String,
    pub messenger_id: String,
    pub amount: i64,
    pub reason: GrantReason,
    pub granted_at: DateTime<Utc>,
}

/// Point ledger over the collection store.
pub struct PointLedger {
    store: Arc<dyn CollectionStore>,
}

impl PointLedger {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// Every grant, in insertion order.
    pub fn grants(&self) -> Result<Vec<PointGrant>, GamificationError> {
        Ok(load(self.store.as_ref(), names::POINT_LEDGER)?)
    }

    /// Grants of one messenger, in insertion order.
    pub fn grants_for(&self, messenger_id: &str) -> Result<Vec<PointGrant>, GamificationError> {
        let mut grants = self.grants()?;
        grants.retain(|g| g.messenger_id == messenger_id);
        Ok(grants)
    }

    /// Append a grant stamped with the current time.
    pub fn grant(
        &self,
        messenger_id: &str,
        amount: i64,
        reason: GrantReason,
    ) -> Result<PointGrant, GamificationError> {
        self.grant_at(messenger_id, amount, reason, Utc::now())
    }

    /// Append a grant stamped with the instant that earned it.
    pub fn grant_at(
        &self,
        messenger_id: &str,
        amount: i64,
        reason: GrantReason,
        granted_at: DateTime<Utc>,
    ) -> Result<PointGrant, GamificationError> {
        let grant = PointGrant {
            id: Uuid::new_v4().to_string(),
            messenger_id: messenger_id.to_string(),
            amount,
            reason,
            granted_at,
        };
        append(self.store.as_ref(), names::POINT_LEDGER, &grant)?;

        tracing::info!(
            "Granted {:+} points to messenger {} ({:?})",
            amount,
            messenger_id,
            grant.reason
        );

        Ok(grant)
    }

    /// Sum of one messenger's grants.
    pub fn total_for(&self, messenger_id: &str) -> Result<i64, GamificationError> {
        Ok(self
            .grants_for(messenger_id)?
            .iter()
            .map(|g| g.amount)
            .sum())
    }

    /// Totals of every messenger that has at least one grant.
    pub fn totals(&self) -> Result<HashMap<String, i64>, GamificationError> {
        Ok(self
            .grants()?
            .into_iter()
            .fold(HashMap::new(), |mut totals, grant| {
                *totals.entry(grant.messenger_id).or_insert(0) += grant.amount;
                totals
            }))
    }

    /// Whether a streak bonus was granted to the messenger on or after `since`.
    pub fn has_streak_bonus_since(
        &self,
        messenger_id: &str,
        since: NaiveDate,
        offset: FixedOffset,
    ) -> Result<bool, GamificationError> {
        Ok(self.grants_for(messenger_id)?.iter().any(|g| {
            matches!(g.reason, GrantReason::StreakBonus { .. })
                && local_day(g.granted_at, offset) >= since
        }))
    }

    /// Carry cached totals of messengers with no ledger history into the
    /// ledger as opening balances. Returns how many were adopted.
    pub fn adopt_opening_balances(&self, messengers: &[Messenger]) -> Result<usize, GamificationError> {
        let totals = self.totals()?;
        let mut adopted = 0;

        for messenger in messengers {
            if messenger.points != 0 && !totals.contains_key(&messenger.id) {
                self.grant(
                    &messenger.id,
                    messenger.points,
                    GrantReason::Adjustment {
                        note: "opening balance".to_string(),
                    },
                )?;
                adopted += 1;
            }
        }

        if adopted > 0 {
            tracing::info!("Adopted {} opening point balances into the ledger", adopted);
        }

        Ok(adopted)
    }

    /// Recompute a messenger's total and write it to the cached field.
    pub fn refresh_cached_points(&self, messenger_id: &str) -> Result<i64, GamificationError> {
        let total = self.total_for(messenger_id)?;
        let found = FleetDirectory::new(Arc::clone(&self.store))
            .set_cached_points(messenger_id, total)?;
        if !found {
            tracing::warn!(
                "Messenger {} not in the fleet directory; cached points not updated",
                messenger_id
            );
        }
        Ok(total)
    }
}
