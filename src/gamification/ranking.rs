//! Messenger leaderboard.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;

use super::error::GamificationError;
use super::ledger::PointLedger;
use crate::fleet::{FleetDirectory, Messenger};
use crate::storage::CollectionStore;

/// Leaderboard row.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedMessenger {
    /// Competition rank: equal points share a rank and the next rank skips
    pub rank: u32,
    pub messenger_id: String,
    pub name: String,
    pub points: i64,
}

/// Sort messengers by ledger totals, highest first, ties by name.
pub fn rank_messengers(messengers: &[Messenger], totals: &HashMap<String, i64>) -> Vec<RankedMessenger> {
    let mut rows: Vec<RankedMessenger> = messengers
        .iter()
        .map(|m| RankedMessenger {
            rank: 0,
            messenger_id: m.id.clone(),
            name: m.full_name(),
            points: totals.get(&m.id).copied().unwrap_or(0),
        })
        .collect();

    rows.sort_by(|a, b| b.points.cmp(&a.points).then_with(|| a.name.cmp(&b.name)));

    let mut previous: Option<i64> = None;
    let mut rank = 0u32;
    for (index, row) in rows.iter_mut().enumerate() {
        if previous != Some(row.points) {
            rank = index as u32 + 1;
            previous = Some(row.points);
        }
        row.rank = rank;
    }

    rows
}

/// Leaderboard service.
pub struct RankingView {
    fleet: FleetDirectory,
    ledger: PointLedger,
}

impl RankingView {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self {
            fleet: FleetDirectory::new(Arc::clone(&store)),
            ledger: PointLedger::new(store),
        }
    }

    /// Current leaderboard of every messenger in the fleet.
    pub fn messenger_ranking(&self) -> Result<Vec<RankedMessenger>, GamificationError> {
        let messengers = self.fleet.messengers()?;
        self.ledger.adopt_opening_balances(&messengers)?;
        let totals = self.ledger.totals()?;
        Ok(rank_messengers(&messengers, &totals))
    }
}
