//! Route record store.
//!
//! Append-only log of completed stops. Saving a record also folds its
//! duration into the client's statistics.

use std::sync::Arc;

use super::stats::ClientStatsAggregator;
use super::types::{HistoryFilter, RouteError, RouteHistory};
use crate::storage::collection::{append, load};
use crate::storage::{names, CollectionStore};

/// Route history log.
pub struct RouteLog {
    store: Arc<dyn CollectionStore>,
    stats: ClientStatsAggregator,
}

impl RouteLog {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        let stats = ClientStatsAggregator::new(Arc::clone(&store));
        Self { store, stats }
    }

    /// Access the client statistics maintained alongside the log.
    pub fn stats(&self) -> &ClientStatsAggregator {
        &self.stats
    }

    /// Append a completed stop and update the client's statistics.
    ///
    /// Returns the record id.
    pub fn save_route_history(&self, record: &RouteHistory) -> Result<String, RouteError> {
        append(self.store.as_ref(), names::ROUTE_HISTORY, record)?;
        self.stats
            .update_client_route_stats(&record.client_id, record.duration as f64)?;

        tracing::debug!(
            "Saved route history {} (messenger {}, client {}, {} min)",
            record.id,
            record.messenger_id,
            record.client_id,
            record.duration
        );

        Ok(record.id.clone())
    }

    /// Query history, newest completion first.
    pub fn route_history(&self, filter: &HistoryFilter) -> Result<Vec<RouteHistory>, RouteError> {
        let mut history: Vec<RouteHistory> = load(self.store.as_ref(), names::ROUTE_HISTORY)?;
        history.retain(|record| filter.matches(record));
        history.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(history)
    }
}
