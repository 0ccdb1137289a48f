//! Client statistics aggregator.
//!
//! Keeps one `ClientRouteStats` row per client, updated incrementally on
//! every completed stop. Nothing is ever recomputed from history.

use std::sync::Arc;

use super::types::{ClientRouteStats, RouteError};
use crate::fleet::FleetDirectory;
use crate::storage::collection::{load, save};
use crate::storage::{names, CollectionStore};

/// Client statistics aggregator.
pub struct ClientStatsAggregator {
    store: Arc<dyn CollectionStore>,
}

impl ClientStatsAggregator {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    /// All client stats rows.
    pub fn all_stats(&self) -> Result<Vec<ClientRouteStats>, RouteError> {
        Ok(load(self.store.as_ref(), names::CLIENT_ROUTE_STATS)?)
    }

    /// Stats for one client, `None` before the client's first route.
    pub fn client_route_stats(
        &self,
        client_id: &str,
    ) -> Result<Option<ClientRouteStats>, RouteError> {
        Ok(self
            .all_stats()?
            .into_iter()
            .find(|s| s.client_id == client_id))
    }

    /// Fold a new route duration into the client's stats, creating the row
    /// on first use.
    pub fn update_client_route_stats(
        &self,
        client_id: &str,
        new_duration: f64,
    ) -> Result<ClientRouteStats, RouteError> {
        if !new_duration.is_finite() || new_duration < 0.0 {
            return Err(RouteError::InvalidDuration(new_duration));
        }

        let mut stats = self.all_stats()?;

        let updated = match stats.iter_mut().find(|s| s.client_id == client_id) {
            Some(existing) => {
                existing.record(new_duration);
                existing.clone()
            }
            None => {
                let client_name =
                    FleetDirectory::new(Arc::clone(&self.store)).client_name(client_id)?;
                let seeded = ClientRouteStats::first(client_id, &client_name, new_duration);
                tracing::debug!("Seeding route stats for client {}", client_id);
                stats.push(seeded.clone());
                seeded
            }
        };

        save(self.store.as_ref(), names::CLIENT_ROUTE_STATS, &stats)?;

        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fleet::Client;
    use crate::storage::MemoryStore;

    fn aggregator() -> (Arc<dyn CollectionStore>, ClientStatsAggregator) {
        let store: Arc<dyn CollectionStore> = Arc::new(MemoryStore::new());
        (Arc::clone(&store), ClientStatsAggregator::new(store))
    }

    #[test]
    fn test_first_update_seeds_all_fields() {
        let (_store, stats) = aggregator();

        let result = stats.update_client_route_stats("c1", 20.0).unwrap();
        assert_eq!(result.total_routes, 1);
        assert_eq!(result.average_duration, 20.0);
        assert_eq!(result.fastest_duration, 20.0);
        assert_eq!(result.slowest_duration, 20.0);
    }

    #[test]
    fn test_second_update_averages() {
        let (_store, stats) = aggregator();

        stats.update_client_route_stats("c1", 20.0).unwrap();
        let result = stats.update_client_route_stats("c1", 10.0).unwrap();

        assert_eq!(result.total_routes, 2);
        assert_eq!(result.average_duration, 15.0);
        assert_eq!(result.fastest_duration, 10.0);
        assert_eq!(result.slowest_duration, 20.0);

        let stored = stats.client_route_stats("c1").unwrap().unwrap();
        assert_eq!(stored, result);
    }

    #[test]
    fn test_clients_are_independent() {
        let (_store, stats) = aggregator();

        stats.update_client_route_stats("c1", 20.0).unwrap();
        stats.update_client_route_stats("c2", 40.0).unwrap();

        assert_eq!(stats.all_stats().unwrap().len(), 2);
        assert_eq!(
            stats.client_route_stats("c2").unwrap().unwrap().average_duration,
            40.0
        );
        assert!(stats.client_route_stats("c3").unwrap().is_none());
    }

    #[test]
    fn test_client_name_resolved_on_seed() {
        let (store, stats) = aggregator();
        let client = Client::new("Colmado La Esquina");
        FleetDirectory::new(Arc::clone(&store))
            .upsert_client(&client)
            .unwrap();

        let seeded = stats.update_client_route_stats(&client.id, 15.0).unwrap();
        assert_eq!(seeded.client_name, "Colmado La Esquina");

        let unknown = stats.update_client_route_stats("ghost", 15.0).unwrap();
        assert_eq!(unknown.client_name, "Unknown");
    }

    #[test]
    fn test_negative_duration_rejected() {
        let (_store, stats) = aggregator();
        assert!(matches!(
            stats.update_client_route_stats("c1", -1.0),
            Err(RouteError::InvalidDuration(_))
        ));
        assert!(stats.client_route_stats("c1").unwrap().is_none());
    }
}
