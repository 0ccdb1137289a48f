//! Route history and client statistics types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::storage::StoreError;

/// One completed stop of a delivery route. Immutable once written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteHistory {
    pub id: String,
    pub messenger_id: String,
    #[serde(default)]
    pub messenger_name: String,
    pub vehicle_id: String,
    #[serde(default)]
    pub vehicle_code: String,
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    /// Minutes attributed to this stop
    pub duration: u32,
    /// 1-5
    pub star_rating: u8,
    #[serde(default)]
    pub note: String,
    pub points_earned: i64,
    #[serde(default)]
    pub completed_by: String,
    pub completed_at: DateTime<Utc>,
}

/// Running duration statistics for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientRouteStats {
    pub client_id: String,
    #[serde(default)]
    pub client_name: String,
    pub total_routes: u32,
    /// Minutes
    pub average_duration: f64,
    /// Minutes
    pub fastest_duration: f64,
    /// Minutes
    pub slowest_duration: f64,
    pub last_updated: DateTime<Utc>,
}

impl ClientRouteStats {
    /// Stats seeded from a client's first route.
    pub fn first(client_id: &str, client_name: &str, duration: f64) -> Self {
        Self {
            client_id: client_id.to_string(),
            client_name: client_name.to_string(),
            total_routes: 1,
            average_duration: duration,
            fastest_duration: duration,
            slowest_duration: duration,
            last_updated: Utc::now(),
        }
    }

    /// Fold one more route duration into the running figures.
    pub fn record(&mut self, duration: f64) {
        let count = self.total_routes as f64;
        self.average_duration = (self.average_duration * count + duration) / (count + 1.0);
        self.fastest_duration = self.fastest_duration.min(duration);
        self.slowest_duration = self.slowest_duration.max(duration);
        self.total_routes += 1;
        self.last_updated = Utc::now();
    }
}

/// Route history query filter. All set fields must match.
#[derive(Debug, Clone, Default)]
pub struct HistoryFilter {
    pub messenger_id: Option<String>,
    pub client_id: Option<String>,
    /// Routes that started at or after this instant
    pub start_date: Option<DateTime<Utc>>,
    /// Routes that ended at or before this instant
    pub end_date: Option<DateTime<Utc>>,
}

impl HistoryFilter {
    pub fn for_messenger(messenger_id: &str) -> Self {
        Self {
            messenger_id: Some(messenger_id.to_string()),
            ..Default::default()
        }
    }

    pub fn for_client(client_id: &str) -> Self {
        Self {
            client_id: Some(client_id.to_string()),
            ..Default::default()
        }
    }

    /// Whether a record passes this filter.
    pub fn matches(&self, record: &RouteHistory) -> bool {
        self.messenger_id
            .as_ref()
            .map_or(true, |id| &record.messenger_id == id)
            && self
                .client_id
                .as_ref()
                .map_or(true, |id| &record.client_id == id)
            && self.start_date.map_or(true, |start| record.start_time >= start)
            && self.end_date.map_or(true, |end| record.end_time <= end)
    }
}

/// Route history errors.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Invalid duration: {0} minutes")]
    InvalidDuration(f64),
}
