//! Fleet record types: messengers, clients and vehicles.
//!
//! Only the fields the scoring workflow reads are typed. Everything else a
//! record carries (photos, documents, maintenance logs) is kept verbatim in
//! `extra` so rewriting a collection never drops data.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

/// Availability of a messenger on the dispatch board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessengerStatus {
    #[default]
    Available,
    Busy,
}

/// Delivery messenger.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Messenger {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub status: MessengerStatus,
    /// Cached point total, refreshed from the point ledger.
    #[serde(default)]
    pub points: i64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Messenger {
    /// Create a new messenger with a generated id.
    pub fn new(first_name: &str, last_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
            status: MessengerStatus::Available,
            points: 0,
            extra: Map::new(),
        }
    }

    /// Full display name.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Delivery client (a location the messengers visit).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: String,
    pub location_name: String,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Client {
    pub fn new(location_name: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            location_name: location_name.to_string(),
            latitude: 0.0,
            longitude: 0.0,
            extra: Map::new(),
        }
    }
}

/// Fleet vehicle.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vehicle {
    pub id: String,
    /// Short fleet code, e.g. "ARJ-1"
    pub code: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Vehicle {
    pub fn new(code: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            extra: Map::new(),
        }
    }
}
