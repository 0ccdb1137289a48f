//! Lookup and upsert of fleet records over the collection store.

use std::sync::Arc;

use super::types::{Client, Messenger, Vehicle};
use crate::storage::collection::{load, save};
use crate::storage::{names, CollectionStore, StoreError};

/// Fleet directory.
pub struct FleetDirectory {
    store: Arc<dyn CollectionStore>,
}

impl FleetDirectory {
    pub fn new(store: Arc<dyn CollectionStore>) -> Self {
        Self { store }
    }

    // ========== Messengers ==========

    pub fn messengers(&self) -> Result<Vec<Messenger>, StoreError> {
        load(self.store.as_ref(), names::MESSENGERS)
    }

    pub fn messenger(&self, id: &str) -> Result<Option<Messenger>, StoreError> {
        Ok(self.messengers()?.into_iter().find(|m| m.id == id))
    }

    /// Insert or replace a messenger by id.
    pub fn upsert_messenger(&self, messenger: &Messenger) -> Result<(), StoreError> {
        let mut messengers = self.messengers()?;
        match messengers.iter_mut().find(|m| m.id == messenger.id) {
            Some(existing) => *existing = messenger.clone(),
            None => messengers.push(messenger.clone()),
        }
        save(self.store.as_ref(), names::MESSENGERS, &messengers)
    }

    /// Overwrite the cached point total of one messenger.
    ///
    /// Returns false when the messenger does not exist.
    pub fn set_cached_points(&self, messenger_id: &str, points: i64) -> Result<bool, StoreError> {
        let mut messengers = self.messengers()?;
        let Some(messenger) = messengers.iter_mut().find(|m| m.id == messenger_id) else {
            return Ok(false);
        };
        messenger.points = points;
        save(self.store.as_ref(), names::MESSENGERS, &messengers)?;
        Ok(true)
    }

    // ========== Clients ==========

    pub fn clients(&self) -> Result<Vec<Client>, StoreError> {
        load(self.store.as_ref(), names::CLIENTS)
    }

    pub fn client(&self, id: &str) -> Result<Option<Client>, StoreError> {
        Ok(self.clients()?.into_iter().find(|c| c.id == id))
    }

    pub fn upsert_client(&self, client: &Client) -> Result<(), StoreError> {
        let mut clients = self.clients()?;
        match clients.iter_mut().find(|c| c.id == client.id) {
            Some(existing) => *existing = client.clone(),
            None => clients.push(client.clone()),
        }
        save(self.store.as_ref(), names::CLIENTS, &clients)
    }

    /// Display name of a client, "Unknown" when missing.
    pub fn client_name(&self, id: &str) -> Result<String, StoreError> {
        Ok(self
            .client(id)?
            .map(|c| c.location_name)
            .unwrap_or_else(|| "Unknown".to_string()))
    }

    // ========== Vehicles ==========

    pub fn vehicles(&self) -> Result<Vec<Vehicle>, StoreError> {
        load(self.store.as_ref(), names::VEHICLES)
    }

    pub fn vehicle(&self, id: &str) -> Result<Option<Vehicle>, StoreError> {
        Ok(self.vehicles()?.into_iter().find(|v| v.id == id))
    }

    pub fn upsert_vehicle(&self, vehicle: &Vehicle) -> Result<(), StoreError> {
        let mut vehicles = self.vehicles()?;
        match vehicles.iter_mut().find(|v| v.id == vehicle.id) {
            Some(existing) => *existing = vehicle.clone(),
            None => vehicles.push(vehicle.clone()),
        }
        save(self.store.as_ref(), names::VEHICLES, &vehicles)
    }
}
