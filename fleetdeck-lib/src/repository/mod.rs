use std::sync::Arc;

use tracing::{debug, warn};

use crate::{
    Result,
    collaborators::VehicleBackend,
    repository::entities::{Error, NewVehicle, Vehicle},
};

mod db;
mod sample;
mod store;

pub mod entities;

pub use db::LocalDb;
pub use sample::sample_fleet;
pub use store::{FleetStats, VehicleStore};

/// Central access point for the fleet.
///
/// The [`Repository`] pairs the in-memory [`VehicleStore`] with the persistence collaborator.
/// Writes go to the collaborator first and only reach the store once they were accepted, so a
/// failed call never leaves the store ahead of the backend.
#[derive(Clone)]
pub struct Repository {
    store: VehicleStore,
    backend: Arc<dyn VehicleBackend>,
}

impl Repository {
    pub fn new(backend: Arc<dyn VehicleBackend>) -> Self {
        Self {
            store: VehicleStore::new(),
            backend,
        }
    }

    pub fn store(&self) -> &VehicleStore {
        &self.store
    }

    /// Replace the whole collection with what the backend holds. On failure the store keeps
    /// its previous contents.
    pub async fn load_all(&mut self) -> Result<&[Vehicle]> {
        let vehicles = self.backend.fetch_all().await.inspect_err(|err| {
            warn!("Failed to load vehicles: {err}");
        })?;
        self.store.replace_all(vehicles)?;

        Ok(self.store.vehicles())
    }

    pub async fn add(&mut self, new: NewVehicle) -> Result<Vehicle> {
        let vehicle = self.store.allocate(new);
        let stored = self.backend.create(vehicle).await?;
        let vehicle = self.store.insert(stored)?;

        debug!("Added vehicle: {} ({})", vehicle.name, vehicle.id);

        Ok(vehicle)
    }

    /// Replace a vehicle. Unknown ids are refused before the backend is contacted.
    pub async fn update(&mut self, vehicle: Vehicle) -> Result<Vehicle> {
        if !self.store.contains(&vehicle.id) {
            return Err(Error::NotFound(vehicle.id).into());
        }

        let stored = self.backend.update(vehicle).await?;
        Ok(self.store.update(stored)?)
    }

    #[cfg(test)]
    /// Return a mock version of a [`Repository`] backed by an in-memory collaborator.
    pub(crate) fn mock() -> (Self, Arc<crate::collaborators::MemoryBackend>) {
        let backend = Arc::new(crate::collaborators::MemoryBackend::new());
        (Self::new(backend.clone()), backend)
    }
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("store", &self.store)
            .finish_non_exhaustive()
    }
}
