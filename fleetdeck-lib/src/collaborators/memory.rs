use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use crate::{
    collaborators::{
        AuthProvider, AvatarStorage, PersistenceError, ProfileBackend, Result, VehicleBackend,
    },
    repository::entities::{Profile, ProfileFields, UserId, Vehicle},
};

#[derive(Debug, Default)]
struct State {
    profile: Option<Profile>,
    vehicles: Vec<Vehicle>,
    uploads: Vec<(String, Vec<u8>)>,
    fail_next: Option<String>,
    calls: usize,
}

impl State {
    /// Count the call and consume a pending injected failure, if any.
    fn begin_call(&mut self) -> Result<()> {
        self.calls += 1;
        match self.fail_next.take() {
            Some(message) => Err(PersistenceError::Backend(message)),
            None => Ok(()),
        }
    }

    fn signed_in(&self) -> Result<&Profile> {
        self.profile.as_ref().ok_or(PersistenceError::Unauthenticated)
    }
}

/// Every collaborator backed by process memory.
///
/// Used for tests and demos. Failures can be injected with [`MemoryBackend::fail_next`].
#[derive(Debug, Default)]
pub struct MemoryBackend {
    state: Mutex<State>,
}

impl MemoryBackend {
    /// A backend with nobody signed in and no vehicles.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend with `profile`'s user signed in.
    pub fn signed_in(profile: Profile) -> Self {
        let backend = Self::new();
        backend.state.lock().profile = Some(profile);
        backend
    }

    pub fn with_vehicles(self, vehicles: Vec<Vehicle>) -> Self {
        self.state.lock().vehicles = vehicles;
        self
    }

    /// Make the next collaborator call fail with `message`.
    pub fn fail_next(&self, message: &str) {
        self.state.lock().fail_next = Some(message.to_string());
    }

    /// Number of collaborator calls made so far.
    pub fn calls(&self) -> usize {
        self.state.lock().calls
    }

    pub fn stored_vehicles(&self) -> Vec<Vehicle> {
        self.state.lock().vehicles.clone()
    }

    pub fn stored_profile(&self) -> Option<Profile> {
        self.state.lock().profile.clone()
    }

    /// Content types of every upload, in order.
    pub fn uploads(&self) -> Vec<String> {
        self.state
            .lock()
            .uploads
            .iter()
            .map(|(content_type, _)| content_type.clone())
            .collect()
    }
}

#[async_trait]
impl AuthProvider for MemoryBackend {
    async fn current_user(&self) -> Result<Option<UserId>> {
        let mut state = self.state.lock();
        state.begin_call()?;
        Ok(state.profile.as_ref().map(|p| p.id.clone()))
    }

    async fn current_profile(&self) -> Result<Profile> {
        let mut state = self.state.lock();
        state.begin_call()?;
        state.signed_in().cloned()
    }

    async fn refresh_profile(&self) -> Result<Profile> {
        let mut state = self.state.lock();
        state.begin_call()?;
        state.signed_in().cloned()
    }

    async fn sign_out(&self) -> Result<()> {
        let mut state = self.state.lock();
        state.begin_call()?;
        if let Some(profile) = state.profile.take() {
            debug!("Signed out: {}", profile.id);
        }
        Ok(())
    }
}

#[async_trait]
impl VehicleBackend for MemoryBackend {
    async fn fetch_all(&self) -> Result<Vec<Vehicle>> {
        let mut state = self.state.lock();
        state.begin_call()?;
        Ok(state.vehicles.clone())
    }

    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle> {
        let mut state = self.state.lock();
        state.begin_call()?;
        if state.vehicles.iter().any(|v| v.id == vehicle.id) {
            return Err(PersistenceError::Backend(format!(
                "vehicle {} already exists",
                vehicle.id
            )));
        }
        state.vehicles.push(vehicle.clone());
        Ok(vehicle)
    }

    async fn update(&self, vehicle: Vehicle) -> Result<Vehicle> {
        let mut state = self.state.lock();
        state.begin_call()?;
        let slot = state
            .vehicles
            .iter_mut()
            .find(|v| v.id == vehicle.id)
            .ok_or_else(|| PersistenceError::Backend(format!("vehicle {} not found", vehicle.id)))?;
        *slot = vehicle.clone();
        Ok(vehicle)
    }
}

#[async_trait]
impl ProfileBackend for MemoryBackend {
    async fn update(&self, user: &UserId, fields: ProfileFields) -> Result<Profile> {
        let mut state = self.state.lock();
        state.begin_call()?;
        let profile = state
            .profile
            .as_mut()
            .filter(|p| &p.id == user)
            .ok_or(PersistenceError::Unauthenticated)?;
        profile.fields = fields;
        Ok(profile.clone())
    }
}

#[async_trait]
impl AvatarStorage for MemoryBackend {
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String> {
        let mut state = self.state.lock();
        state.begin_call()?;
        state.uploads.push((content_type.to_string(), bytes));
        Ok(format!("memory://avatars/{}", state.uploads.len()))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn profile() -> Profile {
        Profile::new(
            UserId::from("user-1"),
            ProfileFields {
                name: "Jane".into(),
                email: "jane@example.com".into(),
                ..Default::default()
            },
        )
    }

    #[tokio::test]
    async fn test_fail_next_is_consumed() {
        let backend = MemoryBackend::signed_in(profile());
        backend.fail_next("offline");

        assert!(matches!(
            backend.fetch_all().await,
            Err(PersistenceError::Backend(m)) if m == "offline"
        ));
        assert!(backend.fetch_all().await.is_ok());
        assert_eq!(backend.calls(), 2);
    }

    #[tokio::test]
    async fn test_sign_out() {
        let backend = MemoryBackend::signed_in(profile());
        backend.sign_out().await.unwrap();

        assert_eq!(backend.current_user().await.unwrap(), None);
        assert!(matches!(
            backend.current_profile().await,
            Err(PersistenceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_profile_update_other_user() {
        let backend = MemoryBackend::signed_in(profile());

        let result = ProfileBackend::update(
            &backend,
            &UserId::from("someone-else"),
            ProfileFields::default(),
        )
        .await;

        assert!(matches!(result, Err(PersistenceError::Unauthenticated)));
        assert_eq!(backend.stored_profile().unwrap().fields.name, "Jane");
    }
}
