//! Contracts for the external systems the core depends on.
//!
//! Authentication, vehicle and profile persistence, and avatar storage all live outside this
//! crate. The core only talks to them through the traits below, so a session can run against the
//! local database, the in-memory [`MemoryBackend`], or a remote service alike.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::repository::entities::{Profile, ProfileFields, UserId, Vehicle};

mod memory;

pub use memory::MemoryBackend;

pub type Result<T> = std::result::Result<T, PersistenceError>;

/// A collaborator call failed. Never fatal to the session; the caller keeps its draft and may
/// retry.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("No user is signed in")]
    Unauthenticated,
    #[error("{0}")]
    Backend(String),
    #[error("Internal database error {0}")]
    Database(#[from] agdb::DbError),
    #[error("Stored record is malformed: {0}")]
    Corrupt(String),
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// The signed-in user, if any.
    async fn current_user(&self) -> Result<Option<UserId>>;

    /// Cached profile of the signed-in user.
    async fn current_profile(&self) -> Result<Profile>;

    /// Refetch the profile of the signed-in user and replace the cached copy.
    async fn refresh_profile(&self) -> Result<Profile>;

    async fn sign_out(&self) -> Result<()>;
}

#[async_trait]
pub trait VehicleBackend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Vehicle>>;

    /// Persist a vehicle that was just given its id. Returns the stored record.
    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle>;

    /// Replace a stored vehicle. Returns the stored record.
    async fn update(&self, vehicle: Vehicle) -> Result<Vehicle>;
}

#[async_trait]
pub trait ProfileBackend: Send + Sync {
    async fn update(&self, user: &UserId, fields: ProfileFields) -> Result<Profile>;
}

#[async_trait]
pub trait AvatarStorage: Send + Sync {
    /// Store an image and return a URI that can be kept as the profile's avatar reference.
    async fn upload(&self, bytes: Vec<u8>, content_type: &str) -> Result<String>;
}

/// Every collaborator a [`Session`](crate::Session) needs.
#[derive(Clone)]
pub struct Collaborators {
    pub auth: Arc<dyn AuthProvider>,
    pub vehicles: Arc<dyn VehicleBackend>,
    pub profiles: Arc<dyn ProfileBackend>,
    /// Without storage, avatars are kept inline as data URIs.
    pub avatars: Option<Arc<dyn AvatarStorage>>,
}

impl Collaborators {
    /// Use a single backend for every collaborator, including avatar storage.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: AuthProvider + VehicleBackend + ProfileBackend + AvatarStorage + 'static,
    {
        Self {
            auth: backend.clone(),
            vehicles: backend.clone(),
            profiles: backend.clone(),
            avatars: Some(backend),
        }
    }
}

impl std::fmt::Debug for Collaborators {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Collaborators")
            .field("avatars", &self.avatars.is_some())
            .finish_non_exhaustive()
    }
}
