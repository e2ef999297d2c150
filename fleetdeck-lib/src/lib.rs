//! Client-side core of the FleetDeck fleet-management console.
//!
//! Holds the vehicle collection and its derived statistics, the screen navigation state, and the
//! draft, validate and commit workflow shared by vehicle and profile editing. Authentication,
//! persistence and file storage are reached through the traits in [`collaborators`].

use thiserror::Error;

pub mod avatar;
pub mod collaborators;
pub mod components;
pub mod config;
pub mod draft;
pub mod fs;
pub mod repository;
pub mod session;
pub mod validation;
pub mod view;

pub use repository::Repository;
pub use session::Session;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Entity(#[from] repository::entities::Error),
    #[error(transparent)]
    Validation(#[from] validation::ValidationError),
    #[error(transparent)]
    Draft(#[from] draft::DraftError),
    #[error(transparent)]
    Avatar(#[from] avatar::AvatarError),
    #[error(transparent)]
    Persistence(#[from] collaborators::PersistenceError),
    #[error(transparent)]
    Config(#[from] config::ConfigError),
}

impl Error {
    /// Whether retrying the same operation later might succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Error::Persistence(_))
    }
}

impl From<draft::SubmitError> for Error {
    fn from(err: draft::SubmitError) -> Self {
        match err {
            draft::SubmitError::Draft(err) => Error::Draft(err),
            draft::SubmitError::Invalid(err) => Error::Validation(err),
        }
    }
}
