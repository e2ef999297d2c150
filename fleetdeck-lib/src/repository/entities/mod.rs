//! Core domain entities for FleetDeck.
//!
//! These types represent the vehicles under management and the profile of the signed-in user.
//! They are plain records; ownership of the committed collection lives in
//! [`VehicleStore`](crate::repository::VehicleStore).

use thiserror::Error;

mod profile;
mod vehicle;

pub use profile::{Profile, ProfileFields, UserId, initials};
pub use vehicle::{
    FuelBand, NewVehicle, SERVICE_INTERVAL_DAYS, Vehicle, VehicleId, VehicleStatus,
};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("No vehicle with id {0} exists")]
    NotFound(VehicleId),
    #[error("A vehicle with id {0} already exists")]
    DuplicateId(VehicleId),
}
