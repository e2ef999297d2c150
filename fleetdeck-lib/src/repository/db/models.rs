use std::str::FromStr;

use agdb::{DbElement, DbId, DbKeyValue};
use chrono::NaiveDate;

use crate::{
    collaborators::PersistenceError,
    repository::entities::{Profile, ProfileFields, UserId, Vehicle, VehicleId, VehicleStatus},
};

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct VehicleModel {
    db_id: Option<DbId>,
    vehicle_id: String,
    name: String,
    license_plate: String,
    model: String,
    /// Lowercase [`VehicleStatus`]
    status: String,
    location: String,
    fuel_level: i64,
    mileage: i64,
    /// `YYYY-MM-DD`
    last_maintenance: String,
}

impl VehicleModel {
    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn vehicle_id(&self) -> &str {
        &self.vehicle_id
    }

    /// Every stored field except the id, as key-value pairs for an in-place update.
    pub fn values(&self) -> [DbKeyValue; 9] {
        [
            ("vehicle_id", self.vehicle_id.clone()).into(),
            ("name", self.name.clone()).into(),
            ("license_plate", self.license_plate.clone()).into(),
            ("model", self.model.clone()).into(),
            ("status", self.status.clone()).into(),
            ("location", self.location.clone()).into(),
            ("fuel_level", self.fuel_level).into(),
            ("mileage", self.mileage).into(),
            ("last_maintenance", self.last_maintenance.clone()).into(),
        ]
    }
}

impl From<&Vehicle> for VehicleModel {
    fn from(vehicle: &Vehicle) -> Self {
        Self {
            db_id: None,
            vehicle_id: vehicle.id.to_string(),
            name: vehicle.name.clone(),
            license_plate: vehicle.license_plate.clone(),
            model: vehicle.model.clone(),
            status: vehicle.status.to_string(),
            location: vehicle.location.clone(),
            fuel_level: vehicle.fuel_level,
            mileage: vehicle.mileage,
            last_maintenance: vehicle.last_maintenance.format(DATE_FORMAT).to_string(),
        }
    }
}

impl TryFrom<VehicleModel> for Vehicle {
    type Error = PersistenceError;

    fn try_from(model: VehicleModel) -> Result<Self, Self::Error> {
        let status = VehicleStatus::from_str(&model.status).map_err(|_| {
            PersistenceError::Corrupt(format!(
                "vehicle {} has unknown status {:?}",
                model.vehicle_id, model.status
            ))
        })?;
        let last_maintenance = NaiveDate::parse_from_str(&model.last_maintenance, DATE_FORMAT)
            .map_err(|_| {
                PersistenceError::Corrupt(format!(
                    "vehicle {} has invalid maintenance date {:?}",
                    model.vehicle_id, model.last_maintenance
                ))
            })?;

        Ok(Vehicle {
            id: VehicleId::from(model.vehicle_id),
            name: model.name,
            license_plate: model.license_plate,
            model: model.model,
            status,
            location: model.location,
            fuel_level: model.fuel_level,
            mileage: model.mileage,
            last_maintenance,
        })
    }
}

#[derive(Debug, Clone, DbElement, PartialEq, PartialOrd)]
pub(crate) struct ProfileModel {
    db_id: Option<DbId>,
    user_id: String,
    name: String,
    email: String,
    phone: String,
    company: String,
    position: String,
    address: String,
    /// Empty when no avatar is set
    avatar_ref: String,
}

impl ProfileModel {
    pub fn new(user: &UserId, fields: &ProfileFields) -> Self {
        Self {
            db_id: None,
            user_id: user.to_string(),
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            company: fields.company.clone(),
            position: fields.position.clone(),
            address: fields.address.clone(),
            avatar_ref: fields.avatar_ref.clone().unwrap_or_default(),
        }
    }

    pub fn db_id(&self) -> Option<DbId> {
        self.db_id
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn values(&self) -> [DbKeyValue; 7] {
        [
            ("name", self.name.clone()).into(),
            ("email", self.email.clone()).into(),
            ("phone", self.phone.clone()).into(),
            ("company", self.company.clone()).into(),
            ("position", self.position.clone()).into(),
            ("address", self.address.clone()).into(),
            ("avatar_ref", self.avatar_ref.clone()).into(),
        ]
    }
}

impl From<ProfileModel> for Profile {
    fn from(model: ProfileModel) -> Self {
        let avatar_ref = Some(model.avatar_ref).filter(|r| !r.is_empty());
        Profile::new(
            UserId::from(model.user_id),
            ProfileFields {
                name: model.name,
                email: model.email,
                phone: model.phone,
                company: model.company,
                position: model.position,
                address: model.address,
                avatar_ref,
            },
        )
    }
}
