use chrono::{Days, NaiveDate};
use clap::ValueEnum;
use derive_more::{Display, From};
use serde::{Deserialize, Serialize};
use strum::{EnumIter, EnumString, IntoStaticStr};
use uuid::Uuid;

/// Days from today until the next scheduled service of any vehicle.
pub const SERVICE_INTERVAL_DAYS: u64 = 30;

/// Opaque identifier of a [`Vehicle`]. Assigned once at creation and never changed.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Display, From, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct VehicleId(String);

impl VehicleId {
    /// Draw a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for VehicleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumIter,
    EnumString,
    IntoStaticStr,
    ValueEnum,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VehicleStatus {
    #[display("active")]
    Active,
    #[display("maintenance")]
    Maintenance,
    #[default]
    #[display("idle")]
    Idle,
}

impl VehicleStatus {
    /// Status as shown to a person, e.g. `Maintenance`.
    pub fn label(self) -> &'static str {
        match self {
            VehicleStatus::Active => "Active",
            VehicleStatus::Maintenance => "Maintenance",
            VehicleStatus::Idle => "Idle",
        }
    }
}

/// Coarse classification of a fuel reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FuelBand {
    #[display("good")]
    Good,
    #[display("warning")]
    Warning,
    #[display("low")]
    Low,
}

impl FuelBand {
    pub fn of(fuel_level: i64) -> Self {
        if fuel_level > 50 {
            FuelBand::Good
        } else if fuel_level > 25 {
            FuelBand::Warning
        } else {
            FuelBand::Low
        }
    }
}

/// A vehicle record as committed to the fleet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub name: String,
    pub license_plate: String,
    pub model: String,
    pub status: VehicleStatus,
    pub location: String,
    pub fuel_level: i64,
    pub mileage: i64,
    pub last_maintenance: NaiveDate,
}

impl Vehicle {
    /// Attach an id to a vehicle that doesn't have one yet.
    pub fn from_new(id: VehicleId, new: NewVehicle) -> Self {
        Self {
            id,
            name: new.name,
            license_plate: new.license_plate,
            model: new.model,
            status: new.status,
            location: new.location,
            fuel_level: new.fuel_level,
            mileage: new.mileage,
            last_maintenance: new.last_maintenance,
        }
    }

    pub fn fuel_band(&self) -> FuelBand {
        FuelBand::of(self.fuel_level)
    }

    /// Date of the next scheduled service, counted from `today`.
    pub fn next_service(today: NaiveDate) -> Option<NaiveDate> {
        today.checked_add_days(Days::new(SERVICE_INTERVAL_DAYS))
    }
}

/// A vehicle that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewVehicle {
    pub name: String,
    pub license_plate: String,
    pub model: String,
    pub status: VehicleStatus,
    pub location: String,
    pub fuel_level: i64,
    pub mileage: i64,
    pub last_maintenance: NaiveDate,
}

impl NewVehicle {
    /// Blank vehicle used to seed the add dialog.
    pub fn blank(today: NaiveDate) -> Self {
        Self {
            name: String::new(),
            license_plate: String::new(),
            model: String::new(),
            status: VehicleStatus::Idle,
            location: String::new(),
            fuel_level: 100,
            mileage: 0,
            last_maintenance: today,
        }
    }
}

impl From<Vehicle> for NewVehicle {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            name: vehicle.name,
            license_plate: vehicle.license_plate,
            model: vehicle.model,
            status: vehicle.status,
            location: vehicle.location,
            fuel_level: vehicle.fuel_level,
            mileage: vehicle.mileage,
            last_maintenance: vehicle.last_maintenance,
        }
    }
}
