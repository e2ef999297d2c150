//! Rules a draft has to pass before anything is sent to a collaborator.

use std::sync::LazyLock;

use chrono::NaiveDate;
use derive_more::Display;
use regex::Regex;
use serde::{Deserialize, Serialize};
use strum::EnumString;
use thiserror::Error;

use crate::{
    avatar::AvatarPreview,
    repository::entities::{NewVehicle, Profile, ProfileFields, Vehicle, VehicleStatus},
};

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern must compile")
});

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Field {
    #[display("name")]
    Name,
    #[display("license plate")]
    LicensePlate,
    #[display("model")]
    Model,
    #[display("fuel level")]
    FuelLevel,
    #[display("mileage")]
    Mileage,
    #[display("last maintenance")]
    LastMaintenance,
    #[display("email")]
    Email,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(Field),
    #[error("{0:?} is not a valid email address")]
    InvalidEmail(String),
    #[error("{0} must be a whole number in range")]
    InvalidNumber(Field),
    #[error("{0} must be a date formatted as YYYY-MM-DD")]
    InvalidDate(Field),
}

/// How numeric vehicle inputs are interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NumberPolicy {
    /// Use the leading integer of the input, or `0` if there is none. No range checks.
    #[default]
    Lenient,
    /// The whole input must be an integer, fuel level within `0..=100` and mileage non-negative.
    Strict,
}

/// Vehicle form contents, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VehicleForm {
    pub name: String,
    pub license_plate: String,
    pub model: String,
    pub status: VehicleStatus,
    pub location: String,
    pub fuel_level: String,
    pub mileage: String,
    pub last_maintenance: String,
}

impl From<&NewVehicle> for VehicleForm {
    fn from(vehicle: &NewVehicle) -> Self {
        Self {
            name: vehicle.name.clone(),
            license_plate: vehicle.license_plate.clone(),
            model: vehicle.model.clone(),
            status: vehicle.status,
            location: vehicle.location.clone(),
            fuel_level: vehicle.fuel_level.to_string(),
            mileage: vehicle.mileage.to_string(),
            last_maintenance: vehicle.last_maintenance.format(DATE_FORMAT).to_string(),
        }
    }
}

impl From<&Vehicle> for VehicleForm {
    fn from(vehicle: &Vehicle) -> Self {
        Self::from(&NewVehicle::from(vehicle.clone()))
    }
}

/// Profile form contents, exactly as entered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub position: String,
    pub address: String,
    /// Avatar reference carried over from the committed profile.
    pub avatar_ref: Option<String>,
    /// Newly selected image, replacing `avatar_ref` once committed.
    pub avatar_preview: Option<AvatarPreview>,
}

impl ProfileForm {
    /// The avatar to display while editing: the pending preview if there is one.
    pub fn avatar(&self) -> Option<&str> {
        self.avatar_preview
            .as_ref()
            .map(|p| p.data_uri.as_str())
            .or(self.avatar_ref.as_deref())
    }
}

impl From<&Profile> for ProfileForm {
    fn from(profile: &Profile) -> Self {
        let fields = &profile.fields;
        Self {
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            company: fields.company.clone(),
            position: fields.position.clone(),
            address: fields.address.clone(),
            avatar_ref: fields.avatar_ref.clone(),
            avatar_preview: None,
        }
    }
}

pub fn validate_vehicle_draft(
    form: &VehicleForm,
    policy: NumberPolicy,
) -> Result<NewVehicle, ValidationError> {
    let name = required(&form.name, Field::Name)?;
    let license_plate = required(&form.license_plate, Field::LicensePlate)?;
    let model = required(&form.model, Field::Model)?;

    let fuel_level = parse_number(&form.fuel_level, Field::FuelLevel, policy)?;
    let mileage = parse_number(&form.mileage, Field::Mileage, policy)?;
    if policy == NumberPolicy::Strict {
        if !(0..=100).contains(&fuel_level) {
            return Err(ValidationError::InvalidNumber(Field::FuelLevel));
        }
        if mileage < 0 {
            return Err(ValidationError::InvalidNumber(Field::Mileage));
        }
    }

    let last_maintenance = NaiveDate::parse_from_str(form.last_maintenance.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(Field::LastMaintenance))?;

    Ok(NewVehicle {
        name,
        license_plate,
        model,
        status: form.status,
        location: form.location.clone(),
        fuel_level,
        mileage,
        last_maintenance,
    })
}

pub fn validate_profile_draft(form: &ProfileForm) -> Result<ProfileFields, ValidationError> {
    let name = required(&form.name, Field::Name)?;
    let email = required(&form.email, Field::Email)?;

    if !EMAIL.is_match(&email) {
        return Err(ValidationError::InvalidEmail(email));
    }

    let avatar_ref = form
        .avatar_preview
        .as_ref()
        .map(|p| p.data_uri.clone())
        .or_else(|| form.avatar_ref.clone());

    Ok(ProfileFields {
        name,
        email,
        phone: form.phone.clone(),
        company: form.company.clone(),
        position: form.position.clone(),
        address: form.address.clone(),
        avatar_ref,
    })
}

fn required(value: &str, field: Field) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(trimmed.to_string())
}

fn parse_number(text: &str, field: Field, policy: NumberPolicy) -> Result<i64, ValidationError> {
    match policy {
        NumberPolicy::Lenient => Ok(leading_integer(text)),
        NumberPolicy::Strict => text
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidNumber(field)),
    }
}

/// The integer at the start of `text`, ignoring leading whitespace and anything after the last
/// digit. `0` when there is none. Saturates instead of overflowing.
fn leading_integer(text: &str) -> i64 {
    let trimmed = text.trim_start();
    let (negative, rest) = match trimmed.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
    };

    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    let digits = rest.get(..end).unwrap_or_default();
    if digits.is_empty() {
        return 0;
    }

    match digits.parse::<i64>() {
        Ok(value) if negative => -value,
        Ok(value) => value,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn vehicle_form() -> VehicleForm {
        VehicleForm {
            name: "Fleet Vehicle 001".into(),
            license_plate: "ABC-123".into(),
            model: "Ford Transit".into(),
            status: VehicleStatus::Active,
            location: "Downtown District".into(),
            fuel_level: "75".into(),
            mileage: "45230".into(),
            last_maintenance: "2024-01-15".into(),
        }
    }

    fn profile_form(email: &str) -> ProfileForm {
        ProfileForm {
            name: "Jane Doe".into(),
            email: email.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_valid_vehicle() {
        let vehicle = validate_vehicle_draft(&vehicle_form(), NumberPolicy::Lenient).unwrap();

        assert_eq!(vehicle.name, "Fleet Vehicle 001");
        assert_eq!(vehicle.fuel_level, 75);
        assert_eq!(vehicle.mileage, 45230);
        assert_eq!(
            vehicle.last_maintenance,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }

    #[test]
    fn test_missing_fields_in_order() {
        let mut form = vehicle_form();
        form.license_plate = "   ".into();
        form.model = String::new();

        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Lenient),
            Err(ValidationError::MissingField(Field::LicensePlate))
        );

        form.name = "\t".into();
        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Lenient),
            Err(ValidationError::MissingField(Field::Name))
        );
    }

    #[test]
    fn test_required_fields_trimmed() {
        let mut form = vehicle_form();
        form.name = "  Van  ".into();

        let vehicle = validate_vehicle_draft(&form, NumberPolicy::Lenient).unwrap();
        assert_eq!(vehicle.name, "Van");
    }

    #[test]
    fn test_lenient_numbers() {
        let mut form = vehicle_form();
        form.fuel_level = "abc".into();
        form.mileage = " 12km".into();

        let vehicle = validate_vehicle_draft(&form, NumberPolicy::Lenient).unwrap();
        assert_eq!(vehicle.fuel_level, 0);
        assert_eq!(vehicle.mileage, 12);

        form.fuel_level = "150".into();
        form.mileage = "-3.7".into();
        let vehicle = validate_vehicle_draft(&form, NumberPolicy::Lenient).unwrap();
        assert_eq!(vehicle.fuel_level, 150);
        assert_eq!(vehicle.mileage, -3);
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer(""), 0);
        assert_eq!(leading_integer("-"), 0);
        assert_eq!(leading_integer("+42"), 42);
        assert_eq!(leading_integer("99999999999999999999999"), i64::MAX);
        assert_eq!(leading_integer("-99999999999999999999999"), i64::MIN);
    }

    #[test]
    fn test_strict_numbers() {
        let mut form = vehicle_form();
        form.fuel_level = "abc".into();

        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Strict),
            Err(ValidationError::InvalidNumber(Field::FuelLevel))
        );

        form.fuel_level = "101".into();
        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Strict),
            Err(ValidationError::InvalidNumber(Field::FuelLevel))
        );

        form.fuel_level = "100".into();
        form.mileage = "-1".into();
        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Strict),
            Err(ValidationError::InvalidNumber(Field::Mileage))
        );

        form.mileage = " 0 ".into();
        assert!(validate_vehicle_draft(&form, NumberPolicy::Strict).is_ok());
    }

    #[test]
    fn test_invalid_date() {
        let mut form = vehicle_form();
        form.last_maintenance = "15/01/2024".into();

        assert_eq!(
            validate_vehicle_draft(&form, NumberPolicy::Lenient),
            Err(ValidationError::InvalidDate(Field::LastMaintenance))
        );
    }

    #[test]
    fn test_form_from_vehicle() {
        let new = validate_vehicle_draft(&vehicle_form(), NumberPolicy::Lenient).unwrap();
        assert_eq!(VehicleForm::from(&new), vehicle_form());
    }

    #[test]
    fn test_email() {
        assert_eq!(
            validate_profile_draft(&profile_form("foo@bar")),
            Err(ValidationError::InvalidEmail("foo@bar".into()))
        );
        assert!(validate_profile_draft(&profile_form("a@b.co")).is_ok());
        assert!(validate_profile_draft(&profile_form("a b@c.de")).is_err());
        assert!(validate_profile_draft(&profile_form("a@@b.co")).is_err());
    }

    #[test]
    fn test_profile_required() {
        let mut form = profile_form("");
        assert_eq!(
            validate_profile_draft(&form),
            Err(ValidationError::MissingField(Field::Email))
        );

        form.name = " ".into();
        assert_eq!(
            validate_profile_draft(&form),
            Err(ValidationError::MissingField(Field::Name))
        );
    }

    #[test]
    fn test_profile_avatar_preview_wins() {
        let mut form = profile_form("a@b.co");
        form.avatar_ref = Some("https://cdn.example.com/old.png".into());

        assert_eq!(
            validate_profile_draft(&form).unwrap().avatar_ref.as_deref(),
            Some("https://cdn.example.com/old.png")
        );

        form.avatar_preview = Some(AvatarPreview {
            content_type: "image/png".into(),
            bytes: vec![1],
            data_uri: "data:image/png;base64,AQ==".into(),
        });

        assert_eq!(
            validate_profile_draft(&form).unwrap().avatar_ref.as_deref(),
            Some("data:image/png;base64,AQ==")
        );
        assert_eq!(form.avatar(), Some("data:image/png;base64,AQ=="));
    }
}
