use chrono::NaiveDate;

use crate::repository::entities::{Vehicle, VehicleId, VehicleStatus};

/// A small demonstration fleet, used to seed an empty database.
pub fn sample_fleet() -> Vec<Vehicle> {
    vec![
        sample(
            "1",
            "Fleet Vehicle 001",
            "ABC-123",
            "Ford Transit",
            VehicleStatus::Active,
            "Downtown District",
            (75, 45230),
            (2024, 1, 15),
        ),
        sample(
            "2",
            "Fleet Vehicle 002",
            "XYZ-456",
            "Mercedes Sprinter",
            VehicleStatus::Maintenance,
            "Service Center",
            (20, 67890),
            (2024, 1, 10),
        ),
        sample(
            "3",
            "Fleet Vehicle 003",
            "DEF-789",
            "Iveco Daily",
            VehicleStatus::Idle,
            "Main Depot",
            (90, 23456),
            (2024, 1, 20),
        ),
    ]
}

#[allow(clippy::too_many_arguments)]
fn sample(
    id: &str,
    name: &str,
    license_plate: &str,
    model: &str,
    status: VehicleStatus,
    location: &str,
    (fuel_level, mileage): (i64, i64),
    (year, month, day): (i32, u32, u32),
) -> Vehicle {
    Vehicle {
        id: VehicleId::from(id),
        name: name.into(),
        license_plate: license_plate.into(),
        model: model.into(),
        status,
        location: location.into(),
        fuel_level,
        mileage,
        last_maintenance: NaiveDate::from_ymd_opt(year, month, day).unwrap_or_default(),
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::VehicleStore;

    #[test]
    fn test_sample_fleet_stats() {
        let mut store = VehicleStore::new();
        store.replace_all(sample_fleet()).unwrap();

        let stats = store.aggregates();
        assert_eq!(stats.total, 3);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.maintenance_count, 1);
        assert_eq!(stats.average_fuel, 62);
    }
}
