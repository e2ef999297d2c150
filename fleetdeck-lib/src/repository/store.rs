use std::collections::HashSet;

use tracing::debug;

use crate::repository::entities::{Error, NewVehicle, Result, Vehicle, VehicleId, VehicleStatus};

/// Values derived from the current vehicle collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FleetStats {
    pub total: usize,
    pub active_count: usize,
    pub maintenance_count: usize,
    pub idle_count: usize,
    /// Mean fuel level rounded to the nearest integer, halves rounding up. `0` for an empty fleet.
    pub average_fuel: i64,
}

/// Exclusive owner of the committed vehicle collection.
///
/// Records keep their insertion order. Every id appears at most once, records are only ever
/// appended or replaced whole, and nothing is ever removed.
#[derive(Debug, Clone, Default)]
pub struct VehicleStore {
    vehicles: Vec<Vehicle>,
}

impl VehicleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the entire collection. A collection containing the same id twice is refused and
    /// the store keeps its previous contents.
    pub fn replace_all(&mut self, vehicles: Vec<Vehicle>) -> Result<()> {
        let mut seen = HashSet::with_capacity(vehicles.len());
        for vehicle in &vehicles {
            if !seen.insert(&vehicle.id) {
                return Err(Error::DuplicateId(vehicle.id.clone()));
            }
        }

        debug!("Loaded {} vehicles", vehicles.len());
        self.vehicles = vehicles;

        Ok(())
    }

    /// Assign a fresh id to `new` and append it.
    pub fn add(&mut self, new: NewVehicle) -> Vehicle {
        let vehicle = self.allocate(new);
        self.vehicles.push(vehicle.clone());

        debug!("Added vehicle: {}", vehicle.id);

        vehicle
    }

    /// Give `new` an id that no record in the store uses, without inserting it.
    pub fn allocate(&self, new: NewVehicle) -> Vehicle {
        let mut id = VehicleId::generate();
        while self.contains(&id) {
            id = VehicleId::generate();
        }

        Vehicle::from_new(id, new)
    }

    /// Append a vehicle whose id was already assigned, usually by [`VehicleStore::allocate`].
    pub fn insert(&mut self, vehicle: Vehicle) -> Result<Vehicle> {
        if self.contains(&vehicle.id) {
            return Err(Error::DuplicateId(vehicle.id));
        }

        self.vehicles.push(vehicle.clone());
        debug!("Inserted vehicle: {}", vehicle.id);

        Ok(vehicle)
    }

    /// Replace the record sharing `vehicle`'s id. Nothing of the old record is kept.
    pub fn update(&mut self, vehicle: Vehicle) -> Result<Vehicle> {
        let slot = self
            .vehicles
            .iter_mut()
            .find(|v| v.id == vehicle.id)
            .ok_or_else(|| Error::NotFound(vehicle.id.clone()))?;

        *slot = vehicle.clone();
        debug!("Updated vehicle: {}", vehicle.id);

        Ok(vehicle)
    }

    pub fn get(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| &v.id == id)
    }

    pub fn contains(&self, id: &VehicleId) -> bool {
        self.get(id).is_some()
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    pub fn len(&self) -> usize {
        self.vehicles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vehicles.is_empty()
    }

    /// The first `count` vehicles, as shown in the overview's activity feed.
    pub fn recent_activity(&self, count: usize) -> impl Iterator<Item = &Vehicle> {
        self.vehicles.iter().take(count)
    }

    pub fn aggregates(&self) -> FleetStats {
        let count_of =
            |status: VehicleStatus| self.vehicles.iter().filter(|v| v.status == status).count();

        FleetStats {
            total: self.vehicles.len(),
            active_count: count_of(VehicleStatus::Active),
            maintenance_count: count_of(VehicleStatus::Maintenance),
            idle_count: count_of(VehicleStatus::Idle),
            average_fuel: average_fuel(&self.vehicles),
        }
    }
}

/// `round(sum / n)` with halves rounded towards positive infinity, in integer arithmetic.
fn average_fuel(vehicles: &[Vehicle]) -> i64 {
    let Ok(n) = i128::try_from(vehicles.len()) else {
        return 0;
    };
    if n == 0 {
        return 0;
    }

    let sum: i128 = vehicles.iter().map(|v| i128::from(v.fuel_level)).sum();
    let rounded = (2 * sum + n).div_euclid(2 * n);

    i64::try_from(rounded).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod test {
    use chrono::NaiveDate;

    use super::*;

    fn new_vehicle(name: &str, status: VehicleStatus, fuel_level: i64) -> NewVehicle {
        NewVehicle {
            name: name.into(),
            license_plate: "ABC-123".into(),
            model: "Ford Transit".into(),
            status,
            location: "Main Depot".into(),
            fuel_level,
            mileage: 1000,
            last_maintenance: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn test_add() {
        let mut store = VehicleStore::new();

        let first = store.add(new_vehicle("One", VehicleStatus::Active, 50));
        let second = store.add(new_vehicle("Two", VehicleStatus::Active, 50));

        assert_ne!(first.id, second.id);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(&first.id), Some(&first));
    }

    #[test]
    fn test_add_many_unique() {
        let mut store = VehicleStore::new();
        for i in 0..200 {
            store.add(new_vehicle(&format!("V{i}"), VehicleStatus::Idle, 10));
        }

        let ids: HashSet<_> = store.vehicles().iter().map(|v| &v.id).collect();
        assert_eq!(ids.len(), 200);
    }

    #[test]
    fn test_update() {
        let mut store = VehicleStore::new();
        let original = store.add(new_vehicle("One", VehicleStatus::Active, 75));

        let mut replacement = original.clone();
        replacement.name = "Renamed".into();
        replacement.location = String::new();
        replacement.status = VehicleStatus::Maintenance;

        store.update(replacement.clone()).unwrap();

        assert_eq!(store.get(&original.id), Some(&replacement));
        assert_eq!(store.get(&original.id).unwrap().location, "");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_update_missing() {
        let mut store = VehicleStore::new();
        store.add(new_vehicle("One", VehicleStatus::Active, 75));

        let ghost = Vehicle::from_new(
            VehicleId::from("missing"),
            new_vehicle("Ghost", VehicleStatus::Idle, 0),
        );

        assert!(matches!(store.update(ghost), Err(Error::NotFound(_))));
        assert_eq!(store.aggregates().total, 1);
    }

    #[test]
    fn test_replace_all_rejects_duplicates() {
        let mut store = VehicleStore::new();
        let kept = store.add(new_vehicle("Kept", VehicleStatus::Active, 75));

        let dup = Vehicle::from_new(
            VehicleId::from("x"),
            new_vehicle("A", VehicleStatus::Idle, 1),
        );

        assert!(matches!(
            store.replace_all(vec![dup.clone(), dup]),
            Err(Error::DuplicateId(_))
        ));
        assert_eq!(store.vehicles(), &[kept]);
    }

    #[test]
    fn test_insert_duplicate() {
        let mut store = VehicleStore::new();
        let vehicle = store.add(new_vehicle("One", VehicleStatus::Active, 75));

        assert!(matches!(
            store.insert(vehicle),
            Err(Error::DuplicateId(_))
        ));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_aggregates_empty() {
        let store = VehicleStore::new();

        assert_eq!(
            store.aggregates(),
            FleetStats {
                total: 0,
                active_count: 0,
                maintenance_count: 0,
                idle_count: 0,
                average_fuel: 0,
            }
        );
    }

    #[test]
    fn test_aggregates() {
        let mut store = VehicleStore::new();
        store.add(new_vehicle("One", VehicleStatus::Active, 75));
        store.add(new_vehicle("Two", VehicleStatus::Maintenance, 20));
        store.add(new_vehicle("Three", VehicleStatus::Idle, 90));

        let stats = store.aggregates();

        assert_eq!(stats.total, 3);
        assert_eq!(stats.active_count, 1);
        assert_eq!(stats.maintenance_count, 1);
        assert_eq!(stats.idle_count, 1);
        assert_eq!(stats.average_fuel, 62);
    }

    #[test]
    fn test_average_rounds_half_up() {
        let mut store = VehicleStore::new();
        store.add(new_vehicle("One", VehicleStatus::Active, 1));
        store.add(new_vehicle("Two", VehicleStatus::Active, 2));

        assert_eq!(store.aggregates().average_fuel, 2);

        let mut negative = VehicleStore::new();
        negative.add(new_vehicle("One", VehicleStatus::Active, -1));
        negative.add(new_vehicle("Two", VehicleStatus::Active, -2));

        // round(-1.5) is -1
        assert_eq!(negative.aggregates().average_fuel, -1);
    }

    #[test]
    fn test_recent_activity() {
        let mut store = VehicleStore::new();
        for i in 0..5 {
            store.add(new_vehicle(&format!("V{i}"), VehicleStatus::Idle, 10));
        }

        let names: Vec<_> = store.recent_activity(3).map(|v| v.name.as_str()).collect();
        assert_eq!(names, ["V0", "V1", "V2"]);
        assert_eq!(store.recent_activity(10).count(), 5);
    }
}
