use std::{path::Path, sync::Arc};

use agdb::{DbAny, DbError, DbId, QueryBuilder};
use async_trait::async_trait;
use derive_more::Deref;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info};

use crate::{
    collaborators::{AuthProvider, PersistenceError, ProfileBackend, Result, VehicleBackend},
    repository::{
        db::models::{ProfileModel, VehicleModel},
        entities::{Profile, ProfileFields, UserId, Vehicle},
        sample::sample_fleet,
    },
};

pub(crate) mod models;

/// Vehicle, profile and sign-in collaborators backed by a local agdb database.
///
/// The signed-in user is the one the database was opened for. Their profile is created from the
/// given defaults the first time it is asked for.
#[derive(Debug, Clone, Deref)]
pub struct LocalDb {
    #[deref]
    db: Arc<RwLock<DbAny>>,
    user: UserId,
    defaults: ProfileFields,
    signed_in: Arc<Mutex<bool>>,
}

impl LocalDb {
    /// Open (or create) the database file at `path`.
    pub fn open(path: &Path, user: UserId, defaults: ProfileFields, seed: bool) -> Result<Self> {
        let path_str = path
            .to_str()
            .ok_or_else(|| PersistenceError::Backend(format!("{} is not UTF-8", path.display())))?;
        info!("Opening database at {path_str}");

        Self::init(DbAny::new_file(path_str)?, user, defaults, seed)
    }

    /// A database that lives only as long as the process.
    pub fn in_memory(user: UserId, defaults: ProfileFields, seed: bool) -> Result<Self> {
        Self::init(DbAny::new_memory("fleetdeck")?, user, defaults, seed)
    }

    fn init(db: DbAny, user: UserId, defaults: ProfileFields, seed: bool) -> Result<Self> {
        let db = Self {
            db: Arc::new(RwLock::new(db)),
            user,
            defaults,
            signed_in: Arc::new(Mutex::new(true)),
        };

        let alias_count = db
            .read()
            .exec(QueryBuilder::select().aliases().query())?
            .result;

        if alias_count == 0 {
            db.write().transaction_mut(|t| -> std::result::Result<(), DbError> {
                // Root element nodes
                t.exec_mut(
                    QueryBuilder::insert()
                        .nodes()
                        .aliases(["vehicles", "profiles"])
                        .query(),
                )?;

                if seed {
                    for vehicle in sample_fleet() {
                        let vehicle_id = t
                            .exec_mut(
                                QueryBuilder::insert()
                                    .element(VehicleModel::from(&vehicle))
                                    .query(),
                            )?
                            .elements
                            .first()
                            .expect("VehicleModel insertion should return the ID as the first element")
                            .id;

                        t.exec_mut(
                            QueryBuilder::insert()
                                .edges()
                                .from("vehicles")
                                .to(vehicle_id)
                                .query(),
                        )?;
                    }
                    debug!("Seeded sample fleet");
                }

                Ok(())
            })?;
        }

        Ok(db)
    }

    fn vehicle_models(&self) -> Result<Vec<VehicleModel>> {
        Ok(self
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<VehicleModel>()
                    .search()
                    .from("vehicles")
                    .where_()
                    .node()
                    .and()
                    .neighbor()
                    .query(),
            )?
            .try_into()?)
    }

    fn profile_models(&self) -> Result<Vec<ProfileModel>> {
        Ok(self
            .read()
            .exec(
                QueryBuilder::select()
                    .elements::<ProfileModel>()
                    .search()
                    .from("profiles")
                    .where_()
                    .node()
                    .and()
                    .neighbor()
                    .query(),
            )?
            .try_into()?)
    }

    fn find_vehicle(&self, vehicle: &Vehicle) -> Result<Option<DbId>> {
        Ok(self
            .vehicle_models()?
            .into_iter()
            .find(|m| m.vehicle_id() == vehicle.id.as_str())
            .and_then(|m| m.db_id()))
    }

    fn find_profile(&self) -> Result<Option<ProfileModel>> {
        Ok(self
            .profile_models()?
            .into_iter()
            .find(|m| m.user_id() == self.user.as_str()))
    }

    fn ensure_signed_in(&self) -> Result<()> {
        if *self.signed_in.lock() {
            Ok(())
        } else {
            Err(PersistenceError::Unauthenticated)
        }
    }

    /// The stored profile, created from the defaults if there isn't one yet.
    fn load_profile(&self) -> Result<Profile> {
        self.ensure_signed_in()?;

        if let Some(model) = self.find_profile()? {
            return Ok(model.into());
        }

        let model = ProfileModel::new(&self.user, &self.defaults);
        self.write()
            .transaction_mut(|t| -> std::result::Result<(), DbError> {
                let profile_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .expect("ProfileModel insertion should return the ID as the first element")
                    .id;

                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from("profiles")
                        .to(profile_id)
                        .query(),
                )?;

                Ok(())
            })?;
        debug!("Created profile for {}", self.user);

        Ok(Profile::new(self.user.clone(), self.defaults.clone()))
    }
}

#[async_trait]
impl AuthProvider for LocalDb {
    async fn current_user(&self) -> Result<Option<UserId>> {
        let signed_in = *self.signed_in.lock();
        Ok(signed_in.then(|| self.user.clone()))
    }

    async fn current_profile(&self) -> Result<Profile> {
        self.load_profile()
    }

    async fn refresh_profile(&self) -> Result<Profile> {
        self.load_profile()
    }

    async fn sign_out(&self) -> Result<()> {
        *self.signed_in.lock() = false;
        debug!("Signed out: {}", self.user);
        Ok(())
    }
}

#[async_trait]
impl VehicleBackend for LocalDb {
    async fn fetch_all(&self) -> Result<Vec<Vehicle>> {
        self.ensure_signed_in()?;
        self.vehicle_models()?
            .into_iter()
            .map(Vehicle::try_from)
            .collect()
    }

    async fn create(&self, vehicle: Vehicle) -> Result<Vehicle> {
        self.ensure_signed_in()?;
        if self.find_vehicle(&vehicle)?.is_some() {
            return Err(PersistenceError::Backend(format!(
                "vehicle {} already exists",
                vehicle.id
            )));
        }

        let model = VehicleModel::from(&vehicle);
        self.write()
            .transaction_mut(|t| -> std::result::Result<(), DbError> {
                let vehicle_id = t
                    .exec_mut(QueryBuilder::insert().element(model).query())?
                    .elements
                    .first()
                    .expect("VehicleModel insertion should return the ID as the first element")
                    .id;

                // Link the vehicle to the root "vehicles" node
                t.exec_mut(
                    QueryBuilder::insert()
                        .edges()
                        .from("vehicles")
                        .to(vehicle_id)
                        .query(),
                )?;

                Ok(())
            })?;
        debug!("Stored vehicle: {}", vehicle.id);

        Ok(vehicle)
    }

    async fn update(&self, vehicle: Vehicle) -> Result<Vehicle> {
        self.ensure_signed_in()?;
        let db_id = self.find_vehicle(&vehicle)?.ok_or_else(|| {
            PersistenceError::Backend(format!("vehicle {} not found", vehicle.id))
        })?;

        let model = VehicleModel::from(&vehicle);
        self.write().exec_mut(
            QueryBuilder::insert()
                .values([model.values()])
                .ids(db_id)
                .query(),
        )?;

        Ok(vehicle)
    }
}

#[async_trait]
impl ProfileBackend for LocalDb {
    async fn update(&self, user: &UserId, fields: ProfileFields) -> Result<Profile> {
        self.ensure_signed_in()?;
        if user != &self.user {
            return Err(PersistenceError::Unauthenticated);
        }

        // Make sure there is a stored profile to write into
        self.load_profile()?;
        let db_id = self
            .find_profile()?
            .and_then(|m| m.db_id())
            .ok_or_else(|| PersistenceError::Corrupt(format!("profile of {user} is missing")))?;

        let model = ProfileModel::new(user, &fields);
        self.write().exec_mut(
            QueryBuilder::insert()
                .values([model.values()])
                .ids(db_id)
                .query(),
        )?;

        Ok(Profile::new(user.clone(), fields))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::repository::entities::VehicleStatus;

    fn defaults() -> ProfileFields {
        ProfileFields {
            name: "Local User".into(),
            email: "local@example.com".into(),
            ..Default::default()
        }
    }

    fn mock(seed: bool) -> LocalDb {
        LocalDb::in_memory(UserId::from("local"), defaults(), seed).unwrap()
    }

    #[tokio::test]
    async fn test_seed() {
        assert_eq!(mock(true).fetch_all().await.unwrap().len(), 3);
        assert!(mock(false).fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_and_update() {
        let db = mock(true);
        let mut vehicle = sample_fleet().remove(0);
        vehicle.id = "new-1".into();

        db.create(vehicle.clone()).await.unwrap();
        assert!(db.create(vehicle.clone()).await.is_err());

        vehicle.status = VehicleStatus::Maintenance;
        vehicle.location = String::new();
        VehicleBackend::update(&db, vehicle.clone()).await.unwrap();

        let stored = db.fetch_all().await.unwrap();
        assert_eq!(stored.len(), 4);
        assert!(stored.contains(&vehicle));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let db = mock(false);
        let vehicle = sample_fleet().remove(0);

        assert!(matches!(
            VehicleBackend::update(&db, vehicle).await,
            Err(PersistenceError::Backend(_))
        ));
    }

    #[tokio::test]
    async fn test_profile_bootstrap_and_update() {
        let db = mock(false);
        let user = UserId::from("local");

        let profile = db.current_profile().await.unwrap();
        assert_eq!(profile.fields, defaults());

        let mut fields = defaults();
        fields.company = "Acme Logistics".into();
        fields.avatar_ref = Some("data:image/png;base64,AQ==".into());
        ProfileBackend::update(&db, &user, fields.clone())
            .await
            .unwrap();

        assert_eq!(db.refresh_profile().await.unwrap().fields, fields);
        assert_eq!(db.profile_models().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sign_out() {
        let db = mock(false);
        db.sign_out().await.unwrap();

        assert_eq!(db.current_user().await.unwrap(), None);
        assert!(matches!(
            db.current_profile().await,
            Err(PersistenceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_vehicles_after_sign_out() {
        let db = mock(true);
        let vehicle = sample_fleet().remove(0);
        db.sign_out().await.unwrap();

        assert!(matches!(
            db.fetch_all().await,
            Err(PersistenceError::Unauthenticated)
        ));
        assert!(matches!(
            db.create(vehicle.clone()).await,
            Err(PersistenceError::Unauthenticated)
        ));
        assert!(matches!(
            VehicleBackend::update(&db, vehicle).await,
            Err(PersistenceError::Unauthenticated)
        ));
    }

    #[tokio::test]
    async fn test_file_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fleet.db");

        {
            let db = LocalDb::open(&path, UserId::from("local"), defaults(), true).unwrap();
            let mut vehicle = sample_fleet().remove(1);
            vehicle.id = "persisted".into();
            db.create(vehicle).await.unwrap();
        }

        let db = LocalDb::open(&path, UserId::from("local"), defaults(), true).unwrap();
        assert_eq!(db.fetch_all().await.unwrap().len(), 4);
    }
}
