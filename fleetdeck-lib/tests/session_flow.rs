use std::sync::Arc;

use fleetdeck_lib::{
    Error, Session,
    collaborators::Collaborators,
    components::vehicle_editor::Message as VehicleMessage,
    config::CoreConfig,
    repository::{LocalDb, entities::VehicleId},
    view::{Screen, Tab},
};
use parking_lot::RwLock;

fn local_collaborators(db: LocalDb) -> Collaborators {
    let db = Arc::new(db);
    Collaborators {
        auth: db.clone(),
        vehicles: db.clone(),
        profiles: db,
        avatars: None,
    }
}

#[tokio::test]
async fn test_local_session_flow() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = CoreConfig::load_from(&dir.path().join("core.toml")).unwrap();

    let db = LocalDb::open(
        &dir.path().join("fleet.db"),
        cfg.user_id(),
        cfg.default_profile(),
        cfg.fleet.seed_sample_data,
    )
    .unwrap();
    let mut session = Session::init(local_collaborators(db), Arc::new(RwLock::new(cfg)))
        .await
        .unwrap();

    assert_eq!(session.load_fleet().await.unwrap().len(), 3);
    assert_eq!(session.stats().average_fuel, 62);

    // Add a vehicle through the dialog
    session.begin_add_vehicle().unwrap();
    for message in [
        VehicleMessage::NameInput("Fleet Vehicle 004".into()),
        VehicleMessage::LicensePlateInput("JKL-321".into()),
        VehicleMessage::ModelInput("Ford Transit Custom".into()),
        VehicleMessage::FuelLevelInput("30".into()),
    ] {
        session.edit_vehicle(message).await.unwrap();
    }
    let added = session.commit_vehicle().await.unwrap();
    assert_eq!(session.stats().total, 4);
    assert_eq!(session.stats().average_fuel, 54);

    // Open it, edit it, and go back
    session.select_tab(Tab::Overview);
    session.view_vehicle(&added.id).unwrap();
    session.begin_edit_vehicle(&added.id).unwrap();
    session
        .edit_vehicle(VehicleMessage::LocationInput("North Yard".into()))
        .await
        .unwrap();
    session.commit_vehicle().await.unwrap();
    assert_eq!(
        session.selected_vehicle().map(|v| v.location.as_str()),
        Some("North Yard")
    );
    session.back();
    assert_eq!(session.screen(), &Screen::VehicleList);

    // Unknown ids never reach the database
    assert!(matches!(
        session.begin_edit_vehicle(&VehicleId::from("missing")),
        Err(Error::Entity(_))
    ));

    // Profile: local user starts from the configured defaults
    session.begin_profile_edit().unwrap();
    session
        .edit_profile(fleetdeck_lib::components::profile_editor::Message::NameInput(
            "Dana Fleet".into(),
        ))
        .await
        .unwrap();
    session
        .edit_profile(fleetdeck_lib::components::profile_editor::Message::EmailInput(
            "dana@example.com".into(),
        ))
        .await
        .unwrap();
    session.attach_avatar(vec![0xFF, 0xD8], "image/jpeg").unwrap();
    let profile = session.commit_profile().await.unwrap();

    assert_eq!(profile.initials(), "DF");
    assert_eq!(
        profile.fields.avatar_ref.as_deref(),
        Some("data:image/jpeg;base64,/9g=")
    );

    session.teardown().await.unwrap();
}
