//! Everything that lives for one signed-in user.
//!
//! A [`Session`] is built by [`Session::init`] once the auth provider reports a user and is
//! consumed by [`Session::teardown`] on sign-out. It owns the vehicle collection, the navigation
//! state and both editing dialogs; nothing here is shared between sessions.

use chrono::{Local, NaiveDate};
use getset::Getters;
use tracing::{debug, info, warn};

use crate::{
    Error, Result,
    avatar::AvatarPreview,
    collaborators::{Collaborators, PersistenceError},
    components::{ProfileEditor, VehicleEditor, profile_editor, vehicle_editor},
    config::Cfg,
    draft::DraftError,
    repository::{
        FleetStats, Repository,
        entities::{self, Profile, ProfileFields, UserId, Vehicle, VehicleId},
    },
    view::{Screen, Tab, ViewController},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// A short-lived message for the user, e.g. a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub title: String,
    pub message: String,
}

impl Notice {
    fn success(title: &str, message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            title: title.into(),
            message: message.into(),
        }
    }

    fn error(title: &str, err: &Error) -> Self {
        Self {
            kind: NoticeKind::Error,
            title: title.into(),
            message: err.to_string(),
        }
    }
}

#[derive(Debug, Getters)]
pub struct Session {
    collaborators: Collaborators,
    cfg: Cfg,
    #[getset(get = "pub")]
    user: UserId,
    /// Last profile the auth provider handed out.
    #[getset(get = "pub")]
    profile: Profile,
    #[getset(get = "pub")]
    repository: Repository,
    #[getset(get = "pub")]
    view: ViewController,
    #[getset(get = "pub")]
    vehicle_editor: VehicleEditor,
    #[getset(get = "pub")]
    profile_editor: ProfileEditor,
    /// Avatar stored by the last commit attempt that didn't go through.
    uploaded_avatar: Option<(AvatarPreview, String)>,
    notices: Vec<Notice>,
}

impl Session {
    /// Start a session for the signed-in user. The fleet is not loaded yet, see
    /// [`Session::load_fleet`].
    pub async fn init(collaborators: Collaborators, cfg: Cfg) -> Result<Self> {
        let user = collaborators
            .auth
            .current_user()
            .await?
            .ok_or(PersistenceError::Unauthenticated)?;
        let profile = collaborators.auth.current_profile().await?;

        let (policy, ingestor) = {
            let cfg = cfg.read();
            (cfg.validation.numbers, cfg.avatar_ingestor())
        };

        info!("Session started for {user}");

        Ok(Self {
            repository: Repository::new(collaborators.vehicles.clone()),
            collaborators,
            cfg,
            user,
            profile,
            view: ViewController::new(),
            vehicle_editor: VehicleEditor::new(policy),
            profile_editor: ProfileEditor::new(ingestor),
            uploaded_avatar: None,
            notices: Vec::new(),
        })
    }

    /// Sign out and drop all session state.
    pub async fn teardown(self) -> Result<()> {
        self.collaborators.auth.sign_out().await?;
        info!("Session ended for {}", self.user);
        Ok(())
    }

    /// Fetch every vehicle from the backend, replacing the local collection.
    pub async fn load_fleet(&mut self) -> Result<&[Vehicle]> {
        if let Err(err) = self.repository.load_all().await {
            self.notices.push(Notice::error("Failed to load vehicles", &err));
            return Err(err);
        }
        Ok(self.repository.store().vehicles())
    }

    // Fleet

    pub fn vehicles(&self) -> &[Vehicle] {
        self.repository.store().vehicles()
    }

    pub fn vehicle(&self, id: &VehicleId) -> Option<&Vehicle> {
        self.repository.store().get(id)
    }

    pub fn stats(&self) -> FleetStats {
        self.repository.store().aggregates()
    }

    pub fn recent_activity(&self) -> Vec<&Vehicle> {
        let count = self.cfg.read().fleet.recent_activity;
        self.repository.store().recent_activity(count).collect()
    }

    // Navigation

    pub fn screen(&self) -> &Screen {
        self.view.screen()
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.select_tab(tab);
    }

    /// Open the detail screen of a vehicle in the fleet.
    pub fn view_vehicle(&mut self, id: &VehicleId) -> Result<()> {
        if !self.repository.store().contains(id) {
            return Err(entities::Error::NotFound(id.clone()).into());
        }
        self.view.view_vehicle(id.clone());
        Ok(())
    }

    pub fn back(&mut self) {
        self.view.back();
    }

    /// The vehicle shown on the detail screen, as currently committed.
    pub fn selected_vehicle(&self) -> Option<&Vehicle> {
        self.view.selected_vehicle(self.repository.store())
    }

    // Vehicle editing

    pub fn begin_add_vehicle(&mut self) -> Result<()> {
        Ok(self.vehicle_editor.open_new(today())?)
    }

    pub fn begin_edit_vehicle(&mut self, id: &VehicleId) -> Result<()> {
        let vehicle = self
            .repository
            .store()
            .get(id)
            .ok_or_else(|| entities::Error::NotFound(id.clone()))?;
        Ok(self.vehicle_editor.open_existing(vehicle)?)
    }

    /// Route a message to the vehicle dialog and carry out whatever persistence it asks for.
    ///
    /// The returned action is never [`vehicle_editor::Action::Create`] or
    /// [`vehicle_editor::Action::Update`]; those are settled before returning.
    pub async fn vehicle_message(
        &mut self,
        message: vehicle_editor::Message,
    ) -> vehicle_editor::Action {
        use vehicle_editor::{Action, Message};

        let outcome = match self.vehicle_editor.update(message) {
            Action::Create(new) => self.repository.add(new).await,
            Action::Update(vehicle) => self.repository.update(vehicle).await,
            other => return other,
        };

        match self.vehicle_editor.update(Message::Settled(outcome)) {
            Action::Saved(vehicle) => {
                self.notices
                    .push(Notice::success("Vehicle saved", vehicle.name.clone()));
                Action::Saved(vehicle)
            }
            Action::Failed(err) => {
                warn!("Failed to save vehicle: {err}");
                if err.is_transient() {
                    self.notices.push(Notice::error("Failed to save vehicle", &err));
                }
                Action::Failed(err)
            }
            other => other,
        }
    }

    pub async fn edit_vehicle(&mut self, message: vehicle_editor::Message) -> Result<()> {
        action_result(self.vehicle_message(message).await)
    }

    pub async fn commit_vehicle(&mut self) -> Result<Vehicle> {
        use vehicle_editor::Action;

        match self
            .vehicle_message(vehicle_editor::Message::SavePressed)
            .await
        {
            Action::Saved(vehicle) => Ok(vehicle),
            Action::Invalid(err) => Err(err.into()),
            Action::Refused(err) => Err(err.into()),
            Action::Failed(err) => Err(err),
            _ => Err(DraftError::NotEditing.into()),
        }
    }

    pub fn cancel_vehicle_edit(&mut self) -> Result<()> {
        action_result(self.vehicle_editor.update(vehicle_editor::Message::CancelPressed))
    }

    // Profile editing

    pub fn begin_profile_edit(&mut self) -> Result<()> {
        Ok(self.profile_editor.load(&self.profile)?)
    }

    /// Route a message to the profile dialog and carry out the save it asks for.
    pub async fn profile_message(
        &mut self,
        message: profile_editor::Message,
    ) -> profile_editor::Action {
        use profile_editor::{Action, Message};

        let outcome = match self.profile_editor.update(message) {
            Action::Save { fields, avatar } => self.persist_profile(fields, avatar).await,
            other => return other,
        };

        match self.profile_editor.update(Message::Settled(outcome)) {
            Action::Saved(profile) => {
                self.notices
                    .push(Notice::success("Profile updated", profile.greeting()));
                Action::Saved(profile)
            }
            Action::Failed(err) => {
                warn!("Failed to update profile: {err}");
                if err.is_transient() {
                    self.notices
                        .push(Notice::error("Failed to update profile", &err));
                }
                Action::Failed(err)
            }
            other => other,
        }
    }

    pub async fn edit_profile(&mut self, message: profile_editor::Message) -> Result<()> {
        profile_action_result(self.profile_message(message).await)
    }

    /// Check an image and keep it in the profile draft as a preview.
    pub fn attach_avatar(&mut self, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        profile_action_result(self.profile_editor.update(
            profile_editor::Message::AvatarSelected {
                bytes,
                content_type: content_type.to_string(),
            },
        ))
    }

    pub async fn commit_profile(&mut self) -> Result<Profile> {
        use profile_editor::Action;

        match self
            .profile_message(profile_editor::Message::SavePressed)
            .await
        {
            Action::Saved(profile) => Ok(profile),
            Action::Invalid(err) => Err(err.into()),
            Action::Refused(err) => Err(err.into()),
            Action::Rejected(err) => Err(err.into()),
            Action::Failed(err) => Err(err),
            _ => Err(DraftError::NotEditing.into()),
        }
    }

    pub fn cancel_profile_edit(&mut self) -> Result<()> {
        profile_action_result(
            self.profile_editor
                .update(profile_editor::Message::CancelPressed),
        )
    }

    async fn persist_profile(
        &mut self,
        mut fields: ProfileFields,
        avatar: Option<AvatarPreview>,
    ) -> Result<Profile> {
        if let (Some(preview), Some(storage)) = (avatar, &self.collaborators.avatars) {
            let uploaded = self
                .uploaded_avatar
                .as_ref()
                .filter(|(uploaded, _)| *uploaded == preview)
                .map(|(_, uri)| uri.clone());

            let uri = match uploaded {
                Some(uri) => {
                    debug!("Reusing uploaded avatar {uri}");
                    uri
                }
                None => {
                    let uri = storage
                        .upload(preview.bytes.clone(), &preview.content_type)
                        .await?;
                    debug!("Uploaded avatar to {uri}");
                    self.uploaded_avatar = Some((preview, uri.clone()));
                    uri
                }
            };
            fields.avatar_ref = Some(uri);
        }

        self.collaborators
            .profiles
            .update(&self.user, fields)
            .await?;

        // The provider's copy wins over whatever the update returned
        let profile = self.collaborators.auth.refresh_profile().await?;
        self.profile = profile.clone();
        self.uploaded_avatar = None;

        Ok(profile)
    }

    // Notices

    /// Hand out and forget every notice raised so far.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

fn action_result(action: vehicle_editor::Action) -> Result<()> {
    use vehicle_editor::Action;

    match action {
        Action::Refused(err) => Err(err.into()),
        Action::Invalid(err) => Err(err.into()),
        Action::Failed(err) => Err(err),
        _ => Ok(()),
    }
}

fn profile_action_result(action: profile_editor::Action) -> Result<()> {
    use profile_editor::Action;

    match action {
        Action::Refused(err) => Err(err.into()),
        Action::Invalid(err) => Err(err.into()),
        Action::Rejected(err) => Err(err.into()),
        Action::Failed(err) => Err(err),
        _ => Ok(()),
    }
}
