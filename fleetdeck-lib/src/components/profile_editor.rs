use crate::{
    Error,
    avatar::{AvatarError, AvatarIngestor, AvatarPreview},
    draft::{DraftEditor, DraftError, SubmitError},
    repository::entities::{Profile, ProfileFields},
    validation::{ProfileForm, ValidationError, validate_profile_draft},
};

#[derive(Debug)]
pub enum Message {
    NameInput(String),
    EmailInput(String),
    PhoneInput(String),
    CompanyInput(String),
    PositionInput(String),
    AddressInput(String),
    AvatarSelected { bytes: Vec<u8>, content_type: String },
    CancelPressed,
    SavePressed,
    /// Outcome of persisting the last [`Action::Save`], as reread from the auth provider.
    Settled(crate::Result<Profile>),
}

#[derive(Debug)]
pub enum Action {
    None,
    Cancel,
    /// Persist the fields, uploading `avatar` first when there is storage for it.
    Save {
        fields: ProfileFields,
        avatar: Option<AvatarPreview>,
    },
    Saved(Profile),
    Invalid(ValidationError),
    Rejected(AvatarError),
    Refused(DraftError),
    Failed(Error),
}

/// The profile form. A selected avatar only ever lives in the draft until the save succeeds.
#[derive(Debug, Clone)]
pub struct ProfileEditor {
    editor: DraftEditor<ProfileForm>,
    ingestor: AvatarIngestor,
}

impl ProfileEditor {
    pub fn new(ingestor: AvatarIngestor) -> Self {
        Self {
            editor: DraftEditor::new(),
            ingestor,
        }
    }

    /// Load the committed [`Profile`] for editing.
    pub fn load(&mut self, profile: &Profile) -> Result<(), DraftError> {
        self.editor.begin(&ProfileForm::from(profile))
    }

    pub fn form(&self) -> Option<&ProfileForm> {
        self.editor.draft()
    }

    pub fn is_open(&self) -> bool {
        self.editor.is_editing()
    }

    pub fn is_saving(&self) -> bool {
        self.editor.is_in_flight()
    }

    pub fn update(&mut self, message: Message) -> Action {
        match message {
            Message::NameInput(content) => self.edit(|f| f.name = content),
            Message::EmailInput(content) => self.edit(|f| f.email = content),
            Message::PhoneInput(content) => self.edit(|f| f.phone = content),
            Message::CompanyInput(content) => self.edit(|f| f.company = content),
            Message::PositionInput(content) => self.edit(|f| f.position = content),
            Message::AddressInput(content) => self.edit(|f| f.address = content),
            Message::AvatarSelected {
                bytes,
                content_type,
            } => {
                if !self.editor.is_editing() {
                    return Action::Refused(DraftError::NotEditing);
                }
                match self.ingestor.ingest(bytes, &content_type) {
                    Ok(preview) => self.edit(|f| f.avatar_preview = Some(preview)),
                    Err(err) => Action::Rejected(err),
                }
            }
            Message::CancelPressed => match self.editor.cancel() {
                Ok(()) => Action::Cancel,
                Err(err) => Action::Refused(err),
            },
            Message::SavePressed => {
                let avatar = self.form().and_then(|f| f.avatar_preview.clone());
                match self.editor.submit(validate_profile_draft) {
                    Ok(fields) => Action::Save { fields, avatar },
                    Err(SubmitError::Invalid(err)) => Action::Invalid(err),
                    Err(SubmitError::Draft(err)) => Action::Refused(err),
                }
            }
            Message::Settled(outcome) => {
                if !self.editor.is_in_flight() {
                    return Action::None;
                }

                self.editor.settle(&outcome);
                match outcome {
                    Ok(profile) => Action::Saved(profile),
                    Err(err) => Action::Failed(err),
                }
            }
        }
    }

    fn edit<F>(&mut self, change: F) -> Action
    where
        F: FnOnce(&mut ProfileForm),
    {
        match self.editor.edit(change) {
            Ok(()) => Action::None,
            Err(err) => Action::Refused(err),
        }
    }
}
