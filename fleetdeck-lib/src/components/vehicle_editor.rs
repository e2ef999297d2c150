use chrono::NaiveDate;

use crate::{
    Error,
    draft::{DraftEditor, DraftError, SubmitError},
    repository::entities::{NewVehicle, Vehicle, VehicleId, VehicleStatus},
    validation::{NumberPolicy, ValidationError, VehicleForm, validate_vehicle_draft},
};

#[derive(Debug)]
pub enum Message {
    NameInput(String),
    LicensePlateInput(String),
    ModelInput(String),
    StatusSelected(VehicleStatus),
    LocationInput(String),
    FuelLevelInput(String),
    MileageInput(String),
    LastMaintenanceInput(String),
    CancelPressed,
    SavePressed,
    /// Outcome of persisting the last [`Action::Create`] or [`Action::Update`].
    Settled(crate::Result<Vehicle>),
}

#[derive(Debug)]
pub enum Action {
    None,
    Cancel,
    /// Persist a new vehicle, then report back with [`Message::Settled`].
    Create(NewVehicle),
    /// Persist a replacement record, then report back with [`Message::Settled`].
    Update(Vehicle),
    Saved(Vehicle),
    Invalid(ValidationError),
    Refused(DraftError),
    Failed(Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Creating,
    Editing(VehicleId),
}

/// The add and edit vehicle dialog.
#[derive(Debug, Clone)]
pub struct VehicleEditor {
    editor: DraftEditor<VehicleForm>,
    mode: Option<Mode>,
    policy: NumberPolicy,
}

impl VehicleEditor {
    pub fn new(policy: NumberPolicy) -> Self {
        Self {
            editor: DraftEditor::new(),
            mode: None,
            policy,
        }
    }

    /// Open the dialog with a blank vehicle.
    pub fn open_new(&mut self, today: NaiveDate) -> Result<(), DraftError> {
        self.editor
            .begin(&VehicleForm::from(&NewVehicle::blank(today)))?;
        self.mode = Some(Mode::Creating);
        Ok(())
    }

    /// Load an existing [`Vehicle`] for editing.
    pub fn open_existing(&mut self, vehicle: &Vehicle) -> Result<(), DraftError> {
        self.editor.begin(&VehicleForm::from(vehicle))?;
        self.mode = Some(Mode::Editing(vehicle.id.clone()));
        Ok(())
    }

    pub fn mode(&self) -> Option<&Mode> {
        self.mode.as_ref()
    }

    pub fn form(&self) -> Option<&VehicleForm> {
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
            Message::LicensePlateInput(content) => self.edit(|f| f.license_plate = content),
            Message::ModelInput(content) => self.edit(|f| f.model = content),
            Message::StatusSelected(status) => self.edit(|f| f.status = status),
            Message::LocationInput(content) => self.edit(|f| f.location = content),
            Message::FuelLevelInput(content) => self.edit(|f| f.fuel_level = content),
            Message::MileageInput(content) => self.edit(|f| f.mileage = content),
            Message::LastMaintenanceInput(content) => {
                self.edit(|f| f.last_maintenance = content)
            }
            Message::CancelPressed => match self.editor.cancel() {
                Ok(()) => {
                    self.mode = None;
                    Action::Cancel
                }
                Err(err) => Action::Refused(err),
            },
            Message::SavePressed => {
                let Some(mode) = self.mode.clone() else {
                    return Action::Refused(DraftError::NotEditing);
                };
                let policy = self.policy;

                match self
                    .editor
                    .submit(|form| validate_vehicle_draft(form, policy))
                {
                    Ok(new) => match mode {
                        Mode::Creating => Action::Create(new),
                        Mode::Editing(id) => Action::Update(Vehicle::from_new(id, new)),
                    },
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
                    Ok(vehicle) => {
                        self.mode = None;
                        Action::Saved(vehicle)
                    }
                    Err(err) => Action::Failed(err),
                }
            }
        }
    }

    fn edit<F>(&mut self, change: F) -> Action
    where
        F: FnOnce(&mut VehicleForm),
    {
        match self.editor.edit(change) {
            Ok(()) => Action::None,
            Err(err) => Action::Refused(err),
        }
    }
}
