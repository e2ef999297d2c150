use thiserror::Error;
use tracing::debug;

use crate::validation::ValidationError;

#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum DraftError {
    #[error("Nothing is being edited")]
    NotEditing,
    #[error("A save is already in progress")]
    InFlight,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error(transparent)]
    Draft(#[from] DraftError),
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Working copy of an entity, kept apart from the committed version until a commit succeeds.
///
/// A commit happens in two steps. [`DraftEditor::submit`] validates the draft and marks it in
/// flight, the caller persists the result, then hands the outcome to [`DraftEditor::settle`].
/// While in flight the draft is frozen, so a second submission can't race the first.
#[derive(Debug, Clone)]
pub struct DraftEditor<T> {
    draft: Option<T>,
    in_flight: bool,
}

impl<T: Clone> DraftEditor<T> {
    pub fn new() -> Self {
        Self {
            draft: None,
            in_flight: false,
        }
    }

    /// Start editing a copy of `source`, replacing any draft that was open.
    pub fn begin(&mut self, source: &T) -> Result<(), DraftError> {
        self.ensure_idle()?;
        self.draft = Some(source.clone());
        Ok(())
    }

    pub fn is_editing(&self) -> bool {
        self.draft.is_some()
    }

    pub fn is_in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn draft(&self) -> Option<&T> {
        self.draft.as_ref()
    }

    /// Apply `change` to the draft.
    pub fn edit<F>(&mut self, change: F) -> Result<(), DraftError>
    where
        F: FnOnce(&mut T),
    {
        self.ensure_idle()?;
        let draft = self.draft.as_mut().ok_or(DraftError::NotEditing)?;
        change(draft);
        Ok(())
    }

    /// Throw the draft away. The committed entity is untouched.
    pub fn cancel(&mut self) -> Result<(), DraftError> {
        self.ensure_idle()?;
        if self.draft.take().is_some() {
            debug!("Draft discarded");
        }
        Ok(())
    }

    /// Validate the draft and, if it passes, mark it in flight. On a validation failure the draft
    /// stays open and unchanged.
    pub fn submit<P, F>(&mut self, validate: F) -> Result<P, SubmitError>
    where
        F: FnOnce(&T) -> Result<P, ValidationError>,
    {
        self.ensure_idle()?;
        let draft = self.draft.as_ref().ok_or(DraftError::NotEditing)?;
        let payload = validate(draft)?;
        self.in_flight = true;
        Ok(payload)
    }

    /// Finish an in-flight commit. Success closes the draft, failure keeps it for a retry.
    pub fn settle<R, E>(&mut self, outcome: &Result<R, E>) {
        self.in_flight = false;
        if outcome.is_ok() {
            self.draft = None;
        }
    }

    fn ensure_idle(&self) -> Result<(), DraftError> {
        if self.in_flight {
            return Err(DraftError::InFlight);
        }
        Ok(())
    }
}

impl<T: Clone> Default for DraftEditor<T> {
    fn default() -> Self {
        Self::new()
    }
}
