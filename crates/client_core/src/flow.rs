//! Edit and delete flow state for one item list.
//!
//! Transitions are pure: each takes the current state by reference and returns the next
//! state, or [`FlowError`] when the event does not apply. The controller swaps the result in.

use shared::domain::RecordId;

use crate::error::FlowError;

/// A populated edit form. `id` plays the role of the hidden id field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm<F> {
    pub id: RecordId,
    pub fields: F,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState<F> {
    Idle,
    EditLoading {
        id: RecordId,
    },
    EditOpen(EditForm<F>),
    Submitting(EditForm<F>),
    Confirming {
        id: RecordId,
    },
    Deleting {
        id: RecordId,
    },
}

impl<F> Default for FlowState<F> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<F: Clone> FlowState<F> {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::EditLoading { .. } => "edit_loading",
            Self::EditOpen(_) => "edit_open",
            Self::Submitting(_) => "submitting",
            Self::Confirming { .. } => "confirming",
            Self::Deleting { .. } => "deleting",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Whether the edit surface is currently visible.
    pub fn edit_surface_visible(&self) -> bool {
        matches!(self, Self::EditOpen(_) | Self::Submitting(_))
    }

    fn invalid(&self, event: &'static str) -> FlowError {
        FlowError::InvalidTransition {
            from: self.name(),
            event,
        }
    }

    pub fn begin_edit(&self, id: RecordId) -> Result<Self, FlowError> {
        match self {
            Self::Idle => Ok(Self::EditLoading { id }),
            _ => Err(self.invalid("begin_edit")),
        }
    }

    pub fn edit_loaded(&self, form: EditForm<F>) -> Result<Self, FlowError> {
        match self {
            Self::EditLoading { id } if *id == form.id => Ok(Self::EditOpen(form)),
            Self::EditLoading { id } => Err(FlowError::MismatchedRecord {
                pending: id.to_string(),
                loaded: form.id.to_string(),
            }),
            _ => Err(self.invalid("edit_loaded")),
        }
    }

    pub fn edit_load_failed(&self) -> Result<Self, FlowError> {
        match self {
            Self::EditLoading { .. } => Ok(Self::Idle),
            _ => Err(self.invalid("edit_load_failed")),
        }
    }

    /// Replaces the form fields with what the user submitted.
    pub fn submit_edit(&self, fields: F) -> Result<Self, FlowError> {
        match self {
            Self::EditOpen(form) => Ok(Self::Submitting(EditForm {
                id: form.id.clone(),
                fields,
            })),
            _ => Err(self.invalid("submit_edit")),
        }
    }

    pub fn submit_succeeded(&self) -> Result<Self, FlowError> {
        match self {
            Self::Submitting(_) => Ok(Self::Idle),
            _ => Err(self.invalid("submit_succeeded")),
        }
    }

    /// The surface stays open with the submitted values.
    pub fn submit_failed(&self) -> Result<Self, FlowError> {
        match self {
            Self::Submitting(form) => Ok(Self::EditOpen(form.clone())),
            _ => Err(self.invalid("submit_failed")),
        }
    }

    /// Close trigger or a click outside the edit surface.
    pub fn close_edit(&self) -> Result<Self, FlowError> {
        match self {
            Self::EditOpen(_) => Ok(Self::Idle),
            _ => Err(self.invalid("close_edit")),
        }
    }

    pub fn request_delete(&self, id: RecordId) -> Result<Self, FlowError> {
        match self {
            Self::Idle => Ok(Self::Confirming { id }),
            _ => Err(self.invalid("request_delete")),
        }
    }

    pub fn delete_confirmed(&self) -> Result<Self, FlowError> {
        match self {
            Self::Confirming { id } => Ok(Self::Deleting { id: id.clone() }),
            _ => Err(self.invalid("delete_confirmed")),
        }
    }

    pub fn delete_declined(&self) -> Result<Self, FlowError> {
        match self {
            Self::Confirming { .. } => Ok(Self::Idle),
            _ => Err(self.invalid("delete_declined")),
        }
    }

    pub fn delete_finished(&self) -> Result<Self, FlowError> {
        match self {
            Self::Deleting { .. } => Ok(Self::Idle),
            _ => Err(self.invalid("delete_finished")),
        }
    }
}
