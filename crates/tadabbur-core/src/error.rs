use tadabbur_capture::{CameraError, CaptureError};
use tadabbur_types::{ErrorKind, StateKind};

#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Camera(#[from] CameraError),

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error("cannot {action} while {state}")]
    InvalidTransition {
        state: StateKind,
        action: &'static str,
    },

    #[error("crop selection is empty")]
    EmptyCrop,

    #[error("no text to process")]
    EmptyText,
}

impl WorkflowError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WorkflowError::Camera(e) => e.kind(),
            WorkflowError::Capture(e) => e.kind(),
            WorkflowError::InvalidTransition { .. }
            | WorkflowError::EmptyCrop
            | WorkflowError::EmptyText => ErrorKind::InvalidInput,
        }
    }
}
