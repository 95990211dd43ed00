use tadabbur_client::ExtractedContent;
use tadabbur_types::{CropRect, DisplaySize, ErrorNotice, ImageDataUri, Language, StateKind};

/// What a processing request was made from
#[derive(Debug, Clone, PartialEq)]
pub enum Submission {
    Image(ImageDataUri),
    Text { text: String, language: Language },
}

impl Submission {
    pub fn image(&self) -> Option<&ImageDataUri> {
        match self {
            Submission::Image(image) => Some(image),
            Submission::Text { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub enum WorkflowState {
    #[default]
    Idle,
    CameraActive,
    Previewing {
        captured: ImageDataUri,
    },
    Cropping {
        captured: ImageDataUri,
        rect: Option<CropRect>,
        displayed: Option<DisplaySize>,
    },
    Processing {
        submission: Submission,
        language: Language,
    },
    Result {
        content: ExtractedContent,
        image: Option<ImageDataUri>,
        language: Language,
    },
    Error(ErrorNotice),
}

impl WorkflowState {
    pub fn kind(&self) -> StateKind {
        match self {
            WorkflowState::Idle => StateKind::Idle,
            WorkflowState::CameraActive => StateKind::CameraActive,
            WorkflowState::Previewing { .. } => StateKind::Previewing,
            WorkflowState::Cropping { .. } => StateKind::Cropping,
            WorkflowState::Processing { .. } => StateKind::Processing,
            WorkflowState::Result { .. } => StateKind::Result,
            WorkflowState::Error(_) => StateKind::Error,
        }
    }

    /// The captured image while previewing or cropping
    pub fn captured(&self) -> Option<&ImageDataUri> {
        match self {
            WorkflowState::Previewing { captured } | WorkflowState::Cropping { captured, .. } => {
                Some(captured)
            }
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&ErrorNotice> {
        match self {
            WorkflowState::Error(notice) => Some(notice),
            _ => None,
        }
    }
}
