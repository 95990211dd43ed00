use serde::{Deserialize, Serialize};

use crate::{CropRect, DisplaySize, ErrorKind, ImageDataUri, Language};

#[derive(Debug, Clone)]
pub enum AppEvent {
    UiEvent(UiEvent),
    /// Workflow moved to a new state
    StatusUpdate {
        state: StateKind,
        message: String,
    },
    ShowImage(ImagePreview),
    ShowError(ErrorNotice),
    Navigate(Route),
    BackendReady,
}

/// User gestures forwarded from the front end
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    StartCamera,
    Capture,
    ConfirmPreview,
    Retake,
    DisplaySizeChanged(Option<DisplaySize>),
    UpdateCrop(CropRect),
    SaveCrop,
    Reset,
    SubmitText { text: String, language: Language },
    AcceptResult,
    RejectResult,
    Retry,
    Status,
    Close,
}

/// Coarse workflow state, without the payloads the core keeps
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateKind {
    Idle,
    CameraActive,
    Previewing,
    Cropping,
    Processing,
    Result,
    Error,
}

impl StateKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StateKind::Idle => "idle",
            StateKind::CameraActive => "camera-active",
            StateKind::Previewing => "previewing",
            StateKind::Cropping => "cropping",
            StateKind::Processing => "processing",
            StateKind::Result => "result",
            StateKind::Error => "error",
        }
    }
}

impl std::fmt::Display for StateKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which camera the stream should prefer
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Rear camera
    #[default]
    Environment,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStage {
    Captured,
    Cropped,
}

#[derive(Debug, Clone)]
pub struct ImagePreview {
    pub stage: PreviewStage,
    pub image: ImageDataUri,
    pub width: u32,
    pub height: u32,
}

/// Where the workflow can send the user after a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RetryTarget {
    Idle,
    CameraActive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorNotice {
    pub kind: ErrorKind,
    pub message: String,
    pub retry: RetryTarget,
}

impl ErrorNotice {
    pub fn new(kind: ErrorKind, message: impl Into<String>, retry: RetryTarget) -> Self {
        Self {
            kind,
            message: message.into(),
            retry,
        }
    }
}

/// Payload handed to the results view once the user accepts a result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanResult {
    pub ayah: String,
    pub translation: String,
    pub tafsir: Option<String>,
    pub language: Language,
    #[serde(default)]
    pub image: Option<ImageDataUri>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    Home,
    Camera,
    Waiting { language: Language },
    Results(ScanResult),
}
