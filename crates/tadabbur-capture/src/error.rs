use tadabbur_types::ErrorKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("no camera device found")]
    NotFound,

    #[error("camera is in use by another application")]
    NotReadable,

    #[error("camera access is not supported")]
    Unsupported,

    #[error("camera error: {0}")]
    Other(String),
}

impl CameraError {
    /// Map a DOM exception name (`NotAllowedError`, ...) reported by a web backend
    pub fn from_dom_name(name: &str, message: &str) -> Self {
        match name {
            "NotAllowedError" | "SecurityError" => CameraError::PermissionDenied,
            "NotFoundError" | "OverconstrainedError" => CameraError::NotFound,
            "NotReadableError" | "AbortError" => CameraError::NotReadable,
            "TypeError" | "NotSupportedError" => CameraError::Unsupported,
            _ => CameraError::Other(format!("{name}: {message}")),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            CameraError::PermissionDenied => ErrorKind::PermissionDenied,
            CameraError::NotFound => ErrorKind::DeviceNotFound,
            CameraError::NotReadable => ErrorKind::DeviceBusy,
            CameraError::Unsupported => ErrorKind::CameraUnsupported,
            CameraError::Other(_) => ErrorKind::DeviceBusy,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("no active camera stream")]
    NoActiveStream,

    #[error("failed to read frame: {0}")]
    Frame(String),

    #[error("failed to encode image: {0}")]
    Encode(String),
}

impl CaptureError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CaptureError::NoActiveStream => ErrorKind::DeviceNotFound,
            CaptureError::Frame(_) | CaptureError::Encode(_) => ErrorKind::DecodeFailure,
        }
    }
}
