use serde::{Deserialize, Serialize};

/// Failure categories shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    PermissionDenied,
    DeviceNotFound,
    DeviceBusy,
    CameraUnsupported,
    DecodeFailure,
    CropFallback,
    NetworkUnreachable,
    RequestTimeout,
    HttpStatus,
    BadResponseShape,
    InvalidInput,
}

impl ErrorKind {
    pub fn user_message(&self) -> &'static str {
        match self {
            ErrorKind::PermissionDenied => {
                "Camera access was denied. Please allow camera access and try again."
            }
            ErrorKind::DeviceNotFound => {
                "No camera found. Please make sure your camera is connected."
            }
            ErrorKind::DeviceBusy => "The camera is being used by another application.",
            ErrorKind::CameraUnsupported => "Camera access is not supported on this device.",
            ErrorKind::DecodeFailure => "The captured image could not be read.",
            ErrorKind::CropFallback => "The crop could not be applied; using the full image.",
            ErrorKind::NetworkUnreachable => {
                "Cannot connect to API server. Please check if the server is running."
            }
            ErrorKind::RequestTimeout => "Request timed out. Please try again.",
            ErrorKind::HttpStatus => "The server rejected the request.",
            ErrorKind::BadResponseShape => "The server sent a response that could not be read.",
            ErrorKind::InvalidInput => "Please enter the verse you want to reflect on.",
        }
    }
}
