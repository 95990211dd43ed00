mod camera;
mod crop;
mod encode;
mod error;
mod frame;
mod still;

pub use camera::{
    CameraBackend, CameraManager, FacingMode, MediaConstraints, MediaStream, MediaTrack,
    PermissionState, TrackKind,
};
pub use crop::{CropEngine, CropFallback, CropOutcome, scale_rect};
pub use encode::encode_jpeg;
pub use error::{CameraError, CaptureError};
pub use frame::{FrameCapturer, FrameSource, VideoFrame};
pub use still::StillImageCamera;
