use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::RgbaImage;
use tokio::sync::watch;

use crate::camera::{CameraBackend, MediaConstraints, MediaStream, PermissionState};
use crate::error::{CameraError, CaptureError};
use crate::frame::{FrameSource, VideoFrame};

/// Camera backend that plays back a single still image as its feed
pub struct StillImageCamera {
    source: StillSource,
    permission: watch::Sender<PermissionState>,
}

enum StillSource {
    File(PathBuf),
    Image(Arc<RgbaImage>),
}

struct StillFrame(Arc<RgbaImage>);

impl FrameSource for StillFrame {
    fn current_frame(&self) -> Result<VideoFrame, CaptureError> {
        Ok(VideoFrame::from_image(self.0.as_ref().clone()))
    }
}

impl StillImageCamera {
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self::with_source(StillSource::File(path.into()))
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self::with_source(StillSource::Image(Arc::new(image)))
    }

    fn with_source(source: StillSource) -> Self {
        let (permission, _) = watch::channel(PermissionState::Granted);
        Self { source, permission }
    }

    /// Simulate the user changing the camera permission
    pub fn set_permission(&self, state: PermissionState) {
        self.permission.send_replace(state);
    }

    fn load(&self) -> Result<(String, Arc<RgbaImage>), CameraError> {
        match &self.source {
            StillSource::Image(image) => Ok(("still image".to_string(), image.clone())),
            StillSource::File(path) => load_still(path),
        }
    }
}

fn load_still(path: &Path) -> Result<(String, Arc<RgbaImage>), CameraError> {
    if !path.exists() {
        return Err(CameraError::NotFound);
    }
    let image = image::open(path)
        .map_err(|e| CameraError::Other(format!("cannot read {}: {e}", path.display())))?;
    Ok((path.display().to_string(), Arc::new(image.to_rgba8())))
}

#[async_trait::async_trait]
impl CameraBackend for StillImageCamera {
    fn supports_permission_query(&self) -> bool {
        true
    }

    async fn query_permission(&self) -> Result<watch::Receiver<PermissionState>, CameraError> {
        Ok(self.permission.subscribe())
    }

    async fn open(&self, constraints: &MediaConstraints) -> Result<MediaStream, CameraError> {
        if *self.permission.borrow() == PermissionState::Denied {
            return Err(CameraError::PermissionDenied);
        }

        let (label, image) = self.load()?;
        tracing::debug!(
            ?constraints,
            width = image.width(),
            height = image.height(),
            "Serving still image as camera feed"
        );
        Ok(MediaStream::video(label, Arc::new(StillFrame(image))))
    }
}
