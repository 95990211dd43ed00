use image::{DynamicImage, RgbaImage};
use tadabbur_types::ImageDataUri;
use tracing::instrument;

use crate::camera::MediaStream;
use crate::encode::encode_jpeg;
use crate::error::CaptureError;

/// Raw RGBA frame at the source's native resolution
#[derive(Clone)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl VideoFrame {
    pub fn filled(width: u32, height: u32, pixel: [u8; 4]) -> Self {
        let rgba = pixel
            .iter()
            .copied()
            .cycle()
            .take(width as usize * height as usize * 4)
            .collect();
        Self {
            width,
            height,
            rgba,
        }
    }

    pub fn from_image(image: RgbaImage) -> Self {
        Self {
            width: image.width(),
            height: image.height(),
            rgba: image.into_raw(),
        }
    }
}

impl std::fmt::Debug for VideoFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VideoFrame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Something that can hand out the frame currently on screen
pub trait FrameSource: Send + Sync {
    fn current_frame(&self) -> Result<VideoFrame, CaptureError>;
}

/// Grabs a single still from a live stream
#[derive(Debug, Clone, Copy)]
pub struct FrameCapturer {
    quality: u8,
}

impl FrameCapturer {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    #[instrument(skip_all, fields(stream = %stream.id()))]
    pub fn capture(&self, stream: &MediaStream) -> Result<ImageDataUri, CaptureError> {
        if !stream.is_active() {
            return Err(CaptureError::NoActiveStream);
        }
        let frame = stream.source().current_frame()?;
        self.encode_frame(&frame)
    }

    /// Serialize one frame, sized to its native dimensions
    pub fn encode_frame(&self, frame: &VideoFrame) -> Result<ImageDataUri, CaptureError> {
        let surface = RgbaImage::from_raw(frame.width, frame.height, frame.rgba.clone())
            .ok_or_else(|| {
                CaptureError::Frame(format!(
                    "buffer of {} bytes does not match {}x{}",
                    frame.rgba.len(),
                    frame.width,
                    frame.height
                ))
            })?;

        let rgb = DynamicImage::ImageRgba8(surface).to_rgb8();
        let bytes = encode_jpeg(&rgb, self.quality)?;
        tracing::debug!(
            width = frame.width,
            height = frame.height,
            bytes = bytes.len(),
            "Frame captured"
        );
        Ok(ImageDataUri::from_jpeg(&bytes))
    }
}

impl Default for FrameCapturer {
    fn default() -> Self {
        Self::new(80)
    }
}
