use image::{DynamicImage, Rgba, RgbaImage, imageops};
use tadabbur_types::{CropRect, DisplaySize, ImageDataUri, PixelRect};
use tracing::{debug, instrument, warn};

use crate::encode::encode_jpeg;

/// Why a crop returned the source image instead of a cut-out
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CropFallback {
    /// The displayed image had no measurable size
    NotDisplayed,
    /// The scaled rectangle rounds to zero pixels or misses the source
    EmptyRegion,
    Decode(String),
    Encode(String),
}

#[derive(Debug, Clone)]
pub enum CropOutcome {
    Cropped {
        image: ImageDataUri,
        region: PixelRect,
    },
    Fallback {
        image: ImageDataUri,
        reason: CropFallback,
    },
}

impl CropOutcome {
    pub fn image(&self) -> &ImageDataUri {
        match self {
            CropOutcome::Cropped { image, .. } | CropOutcome::Fallback { image, .. } => image,
        }
    }

    pub fn into_image(self) -> ImageDataUri {
        match self {
            CropOutcome::Cropped { image, .. } | CropOutcome::Fallback { image, .. } => image,
        }
    }

    pub fn region(&self) -> Option<PixelRect> {
        match self {
            CropOutcome::Cropped { region, .. } => Some(*region),
            CropOutcome::Fallback { .. } => None,
        }
    }
}

// Half-up rounding, matching how canvas coordinates were rounded on screen.
fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Map a rectangle drawn over the displayed image onto source pixels,
/// clipped to the source bitmap
pub fn scale_rect(rect: CropRect, displayed: DisplaySize, natural: (u32, u32)) -> PixelRect {
    let scale_x = natural.0 as f64 / displayed.width;
    let scale_y = natural.1 as f64 / displayed.height;

    let left = round_half_up(rect.x * scale_x);
    let top = round_half_up(rect.y * scale_y);
    let right = left + round_half_up(rect.width * scale_x);
    let bottom = top + round_half_up(rect.height * scale_y);

    // NaN survives clamp; the max(0.0) below turns it into an empty span
    let clip = |value: f64, limit: u32| value.clamp(0.0, limit as f64);
    let (x0, x1) = (clip(left, natural.0), clip(right, natural.0));
    let (y0, y1) = (clip(top, natural.1), clip(bottom, natural.1));

    PixelRect {
        x: x0 as i64,
        y: y0 as i64,
        width: (x1 - x0).max(0.0) as u32,
        height: (y1 - y0).max(0.0) as u32,
    }
}

/// Cuts the user's selection out of a captured image
#[derive(Debug, Clone)]
pub struct CropEngine {
    quality: u8,
    background: Rgba<u8>,
}

impl CropEngine {
    pub fn new(quality: u8, background: [u8; 3]) -> Self {
        let [r, g, b] = background;
        Self {
            quality,
            background: Rgba([r, g, b, 255]),
        }
    }

    /// Crop `source` to `rect`, given in the coordinates of the displayed
    /// image. Never fails: anything that goes wrong yields the source.
    #[instrument(skip(self, source), fields(source_len = source.as_str().len()))]
    pub fn crop(
        &self,
        source: &ImageDataUri,
        rect: CropRect,
        displayed: Option<DisplaySize>,
    ) -> CropOutcome {
        let fallback = |reason: CropFallback| {
            warn!(?reason, "Crop not applied, keeping the uncropped image");
            CropOutcome::Fallback {
                image: source.clone(),
                reason,
            }
        };

        let decoded = match source
            .decode()
            .map_err(|e| e.to_string())
            .and_then(|bytes| image::load_from_memory(&bytes).map_err(|e| e.to_string()))
        {
            Ok(img) => img,
            Err(e) => return fallback(CropFallback::Decode(e)),
        };

        let Some(displayed) = displayed.filter(|d| d.is_painted()) else {
            return fallback(CropFallback::NotDisplayed);
        };

        let region = scale_rect(rect, displayed, (decoded.width(), decoded.height()));
        if region.width == 0 || region.height == 0 {
            return fallback(CropFallback::EmptyRegion);
        }
        debug!(?region, "Scaled crop region");

        match self.draw(&decoded, region) {
            Ok(image) => CropOutcome::Cropped { image, region },
            Err(e) => fallback(CropFallback::Encode(e)),
        }
    }

    /// Paint the region onto an opaque canvas so transparency ends up as background
    fn draw(&self, source: &DynamicImage, region: PixelRect) -> Result<ImageDataUri, String> {
        let cut = source
            .crop_imm(region.x as u32, region.y as u32, region.width, region.height)
            .to_rgba8();
        let mut canvas = RgbaImage::from_pixel(cut.width(), cut.height(), self.background);
        imageops::overlay(&mut canvas, &cut, 0, 0);

        let rgb = DynamicImage::ImageRgba8(canvas).to_rgb8();
        let bytes = encode_jpeg(&rgb, self.quality).map_err(|e| e.to_string())?;
        Ok(ImageDataUri::from_jpeg(&bytes))
    }
}

impl Default for CropEngine {
    fn default() -> Self {
        Self::new(100, [255, 255, 255])
    }
}
