use image::RgbImage;
use image::codecs::jpeg::JpegEncoder;

use crate::error::CaptureError;

/// Encode an RGB bitmap as JPEG at the given quality (1-100)
pub fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality.clamp(1, 100));
    image
        .write_with_encoder(encoder)
        .map_err(|e| CaptureError::Encode(format!("JPEG encoding failed: {e}")))?;
    Ok(buffer)
}
