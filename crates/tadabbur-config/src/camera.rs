use serde::{Deserialize, Serialize};
use tadabbur_types::FacingMode;

fn default_facing_mode() -> FacingMode {
    FacingMode::Environment
}

fn default_ideal_width() -> u32 {
    1280
}

fn default_ideal_height() -> u32 {
    720
}

fn default_capture_quality() -> u8 {
    80
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CameraConfig {
    #[serde(default = "default_facing_mode")]
    pub facing_mode: FacingMode,
    #[serde(default = "default_ideal_width")]
    pub ideal_width: u32,
    #[serde(default = "default_ideal_height")]
    pub ideal_height: u32,
    /// JPEG quality (1-100) for captured frames
    #[serde(default = "default_capture_quality")]
    pub capture_quality: u8,
    /// Still image served as the camera feed by the file backend
    pub still_image: Option<String>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            facing_mode: default_facing_mode(),
            ideal_width: default_ideal_width(),
            ideal_height: default_ideal_height(),
            capture_quality: default_capture_quality(),
            still_image: None,
        }
    }
}
