use serde::{Deserialize, Serialize};

fn default_output_quality() -> u8 {
    100
}

fn default_background() -> [u8; 3] {
    [255, 255, 255]
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct CropConfig {
    /// Cropped images feed text extraction, so keep them near lossless
    #[serde(default = "default_output_quality")]
    pub output_quality: u8,
    #[serde(default = "default_background")]
    pub background: [u8; 3],
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            output_quality: default_output_quality(),
            background: default_background(),
        }
    }
}
