use serde::{Deserialize, Serialize};

use self::api::ApiConfig;
use self::camera::CameraConfig;
use self::crop::CropConfig;
use self::ui::UiConfig;

pub mod api;
pub mod camera;
pub mod crop;
pub mod ui;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub camera: CameraConfig,
    pub crop: CropConfig,
    pub ui: UiConfig,
}

impl Config {
    /// Environment overrides on top of values loaded from a profile
    pub fn apply_env(&mut self) {
        self.api.apply_env();
        self.ui.apply_env();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tadabbur_types::FacingMode;

    #[test]
    fn test_partial_json_fills_defaults() {
        let json = r#"{ "api": { "base_url": "http://10.0.0.2:8000" }, "ui": { "language": "French" } }"#;
        let config: Config = serde_json::from_str(json).unwrap();

        assert_eq!(config.api.base_url(), "http://10.0.0.2:8000");
        assert_eq!(config.api.timeout_ms, 10_000);
        assert_eq!(config.camera.facing_mode, FacingMode::Environment);
        assert_eq!(config.camera.capture_quality, 80);
        assert_eq!(config.crop.output_quality, 100);
        assert_eq!(config.ui.language, tadabbur_types::Language::French);
    }

    #[test]
    fn test_empty_json_is_default() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.camera.ideal_width, 1280);
        assert_eq!(config.camera.ideal_height, 720);
        assert_eq!(config.crop.background, [255, 255, 255]);
    }
}
