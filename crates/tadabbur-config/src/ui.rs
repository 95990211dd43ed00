use std::env;

use serde::{Deserialize, Serialize};
use tadabbur_types::Language;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(default)]
pub struct UiConfig {
    pub language: Language,
}

impl UiConfig {
    pub fn apply_env(&mut self) {
        if let Some(language) = env::var("TADABBUR_LANGUAGE").ok().and_then(|v| v.parse().ok()) {
            self.language = language;
        }
    }
}
