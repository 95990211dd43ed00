use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language the processing service answers in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    #[default]
    Arabic,
    English,
    French,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::Arabic => "Arabic",
            Language::English => "English",
            Language::French => "French",
        }
    }
}

impl std::fmt::Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown language: {0}")]
pub struct UnknownLanguage(pub String);

impl FromStr for Language {
    type Err = UnknownLanguage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "arabic" | "ar" => Ok(Language::Arabic),
            "english" | "en" => Ok(Language::English),
            "french" | "fr" => Ok(Language::French),
            _ => Err(UnknownLanguage(s.to_string())),
        }
    }
}
