use std::env;

use serde::{Deserialize, Serialize};

pub const DEVELOPMENT_URL: &str = "http://127.0.0.1:8000";
pub const PRODUCTION_URL: &str = "https://api.tadabbur.app";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Environment::Development => DEVELOPMENT_URL,
            Environment::Production => PRODUCTION_URL,
        }
    }

    fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        }
    }
}

fn default_timeout_ms() -> u64 {
    10_000
}

/// Remote processing service settings
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct ApiConfig {
    pub environment: Environment,
    /// Explicit service address; unset means the environment's default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Whole-request bound; past it the request is aborted
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            base_url: None,
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl ApiConfig {
    pub fn base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.environment.default_base_url())
    }

    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| env::var(key).ok());
    }

    /// Overlay `TADABBUR_ENV`, `TADABBUR_API_URL` and `TADABBUR_TIMEOUT_MS`
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("TADABBUR_ENV") {
            self.environment = Environment::from_env_value(&value);
        }
        if let Some(url) = lookup("TADABBUR_API_URL").filter(|u| !u.trim().is_empty()) {
            self.base_url = Some(url);
        }
        if let Some(timeout_ms) = lookup("TADABBUR_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.timeout_ms = timeout_ms;
        }
    }
}
