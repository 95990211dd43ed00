use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ProcessError;

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)\r?\n?[ \t]*```").expect("valid fence pattern")
});

/// Canonical response body: `{text, translation?, tafsir?}`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedResult {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub translation: Option<String>,
    #[serde(default)]
    pub tafsir: Option<String>,
}

impl ProcessedResult {
    /// Parse a response body, rejecting anything that is not a JSON object of the expected shape
    pub fn from_body(body: &[u8]) -> Result<Self, ProcessError> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| ProcessError::MalformedBody(format!("not JSON: {e}")))?;

        if !value.is_object() {
            return Err(ProcessError::MalformedBody(format!(
                "expected an object, got {value}"
            )));
        }

        serde_json::from_value(value)
            .map_err(|e| ProcessError::MalformedBody(format!("unexpected fields: {e}")))
    }
}

/// What the results view shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedContent {
    pub ayah: String,
    pub translation: String,
    pub tafsir: Option<String>,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    text: String,
    #[serde(default)]
    translation: Option<String>,
    #[serde(default)]
    tafsir: Option<String>,
}

impl ExtractedContent {
    pub fn from_result(result: &ProcessedResult) -> Self {
        if result.text.contains("```") {
            let mut content = Self::from_text(&result.text);
            if content.translation.trim().is_empty() {
                content.translation = non_empty(result.translation.clone()).unwrap_or_default();
            }
            if content.tafsir.is_none() {
                content.tafsir = non_empty(result.tafsir.clone());
            }
            return content;
        }

        Self {
            ayah: result.text.clone(),
            translation: result.translation.clone().unwrap_or_default(),
            tafsir: non_empty(result.tafsir.clone()),
        }
    }

    /// Interpret a text field that may hold a fenced JSON document.
    /// Anything that does not parse is shown verbatim as the ayah.
    pub fn from_text(raw: &str) -> Self {
        let candidate = match FENCED_BLOCK.captures(raw).and_then(|c| c.get(1)) {
            Some(inner) => inner.as_str().trim(),
            None => raw.trim(),
        };

        match serde_json::from_str::<Envelope>(candidate) {
            Ok(envelope) => Self {
                ayah: envelope.text,
                translation: envelope.translation.unwrap_or_default(),
                tafsir: non_empty(envelope.tafsir),
            },
            Err(e) => {
                if candidate.starts_with('{') {
                    tracing::warn!("Failed to parse embedded result JSON: {}", e);
                }
                Self {
                    ayah: raw.to_string(),
                    translation: String::new(),
                    tafsir: None,
                }
            }
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
