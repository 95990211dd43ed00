use std::fmt;

use chrono::{DateTime, Local};
use tadabbur_types::{Language, ScanResult};

pub const NO_TAFSIR: &str = "Tafsir not available for this ayah.";

const NO_AYAH: &str = "(no ayah)";
const NO_TRANSLATION: &str = "(no translation)";
const NO_REFLECTION: &str = "(no reflection yet)";
const NO_DATE: &str = "(undated)";

fn or_placeholder<'a>(value: &'a str, placeholder: &'a str) -> &'a str {
    let value = value.trim();
    if value.is_empty() { placeholder } else { value }
}

/// "Today at 2:30 PM", "Yesterday at 9:15 AM", otherwise the calendar date
pub fn format_relative_date(at: DateTime<Local>, now: DateTime<Local>) -> String {
    let time = at.format("%-I:%M %p");
    let days = now.date_naive().signed_duration_since(at.date_naive()).num_days();
    match days {
        0 => format!("Today at {time}"),
        1 => format!("Yesterday at {time}"),
        _ => format!("{} at {time}", at.format("%-d %b %Y")),
    }
}

/// Summary card for the home screen's recent reflections
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReflectionCard {
    pub ayah: String,
    pub translation: String,
    pub reflection: String,
    pub date: String,
}

impl ReflectionCard {
    pub fn from_scan(result: &ScanResult, at: DateTime<Local>, now: DateTime<Local>) -> Self {
        Self {
            ayah: result.ayah.clone(),
            translation: result.translation.clone(),
            reflection: result.tafsir.clone().unwrap_or_default(),
            date: format_relative_date(at, now),
        }
    }
}

impl fmt::Display for ReflectionCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", or_placeholder(&self.ayah, NO_AYAH))?;
        writeln!(f, "  {}", or_placeholder(&self.translation, NO_TRANSLATION))?;
        writeln!(f, "  ---")?;
        writeln!(f, "  {}", or_placeholder(&self.reflection, NO_REFLECTION))?;
        write!(f, "  {}", or_placeholder(&self.date, NO_DATE))
    }
}

/// Results screen for an accepted scan
#[derive(Debug, Clone, PartialEq)]
pub struct ResultsView {
    pub ayah: String,
    pub translation: Option<String>,
    pub tafsir: String,
    pub language: Language,
    pub has_image: bool,
}

impl From<&ScanResult> for ResultsView {
    fn from(result: &ScanResult) -> Self {
        Self {
            ayah: result.ayah.clone(),
            translation: Some(result.translation.clone()).filter(|t| !t.trim().is_empty()),
            tafsir: result
                .tafsir
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| NO_TAFSIR.to_string()),
            language: result.language,
            has_image: result.image.is_some(),
        }
    }
}

impl fmt::Display for ResultsView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extracted Ayah")?;
        writeln!(f, "Results from {} text processing", self.language)?;
        if self.has_image {
            writeln!(f, "[processed image attached]")?;
        }
        writeln!(f)?;
        writeln!(f, "{}", or_placeholder(&self.ayah, NO_AYAH))?;
        if let Some(translation) = &self.translation {
            writeln!(f)?;
            writeln!(f, "{translation}")?;
        }
        writeln!(f)?;
        writeln!(f, "Tafsir & Explanation")?;
        write!(f, "{}", self.tafsir)
    }
}
