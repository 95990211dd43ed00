use std::collections::VecDeque;
use std::sync::Arc;

use chrono::{DateTime, Local};
use tadabbur_config::Config;
use tadabbur_core::presentation::ReflectionCard;
use tadabbur_types::ScanResult;
use tokio::sync::RwLock;

const MAX_REFLECTIONS: usize = 20;

/// An accepted scan, kept for the home screen
#[derive(Debug, Clone)]
pub struct Reflection {
    pub result: ScanResult,
    pub at: DateTime<Local>,
}

pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub reflections: RwLock<VecDeque<Reflection>>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            reflections: RwLock::new(VecDeque::new()),
        }
    }

    /// Keeps the newest `MAX_REFLECTIONS`; the scanned image is not kept
    pub async fn remember(&self, mut result: ScanResult) {
        result.image = None;
        let mut reflections = self.reflections.write().await;
        if reflections.len() == MAX_REFLECTIONS {
            reflections.pop_front();
        }
        reflections.push_back(Reflection {
            result,
            at: Local::now(),
        });
    }

    /// Newest first
    pub async fn recent_cards(&self, limit: usize) -> Vec<ReflectionCard> {
        let now = Local::now();
        let reflections = self.reflections.read().await;
        reflections
            .iter()
            .rev()
            .take(limit)
            .map(|r| ReflectionCard::from_scan(&r.result, r.at, now))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use tadabbur_types::{ImageDataUri, Language};

    use super::*;

    fn scan(n: usize) -> ScanResult {
        ScanResult {
            ayah: format!("ayah {n}"),
            translation: String::new(),
            tafsir: None,
            language: Language::Arabic,
            image: Some(ImageDataUri::from_jpeg(&[0xFF, 0xD8, 0xFF])),
        }
    }

    #[tokio::test]
    async fn test_reflections_are_capped_newest_first() {
        let state = AppState::new(Config::default());
        for n in 0..MAX_REFLECTIONS + 5 {
            state.remember(scan(n)).await;
        }

        let reflections = state.reflections.read().await;
        assert_eq!(reflections.len(), MAX_REFLECTIONS);
        assert_eq!(reflections.front().unwrap().result.ayah, "ayah 5");
        assert!(reflections.iter().all(|r| r.result.image.is_none()));
        drop(reflections);

        let cards = state.recent_cards(3).await;
        let ayahs: Vec<_> = cards.iter().map(|c| c.ayah.as_str()).collect();
        assert_eq!(ayahs, ["ayah 24", "ayah 23", "ayah 22"]);
    }
}
