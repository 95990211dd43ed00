use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};
use tadabbur_config::Config;

const MAIN_PROFILE: &str = "main";

/// Represents a user profile
#[derive(Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub value: Config,
}

/// JSON profiles under the user's config directory
pub struct ProfileStore {
    root: PathBuf,
}

impl ProfileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<config dir>/tadabbur/profiles`
    pub fn user() -> anyhow::Result<Self> {
        let base = dirs::config_dir().context("no user config directory on this platform")?;
        Ok(Self::new(base.join("tadabbur").join("profiles")))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(format!("{name}.json"))
    }

    fn read(&self, path: &Path) -> anyhow::Result<Config> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("reading profile {}", path.display()))?;
        let profile: Profile = serde_json::from_str(&data)
            .with_context(|| format!("parsing profile {}", path.display()))?;
        Ok(profile.value)
    }

    fn write(&self, name: &str, value: Config) -> anyhow::Result<PathBuf> {
        let file = self.path(name);
        let profile = Profile {
            name: name.into(),
            value,
        };
        fs::write(&file, serde_json::to_string_pretty(&profile)?)
            .with_context(|| format!("writing profile {}", file.display()))?;
        Ok(file)
    }

    /// Create the profile folder and a default main profile if missing.
    /// Env overrides are applied at load time, never written out.
    pub fn init(&self) -> anyhow::Result<()> {
        fs::create_dir_all(self.root())
            .with_context(|| format!("creating {}", self.root().display()))?;

        if !self.path(MAIN_PROFILE).exists() {
            self.write(MAIN_PROFILE, Config::default())?;
            tracing::info!("Created main profile in {}", self.root().display());
        }
        Ok(())
    }

    /// Load a profile by name, falling back to main and then to defaults
    pub fn load(&self, name: &str) -> anyhow::Result<Config> {
        let file = self.path(name);
        if file.exists() {
            return self.read(&file);
        }

        tracing::warn!("Profile {name} not found, falling back to main profile or env defaults");
        let main = self.path(MAIN_PROFILE);
        if main.exists() {
            self.read(&main)
        } else {
            Ok(Config::default())
        }
    }

    /// Add a new profile cloned from main
    pub fn add_from_main(&self, new_name: &str) -> anyhow::Result<PathBuf> {
        let config = self.load(MAIN_PROFILE)?;
        let file = self.write(new_name, config)?;
        tracing::info!("Created new profile: {new_name}");
        Ok(file)
    }
}

#[cfg(test)]
mod tests {
    use tadabbur_types::Language;

    use super::*;

    #[test]
    fn test_init_creates_main_once() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("profiles"));

        store.init().unwrap();
        let main = store.root().join("main.json");
        assert!(main.exists());

        fs::write(&main, r#"{"name":"main","value":{"ui":{"language":"French"}}}"#).unwrap();
        store.init().unwrap();
        assert_eq!(store.load("main").unwrap().ui.language, Language::French);
    }

    #[test]
    fn test_first_run_main_profile_leaves_url_to_environment() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        store.init().unwrap();

        let written = fs::read_to_string(dir.path().join("main.json")).unwrap();
        assert!(!written.contains("base_url"));

        let mut config = store.load("main").unwrap();
        config
            .api
            .apply_overrides(|key| (key == "TADABBUR_ENV").then(|| "production".into()));
        assert_eq!(config.api.base_url(), tadabbur_config::api::PRODUCTION_URL);
    }

    #[test]
    fn test_missing_profile_falls_back_to_main() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(
            dir.path().join("main.json"),
            r#"{"name":"main","value":{"api":{"base_url":"http://10.0.0.5:8000"}}}"#,
        )
        .unwrap();

        let config = store.load("phone").unwrap();
        assert_eq!(config.api.base_url(), "http://10.0.0.5:8000");
        assert_eq!(config.api.timeout_ms, 10_000);
    }

    #[test]
    fn test_no_profiles_at_all_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path().join("absent"));
        let config = store.load("anything").unwrap();
        assert_eq!(config.camera.capture_quality, 80);
    }

    #[test]
    fn test_add_profile_copies_main() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(
            dir.path().join("main.json"),
            r#"{"name":"main","value":{"crop":{"output_quality":90}}}"#,
        )
        .unwrap();

        let file = store.add_from_main("study").unwrap();
        assert!(file.ends_with("study.json"));
        assert_eq!(store.load("study").unwrap().crop.output_quality, 90);
    }

    #[test]
    fn test_corrupt_profile_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProfileStore::new(dir.path());
        fs::write(dir.path().join("main.json"), "{ nope").unwrap();
        assert!(store.load("main").is_err());
    }
}
