use std::path::PathBuf;

use crate::config::{Config, ConfigError};

/// Manages loading and saving settings to a TOML file on disk.
pub struct SettingsManager {
    path: PathBuf,
}

impl SettingsManager {
    /// Create a new `SettingsManager` that reads/writes the given file path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Create a `SettingsManager` using the default config location
    /// (`~/.config/studymate/settings.toml`).
    pub fn default_path() -> Self {
        let path = dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config")
            .join("studymate")
            .join("settings.toml");
        Self { path }
    }

    /// Load config from the TOML file on disk.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let text =
            std::fs::read_to_string(&self.path).map_err(|e| ConfigError::Io(e.to_string()))?;
        let cfg: Config = toml::from_str(&text).map_err(|e| ConfigError::Parse(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Save config to the TOML file on disk, creating parent directories if
    /// they don't exist.
    pub fn save(&self, config: &Config) -> Result<(), ConfigError> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::Io(e.to_string()))?;
        }
        let text = config.to_toml()?;
        std::fs::write(&self.path, text).map_err(|e| ConfigError::Io(e.to_string()))?;
        Ok(())
    }

    /// Load config from disk, falling back to `Config::default()` when the
    /// file is missing or unparseable.
    pub fn load_or_default(&self) -> Config {
        match self.load() {
            Ok(cfg) => cfg,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "using default settings");
                Config::default()
            }
        }
    }

    /// Return the file path this manager reads/writes.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_settings_path() -> (tempfile::TempDir, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        (dir, path)
    }

    #[test]
    fn save_and_load_roundtrip() {
        let (_dir, path) = tmp_settings_path();
        let mgr = SettingsManager::new(&path);

        let mut cfg = Config::default();
        cfg.backend.base_url = "http://localhost:9000".into();
        cfg.user.id = Some("u-roundtrip".into());
        cfg.user.display_name = Some("Test User".into());
        cfg.study.default_card_count = 20;

        mgr.save(&cfg).unwrap();
        let loaded = mgr.load().unwrap();

        assert_eq!(loaded.backend.base_url, "http://localhost:9000");
        assert_eq!(loaded.user.id.as_deref(), Some("u-roundtrip"));
        assert_eq!(loaded.user.display_name.as_deref(), Some("Test User"));
        assert_eq!(loaded.study.default_card_count, 20);
    }

    #[test]
    fn load_or_default_returns_default_on_missing_file() {
        let (_dir, path) = tmp_settings_path();
        let mgr = SettingsManager::new(&path);

        let cfg = mgr.load_or_default();
        assert_eq!(cfg.backend.base_url, "https://api.studymate.app");
        assert!(cfg.user.id.is_none());
    }

    #[test]
    fn load_missing_file_returns_error() {
        let (_dir, path) = tmp_settings_path();
        let mgr = SettingsManager::new(&path);
        assert!(mgr.load().is_err());
    }

    #[test]
    fn save_rejects_invalid_config() {
        let (_dir, path) = tmp_settings_path();
        let mgr = SettingsManager::new(&path);

        let mut cfg = Config::default();
        cfg.backend.base_url = String::new();
        assert!(mgr.save(&cfg).is_err());
        assert!(!path.exists());
    }

    #[test]
    fn save_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mgr = SettingsManager::new(&path);

        mgr.save(&Config::default()).unwrap();
        assert!(path.exists());
    }
}
