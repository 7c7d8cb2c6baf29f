use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::error::Result;
use crate::language::SupportedLanguage;
use crate::session::{MatchMode, SessionConfig, DEFAULT_NUMBER_OF_SECS, DEFAULT_NUMBER_OF_WORDS};

/// Persisted user preferences
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub number_of_words: usize,
    pub number_of_secs: u32,
    pub supported_language: SupportedLanguage,
    pub match_mode: MatchMode,
    pub penalize_mismatch: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            number_of_words: DEFAULT_NUMBER_OF_WORDS,
            number_of_secs: DEFAULT_NUMBER_OF_SECS,
            supported_language: SupportedLanguage::English,
            match_mode: MatchMode::Live,
            penalize_mismatch: false,
        }
    }
}

impl Config {
    /// Session parameters for this config, validated
    pub fn session_config(&self) -> Result<SessionConfig> {
        let cfg = SessionConfig {
            number_of_words: self.number_of_words,
            number_of_secs: self.number_of_secs,
            match_mode: self.match_mode,
            penalize_mismatch: self.penalize_mismatch,
            ..SessionConfig::default()
        };
        cfg.validate()?;
        Ok(cfg)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "speedtyper") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("speedtyper_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        let Ok(bytes) = fs::read(&self.path) else {
            return Config::default();
        };
        match serde_json::from_slice::<Config>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "ignoring malformed config");
                Config::default()
            }
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SessionError;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("config.json"));
        let cfg = Config::default();
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn save_and_load_custom_config() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("nested").join("config.json"));
        let cfg = Config {
            number_of_words: 40,
            number_of_secs: 30,
            supported_language: SupportedLanguage::EnglishLong,
            match_mode: MatchMode::Submit,
            penalize_mismatch: true,
        };
        store.save(&cfg).unwrap();
        assert_eq!(cfg, store.load());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let store = FileConfigStore::with_path(dir.path().join("absent.json"));
        assert_eq!(store.load(), Config::default());
    }

    #[test]
    fn malformed_file_loads_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(FileConfigStore::with_path(&path).load(), Config::default());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, br#"{"match_mode":"submit"}"#).unwrap();

        let cfg = FileConfigStore::with_path(&path).load();
        assert_eq!(cfg.match_mode, MatchMode::Submit);
        assert_eq!(cfg.number_of_words, 80);
        assert_eq!(cfg.number_of_secs, 60);
    }

    #[test]
    fn session_config_rejects_zero_duration() {
        let cfg = Config {
            number_of_secs: 0,
            ..Config::default()
        };
        assert_matches!(cfg.session_config(), Err(SessionError::InvalidConfiguration(_)));
    }

    #[test]
    fn session_config_carries_mode() {
        let cfg = Config {
            match_mode: MatchMode::Submit,
            penalize_mismatch: true,
            ..Config::default()
        };
        let session = cfg.session_config().unwrap();
        assert_eq!(session.match_mode, MatchMode::Submit);
        assert!(session.penalize_mismatch);
        assert_eq!(session.progress_ceiling, 100.0);
    }
}
