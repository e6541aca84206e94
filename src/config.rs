//! User configuration
//!
//! Read from `<config dir>/photo-booth/config.json`. Every field is
//! optional; a missing file means defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::errors::{BoothError, Result};
use crate::render::DEFAULT_JPEG_QUALITY;
use crate::state::library::Library;

/// Environment variable that points the booth at a photo folder
pub const STORAGE_DIR_ENV: &str = "PHOTO_BOOTH_STORAGE_DIR";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Local gallery database (defaults to the user data directory)
    pub database_path: Option<PathBuf>,
    /// Photo folder used as upload target; no folder means local-only
    pub storage_dir: Option<PathBuf>,
    /// JPEG quality for baked photos (1 to 100)
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: None,
            storage_dir: None,
            jpeg_quality: DEFAULT_JPEG_QUALITY,
        }
    }
}

impl Config {
    /// Default location of the config file
    pub fn default_path() -> Option<PathBuf> {
        let mut path = dirs::config_dir()?;
        path.push("photo-booth");
        path.push("config.json");
        Some(path)
    }

    /// Load from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let config = match Self::default_path() {
            Some(path) => Self::load_from(&path)?,
            None => Self::default(),
        };
        Ok(config.with_storage_override(std::env::var(STORAGE_DIR_ENV).ok()))
    }

    /// Load from an explicit path; a missing file yields defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut config: Config = serde_json::from_str(&text)
            .map_err(|e| BoothError::Config(format!("{}: {}", path.display(), e)))?;
        config.jpeg_quality = config.jpeg_quality.clamp(1, 100);
        Ok(config)
    }

    /// Replace the storage folder when an override is set and non-empty
    pub fn with_storage_override(mut self, storage_dir: Option<String>) -> Self {
        if let Some(dir) = storage_dir.filter(|dir| !dir.trim().is_empty()) {
            self.storage_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Database path to open, falling back to the user data directory
    pub fn resolved_database_path(&self) -> Result<PathBuf> {
        self.database_path
            .clone()
            .or_else(Library::default_path)
            .ok_or_else(|| BoothError::Config("could not determine user data directory".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.jpeg_quality, 95);
    }

    #[test]
    fn test_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"storage_dir": "/srv/photos", "jpeg_quality": 0}"#).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.storage_dir, Some(PathBuf::from("/srv/photos")));
        assert_eq!(config.database_path, None);
        assert_eq!(config.jpeg_quality, 1);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "storage_dir = nope").unwrap();

        assert!(matches!(Config::load_from(&path), Err(BoothError::Config(_))));
    }

    #[test]
    fn test_storage_override() {
        let config = Config::default().with_storage_override(Some("/mnt/booth".into()));
        assert_eq!(config.storage_dir, Some(PathBuf::from("/mnt/booth")));

        let untouched = Config::default().with_storage_override(Some("  ".into()));
        assert_eq!(untouched.storage_dir, None);
    }

    #[test]
    fn test_explicit_database_path_wins() {
        let config = Config {
            database_path: Some(PathBuf::from("/tmp/booth.db")),
            ..Config::default()
        };
        assert_eq!(config.resolved_database_path().unwrap(), PathBuf::from("/tmp/booth.db"));
    }
}
