//! Shell configuration

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use harbor_navigation::{SearchEngine, BROWSE_HISTORY_LIMIT, DEFAULT_ENGINE};
use harbor_download::DOWNLOAD_HISTORY_LIMIT;
use harbor_session::SessionOptions;

use crate::error::CoreError;
use crate::Result;

/// Optional override file looked up in the data directory
pub const CONFIG_FILE_NAME: &str = "harbor.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Key-value store backing preferences and history
    pub database_path: PathBuf,
    /// Where the host saves downloads
    pub download_dir: PathBuf,
    /// Document loaded for `app://home`
    pub home_page_url: String,
    /// Document loaded for `app://settings`
    pub settings_page_url: String,
    pub browse_history_limit: usize,
    pub download_history_limit: usize,
    /// Engine key used until the user picks one
    pub search_engine: String,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        let download_dir = dirs::download_dir().unwrap_or_else(|| data_dir.join("Downloads"));
        let pages = data_dir.join("pages");

        Self {
            database_path: data_dir.join("harbor.db"),
            download_dir,
            home_page_url: file_url(&pages.join("home.html")),
            settings_page_url: file_url(&pages.join("settings.html")),
            browse_history_limit: BROWSE_HISTORY_LIMIT,
            download_history_limit: DOWNLOAD_HISTORY_LIMIT,
            search_engine: DEFAULT_ENGINE.to_string(),
        }
    }

    pub fn data_dir() -> PathBuf {
        dirs::data_local_dir()
            .map(|d| d.join("Harbor"))
            .unwrap_or_else(|| PathBuf::from(".harbor"))
    }

    /// Defaults overridden by `path` (or `harbor.json` in the data dir).
    ///
    /// A missing, unreadable or invalid file yields the defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| Self::data_dir().join(CONFIG_FILE_NAME));

        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Self::default();
        }

        match Self::from_file(&path) {
            Ok(config) => {
                tracing::info!(path = %path.display(), "Loaded config");
                config
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring config file");
                Self::default()
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.browse_history_limit == 0 || self.download_history_limit == 0 {
            return Err(CoreError::Config("history limits must be positive".to_string()));
        }
        for url in [&self.home_page_url, &self.settings_page_url] {
            Url::parse(url).map_err(|e| CoreError::Config(format!("{}: {}", url, e)))?;
        }
        if SearchEngine::find(&self.search_engine).is_none() {
            return Err(CoreError::Config(format!(
                "unknown search engine {}",
                self.search_engine
            )));
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            home_url: self.home_page_url.clone(),
            settings_url: self.settings_page_url.clone(),
            browse_history_limit: self.browse_history_limit,
            download_history_limit: self.download_history_limit,
            default_search_engine: self.search_engine.clone(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn file_url(path: &Path) -> String {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };

    Url::from_file_path(&absolute)
        .map(|url| url.to_string())
        .unwrap_or_else(|_| format!("file://{}", absolute.display()))
}

/// Platform directories from the usual environment variables.
mod dirs {
    use std::env;
    use std::path::PathBuf;

    fn env_path(key: &str) -> Option<PathBuf> {
        env::var_os(key)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from)
    }

    fn home() -> Option<PathBuf> {
        env_path("HOME")
    }

    pub fn data_local_dir() -> Option<PathBuf> {
        if cfg!(target_os = "windows") {
            env_path("LOCALAPPDATA")
        } else if cfg!(target_os = "macos") {
            home().map(|h| h.join("Library/Application Support"))
        } else {
            env_path("XDG_DATA_HOME").or_else(|| home().map(|h| h.join(".local/share")))
        }
    }

    pub fn download_dir() -> Option<PathBuf> {
        if cfg!(target_os = "windows") {
            env_path("USERPROFILE").map(|h| h.join("Downloads"))
        } else if cfg!(target_os = "macos") {
            home().map(|h| h.join("Downloads"))
        } else {
            env_path("XDG_DOWNLOAD_DIR").or_else(|| home().map(|h| h.join("Downloads")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::new(dir.path().to_path_buf());

        assert_eq!(config.database_path, dir.path().join("harbor.db"));
        assert_eq!(config.browse_history_limit, 60);
        assert_eq!(config.download_history_limit, 40);
        assert!(config.home_page_url.starts_with("file://"));
        assert!(config.settings_page_url.ends_with("/pages/settings.html"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, r#"{"browse_history_limit": 5, "search_engine": "ecosia"}"#)
            .unwrap();

        let config = Config::load(Some(&path));
        assert_eq!(config.browse_history_limit, 5);
        assert_eq!(config.search_engine, "ecosia");
        assert_eq!(config.download_history_limit, 40);
        assert_eq!(config.session_options().browse_history_limit, 5);
    }

    #[test]
    fn test_invalid_files_fall_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);

        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(
            Config::from_file(&path),
            Err(CoreError::Serialization(_))
        ));
        assert_eq!(Config::load(Some(&path)).browse_history_limit, 60);

        std::fs::write(&path, r#"{"download_history_limit": 0}"#).unwrap();
        assert!(matches!(Config::from_file(&path), Err(CoreError::Config(_))));

        std::fs::write(&path, r#"{"search_engine": "altavista"}"#).unwrap();
        assert_eq!(Config::load(Some(&path)).search_engine, "duckduckgo");

        assert_eq!(
            Config::load(Some(&dir.path().join("missing.json"))).search_engine,
            "duckduckgo"
        );
    }
}
