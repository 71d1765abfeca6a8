//! Configuration management for oddsacquire.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default config file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "oddsacquire.toml";

/// Default delay between historical-odds page requests.
pub const DEFAULT_HISTORICAL_DELAY_MS: u64 = 1500;

/// Default delay between week-page requests. The week-page origin is
/// stricter about crawl rate, so this is double the historical delay.
pub const DEFAULT_WEEK_PAGES_DELAY_MS: u64 = 3000;

/// Default delay before a live-odds snapshot request.
pub const DEFAULT_LIVE_DELAY_MS: u64 = 1500;

/// Application settings loaded from file and environment.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub scraper: ScraperSettings,
    #[serde(default)]
    pub database: DatabaseSettings,
}

/// Object-store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root directory for stored artifacts.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Key prefix for the week-page archive.
    #[serde(default = "default_week_pages_prefix")]
    pub week_pages_prefix: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            week_pages_prefix: default_week_pages_prefix(),
        }
    }
}

/// Scraper pacing and identification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperSettings {
    /// Delay before each historical-odds page request, in milliseconds.
    #[serde(default = "default_historical_delay_ms")]
    pub historical_delay_ms: u64,
    /// Delay before each week-page request, in milliseconds.
    #[serde(default = "default_week_pages_delay_ms")]
    pub week_pages_delay_ms: u64,
    /// Delay before a live-odds request, in milliseconds.
    #[serde(default = "default_live_delay_ms")]
    pub live_delay_ms: u64,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Custom User-Agent string (None uses the built-in default).
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self {
            historical_delay_ms: default_historical_delay_ms(),
            week_pages_delay_ms: default_week_pages_delay_ms(),
            live_delay_ms: default_live_delay_ms(),
            timeout_secs: default_timeout_secs(),
            user_agent: None,
        }
    }
}

/// Audit database settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// Path to the SQLite audit database.
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_week_pages_prefix() -> String {
    "pff-historical-games".to_string()
}

fn default_historical_delay_ms() -> u64 {
    DEFAULT_HISTORICAL_DELAY_MS
}

fn default_week_pages_delay_ms() -> u64 {
    DEFAULT_WEEK_PAGES_DELAY_MS
}

fn default_live_delay_ms() -> u64 {
    DEFAULT_LIVE_DELAY_MS
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_db_path() -> PathBuf {
    PathBuf::from("data").join("oddsacquire.db")
}

impl Settings {
    /// Load settings from a config file (explicit path or the default
    /// location), then apply flat environment variable overrides.
    pub fn load(config_path: Option<&Path>) -> anyhow::Result<Self> {
        let path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

        let mut settings = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            toml::from_str(&raw)?
        } else if config_path.is_some() {
            anyhow::bail!("config file not found: {}", path.display());
        } else {
            Settings::default()
        };

        settings.apply_env_overrides();
        Ok(settings)
    }

    /// Apply flat environment variable overrides.
    fn apply_env_overrides(&mut self) {
        if let Ok(dir) = std::env::var("ODDS_DATA_DIR") {
            if !dir.is_empty() {
                self.storage.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(prefix) = std::env::var("ODDS_WEEK_PAGES_PREFIX") {
            if !prefix.is_empty() {
                self.storage.week_pages_prefix = prefix;
            }
        }
        if let Ok(db) = std::env::var("ODDS_DB_PATH") {
            if !db.is_empty() {
                self.database.path = PathBuf::from(db);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.storage.data_dir, PathBuf::from("data"));
        assert_eq!(settings.storage.week_pages_prefix, "pff-historical-games");
        assert_eq!(settings.scraper.historical_delay_ms, 1500);
        assert_eq!(settings.scraper.week_pages_delay_ms, 3000);
        assert_eq!(settings.scraper.timeout_secs, 30);
        assert!(settings.scraper.user_agent.is_none());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let settings: Settings = toml::from_str(
            r#"
            [storage]
            data_dir = "/var/lib/odds"

            [scraper]
            week_pages_delay_ms = 5000
            "#,
        )
        .unwrap();
        assert_eq!(settings.storage.data_dir, PathBuf::from("/var/lib/odds"));
        assert_eq!(settings.storage.week_pages_prefix, "pff-historical-games");
        assert_eq!(settings.scraper.week_pages_delay_ms, 5000);
        assert_eq!(settings.scraper.historical_delay_ms, 1500);
    }

    #[test]
    fn test_empty_toml_is_all_defaults() {
        let settings: Settings = toml::from_str("").unwrap();
        assert_eq!(settings.database.path, PathBuf::from("data/oddsacquire.db"));
    }
}
