use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ActivityFormat;
use crate::error::{SyncError, SyncResult};

const APP_DIR: &str = "activity-sync";

/// Cross-platform configuration directory manager
pub struct ConfigManager;

impl ConfigManager {
    /// Get the main configuration directory path following platform conventions:
    /// - Linux: $XDG_CONFIG_HOME/activity-sync or ~/.config/activity-sync
    /// - macOS: ~/Library/Application Support/activity-sync
    /// - Windows: %APPDATA%\activity-sync
    pub fn config_dir() -> Result<PathBuf> {
        #[cfg(target_os = "linux")]
        {
            if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
                Ok(PathBuf::from(xdg_config).join(APP_DIR))
            } else {
                let home = dirs::home_dir().context("Failed to get home directory")?;
                Ok(home.join(".config").join(APP_DIR))
            }
        }

        #[cfg(target_os = "macos")]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join("Library").join("Application Support").join(APP_DIR))
        }

        #[cfg(target_os = "windows")]
        {
            Ok(dirs::config_dir()
                .context("Failed to get Windows config directory")?
                .join(APP_DIR))
        }

        #[cfg(not(any(target_os = "linux", target_os = "macos", target_os = "windows")))]
        {
            let home = dirs::home_dir().context("Failed to get home directory")?;
            Ok(home.join(format!(".{APP_DIR}")))
        }
    }

    /// Get the default config file path (config.toml)
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Get the default cursor store path (cursors.json)
    pub fn cursor_store_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("cursors.json"))
    }

    /// Get the latest sync report path
    pub fn sync_report_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("latest-sync-report.json"))
    }

    /// Get the log file path
    pub fn log_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("activity-sync.log"))
    }

    /// Ensure the configuration directory exists
    pub fn ensure_config_dir() -> Result<PathBuf> {
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;
        Ok(config_dir)
    }
}

/// Source (Garmin Connect) account settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    pub username: String,

    /// Prompted for on a terminal when left out of the file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    #[serde(default = "default_source_url")]
    pub base_url: String,

    /// Number of most recent activities requested from the feed
    #[serde(default = "default_feed_limit")]
    pub feed_limit: usize,
}

fn default_source_url() -> String {
    "https://connect.garmin.com".to_string()
}

fn default_feed_limit() -> usize {
    100
}

/// Destination (Strava) account settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DestinationConfig {
    pub access_token: String,

    #[serde(default = "default_destination_url")]
    pub base_url: String,
}

fn default_destination_url() -> String {
    "https://www.strava.com/api/v3".to_string()
}

/// Sync engine tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncOptions {
    /// How long to wait for the destination to finish processing uploads
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u64,

    /// Pause between two status checks of the same upload
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Format activities are downloaded and uploaded in
    #[serde(default)]
    pub format: ActivityFormat,

    /// Reject feeds whose activity ids are not strictly descending
    #[serde(default)]
    pub verify_feed_order: bool,
}

fn default_poll_timeout_secs() -> u64 {
    60
}

fn default_poll_interval_ms() -> u64 {
    1000
}

impl Default for SyncOptions {
    fn default() -> Self {
        SyncOptions {
            poll_timeout_secs: default_poll_timeout_secs(),
            poll_interval_ms: default_poll_interval_ms(),
            format: ActivityFormat::default(),
            verify_feed_order: false,
        }
    }
}

impl SyncOptions {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Application configuration, loaded once per invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Cursor store file; defaults to `cursors.json` in the config directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database_path: Option<PathBuf>,

    pub source: SourceConfig,

    pub destination: DestinationConfig,

    #[serde(default)]
    pub sync: SyncOptions,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> SyncResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            SyncError::Config(format!(
                "unable to read config file {}: {}",
                path.display(),
                e
            ))
        })?;

        Self::parse(&content)
            .map_err(|e| SyncError::Config(format!("invalid config file {}: {}", path.display(), e)))
    }

    /// Load from `path`, or from the default config file when `None`
    pub fn load_or_default_path(path: Option<&Path>) -> SyncResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = ConfigManager::config_file_path()
                    .map_err(|e| SyncError::Config(format!("{:#}", e)))?;
                Self::load(&default_path)
            }
        }
    }

    fn parse(content: &str) -> std::result::Result<Self, String> {
        let config: AppConfig = toml::from_str(content).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.source.username.trim().is_empty() {
            return Err("source.username must not be empty".to_string());
        }
        if self.destination.access_token.trim().is_empty() {
            return Err("destination.access_token must not be empty".to_string());
        }
        if self.source.feed_limit == 0 {
            return Err("source.feed_limit must be at least 1".to_string());
        }
        Ok(())
    }

    /// Resolve the cursor store path: explicit override, then the config
    /// file's `database_path`, then the default location.
    pub fn store_path(&self, override_path: Option<&Path>) -> SyncResult<PathBuf> {
        if let Some(path) = override_path {
            return Ok(path.to_path_buf());
        }
        if let Some(path) = &self.database_path {
            return Ok(path.clone());
        }
        ConfigManager::cursor_store_path().map_err(|e| SyncError::Config(format!("{:#}", e)))
    }
}
