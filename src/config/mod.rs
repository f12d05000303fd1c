//! Configuration: API location, polling cadence, notification and speech settings

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

/// Environment variable overriding `api_url` from the config file.
pub const API_URL_ENV: &str = "CORREIO_API_URL";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error(
        "API base URL is not set. Pass --api-url, set {} or run `correio configure --api-url <URL>`",
        API_URL_ENV
    )]
    MissingApiUrl,

    #[error("invalid API base URL {url:?}: {reason}")]
    InvalidApiUrl { url: String, reason: String },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the deployment, without the `/api/correio` suffix
    pub api_url: Option<String>,
    /// Per-request timeout
    pub request_timeout_secs: u64,
    /// Signature for sent messages; anonymous when unset
    pub sender_name: Option<String>,
    pub polling: PollingSettings,
    pub notification: NotificationSettings,
    pub speech: SpeechSettings,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: None,
            request_timeout_secs: 10,
            sender_name: None,
            polling: PollingSettings::default(),
            notification: NotificationSettings::default(),
            speech: SpeechSettings::default(),
        }
    }
}

/// Fixed intervals of the independent timers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingSettings {
    /// Latest-message poll
    pub latest_secs: u64,
    /// Balloon board refresh
    pub board_refresh_secs: u64,
    /// Balloon board page rotation
    pub carousel_secs: u64,
}

impl Default for PollingSettings {
    fn default() -> Self {
        Self {
            latest_secs: 5,
            board_refresh_secs: 10,
            carousel_secs: 5,
        }
    }
}

impl PollingSettings {
    pub fn latest(&self) -> Duration {
        Duration::from_secs(self.latest_secs.max(1))
    }

    pub fn board_refresh(&self) -> Duration {
        Duration::from_secs(self.board_refresh_secs.max(1))
    }

    pub fn carousel(&self) -> Duration {
        Duration::from_secs(self.carousel_secs.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Auto-close delay of a new-message notification
    pub notification_secs: u64,
    /// Ring the terminal bell while a notification is showing
    pub bell: bool,
    pub bell_every_secs: u64,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            notification_secs: 7,
            bell: true,
            bell_every_secs: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechSettings {
    pub enabled: bool,
    /// TTS program, called as `<command> -v <voice> -s <rate> <text>`
    pub command: String,
    /// Words per minute
    pub rate_wpm: u32,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "espeak-ng".to_string(),
            rate_wpm: 175,
        }
    }
}

impl Config {
    /// Get config directory path
    fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("br", "correio-elegante", "correio")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from disk
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        toml::from_str(&content).context("Failed to parse config file")
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let dir = Self::config_dir()?;
        fs::create_dir_all(&dir).context("Failed to create config directory")?;

        let path = Self::config_path()?;
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(&path, content).context("Failed to write config file")?;
        tracing::info!("Saved configuration to {}", path.display());
        Ok(())
    }

    /// Resolve the API base URL: flag, then environment, then config file.
    pub fn api_url(&self, flag: Option<&str>) -> Result<Url, ConfigError> {
        let env = std::env::var(API_URL_ENV).ok();
        pick_api_url(flag, env.as_deref(), self.api_url.as_deref())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs.max(1))
    }
}

/// First non-blank candidate, validated as an http(s) URL.
fn pick_api_url(
    flag: Option<&str>,
    env: Option<&str>,
    file: Option<&str>,
) -> Result<Url, ConfigError> {
    let raw = [flag, env, file]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|s| !s.is_empty())
        .ok_or(ConfigError::MissingApiUrl)?;
    parse_api_url(raw)
}

/// Validate a base URL as an http(s) URL.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let raw = raw.trim();
    let url = Url::parse(raw).map_err(|e| ConfigError::InvalidApiUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidApiUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme {}", url.scheme()),
        });
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_missing_url_is_an_error() {
        assert!(matches!(
            pick_api_url(None, None, None),
            Err(ConfigError::MissingApiUrl)
        ));
        assert!(matches!(
            pick_api_url(Some("  "), None, Some("")),
            Err(ConfigError::MissingApiUrl)
        ));
    }

    #[test]
    fn test_url_precedence() {
        let url = pick_api_url(Some("http://flag"), Some("http://env"), Some("http://file")).unwrap();
        assert_eq!(url.host_str(), Some("flag"));
        let url = pick_api_url(None, Some("http://env"), Some("http://file")).unwrap();
        assert_eq!(url.host_str(), Some("env"));
        let url = pick_api_url(None, None, Some("http://file:5046/")).unwrap();
        assert_eq!(url.port(), Some(5046));
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(matches!(
            pick_api_url(Some("not a url"), None, None),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
        assert!(matches!(
            pick_api_url(Some("ftp://example.com"), None, None),
            Err(ConfigError::InvalidApiUrl { .. })
        ));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: Config = toml::from_str(
            r#"
            api_url = "http://localhost:5046"

            [polling]
            latest_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.polling.latest(), Duration::from_secs(3));
        assert_eq!(config.polling.board_refresh(), Duration::from_secs(10));
        assert_eq!(config.polling.carousel(), Duration::from_secs(5));
        assert_eq!(config.notification, NotificationSettings::default());
        assert_eq!(config.speech.command, "espeak-ng");
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = Config {
            api_url: Some("https://correio.example.com".to_string()),
            sender_name: Some("Zé".to_string()),
            ..Config::default()
        };
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back, config);
    }
}
