//! Configuration management

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::models::Tab;

/// Environment variable that overrides the saved backend URL for one run
pub const BACKEND_URL_ENV: &str = "MOVIE_TRACKER_BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_backend_url")]
    pub backend_url: String,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_true")]
    pub dark_mode: bool,
    #[serde(default = "default_font_size")]
    pub font_size: u32,
    // Restored on start
    #[serde(default)]
    pub last_tab: Tab,
    /// Set from the environment; never written back to disk
    #[serde(skip)]
    pub backend_override: Option<String>,
}

fn default_backend_url() -> String { "http://localhost:5001".to_string() }
fn default_request_timeout() -> u64 { 30 }
fn default_connect_timeout() -> u64 { 10 }
fn default_user_agent() -> String { format!("movie_tracker/{}", env!("CARGO_PKG_VERSION")) }
fn default_font_size() -> u32 { 14 }
fn default_true() -> bool { true }

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: default_backend_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
            dark_mode: true,
            font_size: default_font_size(),
            last_tab: Tab::Search,
            backend_override: None,
        }
    }
}

impl AppConfig {
    fn config_path() -> PathBuf {
        let mut path = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        path.push("movie_tracker");
        fs::create_dir_all(&path).ok();
        path.push("config.json");
        path
    }

    /// Load the saved config, then apply the environment override.
    pub fn load() -> Self {
        let mut config = Self::load_from_disk();
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            config.apply_backend_override(&url);
        }
        config
    }

    fn load_from_disk() -> Self {
        let path = Self::config_path();

        if path.exists() {
            if let Ok(content) = fs::read_to_string(&path) {
                return Self::from_json(&content);
            }
        }

        Self::default()
    }

    /// Parse a config file body; anything unreadable yields the defaults.
    pub fn from_json(content: &str) -> Self {
        serde_json::from_str(content).unwrap_or_else(|e| {
            log::warn!("Ignoring malformed config: {}", e);
            Self::default()
        })
    }

    pub fn apply_backend_override(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.backend_override = Some(url.to_string());
        }
    }

    /// Backend base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.backend_override.as_deref().unwrap_or(&self.backend_url).trim_end_matches('/')
    }

    pub fn save(&self) {
        let path = Self::config_path();
        match serde_json::to_string_pretty(self) {
            Ok(content) => {
                if let Err(e) = fs::write(&path, content) {
                    log::error!("Failed to write {}: {}", path.display(), e);
                }
            }
            Err(e) => log::error!("Failed to serialize config: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_use_defaults() {
        let config = AppConfig::from_json(r#"{"backend_url": "http://10.0.0.2:8000"}"#);
        assert_eq!(config.backend_url, "http://10.0.0.2:8000");
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.connect_timeout_secs, 10);
        assert!(config.dark_mode);
        assert_eq!(config.last_tab, Tab::Search);
    }

    #[test]
    fn test_malformed_json_falls_back() {
        let config = AppConfig::from_json("{not json");
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_backend_override() {
        let mut config = AppConfig::default();
        config.apply_backend_override("  ");
        assert_eq!(config.base_url(), "http://localhost:5001");

        config.apply_backend_override("http://movies.lan:5001/");
        assert_eq!(config.base_url(), "http://movies.lan:5001");

        // The saved URL is untouched
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).base_url(), "http://localhost:5001");
    }

    #[test]
    fn test_last_tab_round_trip() {
        let mut config = AppConfig::default();
        config.last_tab = Tab::Analytics;
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).last_tab, Tab::Analytics);
    }
}
