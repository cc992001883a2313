//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use crate::chatbot::ChatbotConfig;
use crate::routes::RoutePaths;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub chatbot: ChatbotSettings,

    #[serde(default)]
    pub chat: ChatSettings,

    #[serde(default)]
    pub routes: RoutesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Companion chat backend configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatbotSettings {
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_history_limit")]
    pub history_limit: usize,

    /// Where the companion user id is kept (defaults to the data dir)
    pub user_id_file: Option<String>,
}

fn default_api_base_url() -> String {
    "http://localhost:5000/api".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_history_limit() -> usize {
    10
}

impl Default for ChatbotSettings {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout(),
            history_limit: default_history_limit(),
            user_id_file: None,
        }
    }
}

impl ChatbotSettings {
    pub fn client_config(&self) -> ChatbotConfig {
        ChatbotConfig {
            base_url: self.api_base_url.clone(),
            request_timeout_ms: self.request_timeout_secs * 1000,
        }
    }

    pub fn user_id_path(&self) -> PathBuf {
        self.user_id_file
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(crate::chatbot::default_user_id_path)
    }
}

/// Group chat configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ChatSettings {
    #[serde(default = "default_room")]
    pub default_room: String,
}

fn default_room() -> String {
    "general".to_string()
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            default_room: default_room(),
        }
    }
}

/// Page locations used by the route guard
#[derive(Debug, Clone, Deserialize)]
pub struct RoutesConfig {
    #[serde(default = "default_public_paths")]
    pub public_paths: Vec<String>,

    #[serde(default = "default_login_path")]
    pub login_path: String,

    #[serde(default = "default_sign_up_path")]
    pub sign_up_path: String,

    #[serde(default = "default_waiting_path")]
    pub waiting_path: String,

    #[serde(default = "default_dashboard_path")]
    pub dashboard_path: String,
}

fn default_public_paths() -> Vec<String> {
    RoutePaths::default().public
}

fn default_login_path() -> String {
    RoutePaths::default().login
}

fn default_sign_up_path() -> String {
    RoutePaths::default().sign_up
}

fn default_waiting_path() -> String {
    RoutePaths::default().waiting
}

fn default_dashboard_path() -> String {
    RoutePaths::default().dashboard
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            public_paths: default_public_paths(),
            login_path: default_login_path(),
            sign_up_path: default_sign_up_path(),
            waiting_path: default_waiting_path(),
            dashboard_path: default_dashboard_path(),
        }
    }
}

impl RoutesConfig {
    pub fn route_paths(&self) -> RoutePaths {
        RoutePaths {
            public: self.public_paths.clone(),
            login: self.login_path.clone(),
            sign_up: self.sign_up_path.clone(),
            waiting: self.waiting_path.clone(),
            dashboard: self.dashboard_path.clone(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,

    pub file: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            file: None,
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("aegis").join("config.toml")),
            Some(PathBuf::from("/etc/aegis/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any `AEGIS_*` variable lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("AEGIS_API_URL") {
            self.chatbot.api_base_url = url;
        }
        if let Some(room) = lookup("AEGIS_DEFAULT_ROOM") {
            self.chat.default_room = room;
        }
        if let Some(level) = lookup("AEGIS_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("AEGIS_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Aegis Configuration
#
# Environment variables override these settings:
# - AEGIS_API_URL
# - AEGIS_DEFAULT_ROOM
# - AEGIS_LOG_LEVEL
# - AEGIS_LOG_FORMAT

[chatbot]
# Base URL of the companion chat API
api_base_url = "http://localhost:5000/api"

# Request timeout in seconds
request_timeout_secs = 30

# How many past messages to show when loading history
history_limit = 10

# Where the companion user id is stored
# user_id_file = "~/.local/share/aegis/user_id"

[chat]
# Room joined by `aegis room`
default_room = "general"

[routes]
# Pages reachable without signing in
public_paths = ["/", "/index.html", "/pages/login.html", "/pages/sign_up.html"]

login_path = "/pages/login.html"
sign_up_path = "/pages/sign_up.html"

# Shown to password users until their email is verified
waiting_path = "/pages/waiting.html"

dashboard_path = "/pages/newdash.html"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"

# Optional log file path
# file = "/var/log/aegis/aegis.log"
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config.chatbot.api_base_url, "http://localhost:5000/api");
        assert_eq!(config.chatbot.history_limit, 10);
        assert_eq!(config.chat.default_room, "general");
        assert_eq!(config.routes.public_paths.len(), 4);
        assert_eq!(config.logging.format, "pretty");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[chat]\ndefault_room = \"support-1\"\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.chat.default_room, "support-1");
        assert_eq!(config.chatbot.request_timeout_secs, 30);
        assert_eq!(config.routes.dashboard_path, "/pages/newdash.html");
    }

    #[test]
    fn test_load_errors() {
        let dir = tempdir().unwrap();
        let missing = dir.path().join("missing.toml");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io { .. })));

        let broken = dir.path().join("broken.toml");
        std::fs::write(&broken, "[chat\n").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_overrides() {
        let vars: HashMap<&str, &str> = [
            ("AEGIS_API_URL", "http://chat.internal:9000/api"),
            ("AEGIS_DEFAULT_ROOM", "evening-circle"),
            ("AEGIS_LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();

        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).map(|v| v.to_string()));

        assert_eq!(config.chatbot.api_base_url, "http://chat.internal:9000/api");
        assert_eq!(config.chat.default_room, "evening-circle");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_section_conversions() {
        let config = Config::default();
        let client = config.chatbot.client_config();
        assert_eq!(client.request_timeout_ms, 30_000);

        let paths = config.routes.route_paths();
        assert_eq!(paths.waiting, "/pages/waiting.html");
    }
}
