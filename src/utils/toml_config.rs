//! TOML-based configuration for NeoNest
//!
//! This module provides the client configuration (backend URL, locale,
//! logging, session file) via a TOML file (`neonest.toml`).
//!
//! # Reloading
//!
//! `ConfigManager` holds the current configuration behind an `ArcSwap` so
//! readers never block; `reload` swaps in a freshly validated file.

use arc_swap::ArcSwap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use crate::i18n::{DEFAULT_LANGUAGE, SUPPORTED_LANGUAGES};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "neonest.toml";

/// Root configuration structure loaded from neonest.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NeonestConfig {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub i18n: I18nConfig,

    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub session: SessionConfig,
}

// ============= API Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Environment variable name containing the bearer token
    #[serde(default = "default_token_env")]
    pub token_env: String,
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_token_env() -> String {
    "NEONEST_TOKEN".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            token_env: default_token_env(),
        }
    }
}

// ============= I18n Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct I18nConfig {
    #[serde(default = "default_locale")]
    pub locale: String,

    #[serde(default = "default_locale")]
    pub fallback_locale: String,

    /// Directory holding `<lang>/common.json`
    #[serde(default = "default_locales_dir")]
    pub locales_dir: PathBuf,
}

fn default_locale() -> String {
    DEFAULT_LANGUAGE.to_string()
}

fn default_locales_dir() -> PathBuf {
    PathBuf::from("locales")
}

impl Default for I18nConfig {
    fn default() -> Self {
        Self {
            locale: default_locale(),
            fallback_locale: default_locale(),
            locales_dir: default_locales_dir(),
        }
    }
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

// ============= Session Configuration =============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Where the CLI keeps the token between runs
    #[serde(default = "default_session_file")]
    pub file: PathBuf,
    /// Chat conversations per persona
    #[serde(default = "default_chat_file")]
    pub chat_file: PathBuf,
}

fn default_session_file() -> PathBuf {
    PathBuf::from(".neonest-session")
}

fn default_chat_file() -> PathBuf {
    PathBuf::from(".neonest-chat.json")
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file: default_session_file(),
            chat_file: default_chat_file(),
        }
    }
}

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Unsupported locale '{0}'")]
    UnsupportedLocale(String),
}

impl NeonestConfig {
    /// Load configuration from a TOML file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        let config = Self::parse(&content)?;

        Ok(config)
    }

    /// Parse and validate TOML text
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: NeonestConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, otherwise fall back to defaults.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::FileNotFound(path)) => {
                info!("No config at {:?}, using defaults", path);
                Ok(Self::default())
            }
            other => other,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "api.base_url must not be empty".to_string(),
            ));
        }
        if !self.api.base_url.starts_with("http://") && !self.api.base_url.starts_with("https://") {
            return Err(ConfigError::ValidationError(format!(
                "api.base_url must be an http(s) URL, got '{}'",
                self.api.base_url
            )));
        }
        if self.api.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "api.timeout_secs must be greater than zero".to_string(),
            ));
        }

        for locale in [&self.i18n.locale, &self.i18n.fallback_locale] {
            if !SUPPORTED_LANGUAGES.contains(&locale.as_str()) {
                return Err(ConfigError::UnsupportedLocale(locale.clone()));
            }
        }

        Ok(())
    }

    /// Token from the environment variable named by `api.token_env`
    pub fn token(&self) -> Option<String> {
        std::env::var(&self.api.token_env)
            .ok()
            .filter(|t| !t.is_empty())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

// ============= Reloadable Configuration Manager =============

/// Shared handle on the current configuration.
///
/// Clones share one snapshot: a [`reload`](Self::reload) through any of them
/// is seen by all. Readers never block.
#[derive(Clone)]
pub struct ConfigManager {
    config: Arc<ArcSwap<NeonestConfig>>,
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new configuration manager and load the initial config
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        // reloads must not depend on a later working directory
        let path = path.as_ref();
        let path = if path.is_absolute() {
            path.to_path_buf()
        } else {
            std::env::current_dir()
                .map_err(ConfigError::ReadError)?
                .join(path)
        };

        let config = NeonestConfig::load(&path)?;

        Ok(Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: path,
        })
    }

    /// Create a manager around an in-memory config; reloading reads `neonest.toml`.
    pub fn from_config(config: NeonestConfig) -> Self {
        Self {
            config: Arc::new(ArcSwap::from_pointee(config)),
            config_path: PathBuf::from(CONFIG_FILE),
        }
    }

    /// Get the current configuration (lockless read)
    pub fn config(&self) -> Arc<NeonestConfig> {
        self.config.load_full()
    }

    pub fn path(&self) -> &Path {
        &self.config_path
    }

    /// Reload the configuration from disk.
    ///
    /// A file that fails to load or validate leaves the current config in place.
    pub fn reload(&self) -> Result<(), ConfigError> {
        info!("Reloading configuration from {:?}", self.config_path);

        let new_config = NeonestConfig::load(&self.config_path)?;
        self.config.store(Arc::new(new_config));

        info!("Configuration reloaded successfully");
        Ok(())
    }
}
