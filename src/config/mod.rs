//! Configuration management
//!
//! Loads and saves configuration from XDG-compliant paths.
//! Config location: ~/.config/where-am-i/config.toml
//!
//! Environment variables (`CACHE_TABLE`, `CACHE_TTL_DAYS`, `CACHE_BACKEND`,
//! `PORT`) override the file after it is loaded.

pub mod defaults;

use crate::constants::api::{IP_API_URL, NOMINATIM_URL, USER_AGENT};
use crate::constants::cache::{MAX_KEY_PRECISION, SECS_PER_DAY};
use crate::error::{Error, Result};
use defaults::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Address cache settings
    #[serde(default)]
    pub cache: CacheConfig,

    /// Remote provider settings
    #[serde(default)]
    pub upstream: UpstreamConfig,
}

/// Server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Address cache settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Store realization: "memory" or "file"
    #[serde(default = "default_cache_backend")]
    pub backend: String,

    /// Durable table identifier (required by the file backend)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,

    /// Entry lifetime in days
    #[serde(default = "default_ttl_days")]
    pub ttl_days: u64,

    /// Decimal places kept in cache keys
    #[serde(default = "default_precision")]
    pub precision: u32,

    /// Capacity of the in-memory store
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Whether a cached empty address counts as a hit
    #[serde(default = "default_true")]
    pub empty_address_is_hit: bool,

    /// Fail requests whose cache write-back fails
    #[serde(default)]
    pub strict_writes: bool,
}

/// Remote provider settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpstreamConfig {
    /// Nominatim base URL
    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,

    /// ipapi.co base URL
    #[serde(default = "default_ip_api_url")]
    pub ip_api_url: String,

    /// User agent sent to providers
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

// Default value functions for serde
fn default_host() -> String {
    DEFAULT_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_cache_backend() -> String {
    DEFAULT_CACHE_BACKEND.to_string()
}
fn default_ttl_days() -> u64 {
    DEFAULT_TTL_DAYS
}
fn default_precision() -> u32 {
    DEFAULT_PRECISION
}
fn default_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}
fn default_true() -> bool {
    true
}
fn default_nominatim_url() -> String {
    NOMINATIM_URL.to_string()
}
fn default_ip_api_url() -> String {
    IP_API_URL.to_string()
}
fn default_user_agent() -> String {
    USER_AGENT.to_string()
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: default_cache_backend(),
            table: None,
            ttl_days: default_ttl_days(),
            precision: default_precision(),
            max_entries: default_max_entries(),
            empty_address_is_hit: true,
            strict_writes: false,
        }
    }
}

impl CacheConfig {
    /// Entry lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_days.saturating_mul(SECS_PER_DAY)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            nominatim_url: default_nominatim_url(),
            ip_api_url: default_ip_api_url(),
            user_agent: default_user_agent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn parse_value<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| Error::Config(format!("Invalid value for {}: {}", key, value)))
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    parse_value(key, value)
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join(APP_DIR_NAME))
            .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default path
    ///
    /// Creates default config if file doesn't exist
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;

        if path.exists() {
            let content = fs::read_to_string(&path).map_err(|e| {
                Error::Config(format!("Failed to read config file: {}", e))
            })?;

            toml::from_str(&content).map_err(|e| {
                Error::Config(format!("Failed to parse config file: {}", e))
            })
        } else {
            // Create default config
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    /// Load configuration, apply environment overrides and validate
    ///
    /// This is what long-running commands use; `load` alone is used by the
    /// `config` command so it edits exactly what is on disk.
    pub fn load_effective() -> Result<Self> {
        let mut config = Self::load()?;
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Ensure directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                Error::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| {
            Error::Config(format!("Failed to serialize config: {}", e))
        })?;

        fs::write(&path, content).map_err(|e| {
            Error::Config(format!("Failed to write config file: {}", e))
        })?;

        Ok(())
    }

    /// Apply environment-style overrides
    ///
    /// `lookup` maps a variable name to its value; blank values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(table) = var(ENV_CACHE_TABLE) {
            self.cache.table = Some(table.trim().to_string());
        }
        if let Some(days) = var(ENV_CACHE_TTL_DAYS) {
            self.cache.ttl_days = parse_value(ENV_CACHE_TTL_DAYS, &days)?;
        }
        if let Some(backend) = var(ENV_CACHE_BACKEND) {
            self.cache.backend = backend.trim().to_string();
        }
        if let Some(port) = var(ENV_PORT) {
            self.server.port = parse_value(ENV_PORT, &port)?;
        }

        Ok(())
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        match self.cache.backend.as_str() {
            "memory" => {}
            "file" => {
                if self.cache.table.as_deref().map_or(true, str::is_empty) {
                    return Err(Error::Config(
                        "cache.table is required for the file backend".to_string(),
                    ));
                }
            }
            other => {
                return Err(Error::Config(format!("Unknown cache backend: {}", other)));
            }
        }

        if self.cache.max_entries == 0 {
            return Err(Error::Config("cache.max_entries must be positive".to_string()));
        }

        if self.cache.precision > MAX_KEY_PRECISION {
            return Err(Error::Config(format!(
                "cache.precision must be between 0 and {}",
                MAX_KEY_PRECISION
            )));
        }

        if self.upstream.timeout_secs == 0 {
            return Err(Error::Config("upstream.timeout_secs must be positive".to_string()));
        }

        Ok(())
    }

    /// Get a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns the value as a string, or None if not found
    pub fn get(&self, key: &str) -> Option<String> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => Some(self.server.host.clone()),
            ["server", "port"] => Some(self.server.port.to_string()),

            ["cache", "backend"] => Some(self.cache.backend.clone()),
            ["cache", "table"] => Some(self.cache.table.clone().unwrap_or_default()),
            ["cache", "ttl_days"] => Some(self.cache.ttl_days.to_string()),
            ["cache", "precision"] => Some(self.cache.precision.to_string()),
            ["cache", "max_entries"] => Some(self.cache.max_entries.to_string()),
            ["cache", "empty_address_is_hit"] => {
                Some(self.cache.empty_address_is_hit.to_string())
            }
            ["cache", "strict_writes"] => Some(self.cache.strict_writes.to_string()),

            ["upstream", "nominatim_url"] => Some(self.upstream.nominatim_url.clone()),
            ["upstream", "ip_api_url"] => Some(self.upstream.ip_api_url.clone()),
            ["upstream", "user_agent"] => Some(self.upstream.user_agent.clone()),
            ["upstream", "timeout_secs"] => Some(self.upstream.timeout_secs.to_string()),

            _ => None,
        }
    }

    /// Set a configuration value by key path
    ///
    /// Key format: "section.key"
    /// Returns error if key is invalid or value type is wrong
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["server", "host"] => {
                self.server.host = value.to_string();
            }
            ["server", "port"] => {
                self.server.port = parse_value(key, value)?;
            }

            ["cache", "backend"] => {
                self.cache.backend = value.to_string();
            }
            ["cache", "table"] => {
                self.cache.table = if value.is_empty() {
                    None
                } else {
                    Some(value.to_string())
                };
            }
            ["cache", "ttl_days"] => {
                self.cache.ttl_days = parse_value(key, value)?;
            }
            ["cache", "precision"] => {
                self.cache.precision = parse_value(key, value)?;
            }
            ["cache", "max_entries"] => {
                self.cache.max_entries = parse_value(key, value)?;
            }
            ["cache", "empty_address_is_hit"] => {
                self.cache.empty_address_is_hit = parse_bool(key, value)?;
            }
            ["cache", "strict_writes"] => {
                self.cache.strict_writes = parse_bool(key, value)?;
            }

            ["upstream", "nominatim_url"] => {
                self.upstream.nominatim_url = value.to_string();
            }
            ["upstream", "ip_api_url"] => {
                self.upstream.ip_api_url = value.to_string();
            }
            ["upstream", "user_agent"] => {
                self.upstream.user_agent = value.to_string();
            }
            ["upstream", "timeout_secs"] => {
                self.upstream.timeout_secs = parse_value(key, value)?;
            }

            _ => {
                return Err(Error::Config(format!("Unknown config key: {}", key)));
            }
        }

        Ok(())
    }

    /// List all available config keys
    pub fn available_keys() -> Vec<&'static str> {
        vec![
            "server.host",
            "server.port",
            "cache.backend",
            "cache.table",
            "cache.ttl_days",
            "cache.precision",
            "cache.max_entries",
            "cache.empty_address_is_hit",
            "cache.strict_writes",
            "upstream.nominatim_url",
            "upstream.ip_api_url",
            "upstream.user_agent",
            "upstream.timeout_secs",
        ]
    }

    /// Get server address as "host:port"
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
