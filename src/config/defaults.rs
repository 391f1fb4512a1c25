//! Default configuration values
//!
//! Named constants for all tunable parameters

use crate::constants;

/// Default server host
pub const DEFAULT_HOST: &str = "127.0.0.1";

/// Default server port
pub const DEFAULT_PORT: u16 = 8787;

/// Default cache store realization
pub const DEFAULT_CACHE_BACKEND: &str = "memory";

/// Default cache entry lifetime in days
pub const DEFAULT_TTL_DAYS: u64 = constants::cache::TTL_DAYS;

/// Default decimal places for cache keys
pub const DEFAULT_PRECISION: u32 = constants::cache::KEY_PRECISION;

/// Default capacity of the in-process store
pub const DEFAULT_MAX_ENTRIES: usize = constants::cache::MAX_ENTRIES;

/// Default provider request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = constants::api::TIMEOUT_SECS;

/// Config file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Application directory name (for XDG paths)
pub const APP_DIR_NAME: &str = "where-am-i";

/// Environment variable naming the durable cache table
pub const ENV_CACHE_TABLE: &str = "CACHE_TABLE";

/// Environment variable overriding the TTL in days
pub const ENV_CACHE_TTL_DAYS: &str = "CACHE_TTL_DAYS";

/// Environment variable selecting the cache store realization
pub const ENV_CACHE_BACKEND: &str = "CACHE_BACKEND";

/// Environment variable overriding the server port
pub const ENV_PORT: &str = "PORT";
