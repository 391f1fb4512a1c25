//! Centralized constants for the where-am-i crate
//!
//! Values shared by the resolver, the stores and the provider adapters.

/// External API endpoints
pub mod api {
    /// OpenStreetMap Nominatim geocoding API
    pub const NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org";

    /// IP geolocation API (free, no key required)
    pub const IP_API_URL: &str = "https://ipapi.co";

    /// User agent sent to providers (Nominatim rejects anonymous clients)
    pub const USER_AGENT: &str = concat!("where-am-i/", env!("CARGO_PKG_VERSION"));

    /// Default request timeout for provider calls
    pub const TIMEOUT_SECS: u64 = 10;
}

/// Cache settings
pub mod cache {
    /// Decimal places kept when bucketing coordinates (~1.1m at the equator)
    pub const KEY_PRECISION: u32 = 5;

    /// Largest precision accepted from configuration
    pub const MAX_KEY_PRECISION: u32 = 10;

    /// Default cache entry lifetime in days
    pub const TTL_DAYS: u64 = 7;

    /// Seconds per TTL day
    pub const SECS_PER_DAY: u64 = 86_400;

    /// Longest lifetime an entry can be given (100 years)
    pub const MAX_TTL_SECS: u64 = 100 * 365 * SECS_PER_DAY;

    /// Capacity of the bounded in-process store
    pub const MAX_ENTRIES: usize = 100;

    /// Extension of durable table files (SQLite databases)
    pub const TABLE_FILE_EXT: &str = "db";

    /// How long a durable-table write waits for another writer's lock
    pub const BUSY_TIMEOUT_MS: u64 = 5_000;
}
