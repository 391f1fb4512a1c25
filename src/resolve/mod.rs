//! Cache-aside address resolution
//!
//! A resolution runs strictly in order:
//! 1. Pick coordinates: direct `lat`/`lon` win over `ip`; neither is an error
//! 2. Validate them (finite, in range) before touching the network or cache
//! 3. Normalize to a cache key and consult the store
//! 4. On a miss, ask the upstream geocoder with the unrounded coordinates
//! 5. Write the address back with the configured TTL and answer `live`
//!
//! The store is an optimization only. Read failures degrade to a miss and
//! write failures are logged, unless strict writes are configured.

use crate::cache::{CacheStore, StoreBackend};
use crate::config::{CacheConfig, Config};
use crate::constants::cache::SECS_PER_DAY;
use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::ip_location::IpLocator;
use crate::geo::nominatim::NominatimBackend;
use crate::geo::{get_geocoder, get_ip_locator, IpLocate, IpLocation, ReverseGeocoder};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Where an address came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Served from the cache store
    Cache,
    /// Fetched from the upstream geocoder
    Live,
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache => write!(f, "cache"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// Raw resolution parameters, as received from a query string or CLI
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResolveRequest {
    pub lat: Option<String>,
    pub lon: Option<String>,
    pub ip: Option<String>,
}

impl ResolveRequest {
    /// Request for direct coordinates
    pub fn coordinates(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: Some(lat.into()),
            lon: Some(lon.into()),
            ip: None,
        }
    }

    /// Request for an IP address
    pub fn ip(ip: impl Into<String>) -> Self {
        Self {
            ip: Some(ip.into()),
            ..Self::default()
        }
    }
}

/// Non-blank parameter value
fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Result of a successful resolution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    pub address: String,
    pub source: Source,
    /// Coordinates as supplied (or as located), not the rounded cache bucket
    pub coordinates: Coordinates,
    pub timestamp: DateTime<Utc>,
}

/// What to do when the cache write-back fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WritePolicy {
    /// Log and still return the live address
    #[default]
    BestEffort,
    /// Fail the request with the store error
    Strict,
}

/// Tunables for a resolver
#[derive(Debug, Clone, PartialEq)]
pub struct ResolverSettings {
    /// Cache entry lifetime in days
    pub ttl_days: u64,
    /// Decimal places kept in cache keys
    pub precision: u32,
    /// Whether a cached empty address counts as a hit
    pub empty_address_is_hit: bool,
    pub write_policy: WritePolicy,
}

impl ResolverSettings {
    /// Entry lifetime in seconds
    pub fn ttl_secs(&self) -> u64 {
        self.ttl_days.saturating_mul(SECS_PER_DAY)
    }
}

impl Default for ResolverSettings {
    fn default() -> Self {
        Self::from(&CacheConfig::default())
    }
}

impl From<&CacheConfig> for ResolverSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl_days: config.ttl_days,
            precision: config.precision,
            empty_address_is_hit: config.empty_address_is_hit,
            write_policy: if config.strict_writes {
                WritePolicy::Strict
            } else {
                WritePolicy::BestEffort
            },
        }
    }
}

/// Resolver wired to the configured store and the public providers
pub type DefaultResolver = Resolver<StoreBackend, NominatimBackend, IpLocator>;

/// Cache-aside resolver over injected collaborators
#[derive(Debug)]
pub struct Resolver<S, G, L> {
    store: S,
    geocoder: G,
    locator: L,
    settings: ResolverSettings,
}

impl DefaultResolver {
    /// Build a resolver from configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Resolver::new(
            StoreBackend::from_config(&config.cache)?,
            get_geocoder(&config.upstream)?,
            get_ip_locator(&config.upstream)?,
            ResolverSettings::from(&config.cache),
        ))
    }
}

impl<S, G, L> Resolver<S, G, L>
where
    S: CacheStore,
    G: ReverseGeocoder,
    L: IpLocate,
{
    /// Create a resolver over the given collaborators
    pub fn new(store: S, geocoder: G, locator: L, settings: ResolverSettings) -> Self {
        Self {
            store,
            geocoder,
            locator,
            settings,
        }
    }

    /// The cache store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Current settings
    pub fn settings(&self) -> &ResolverSettings {
        &self.settings
    }

    /// Resolve a request to an address
    pub async fn resolve(&self, request: &ResolveRequest) -> Result<Resolution> {
        let coords = self.coordinates_for(request).await?;
        self.resolve_coordinates(coords).await
    }

    /// Determine coordinates for a request
    ///
    /// Direct coordinates take precedence; an IP is only consulted when
    /// `lat` and `lon` are not both present. The result is not range-checked;
    /// [`Resolver::resolve_coordinates`] does that.
    pub async fn coordinates_for(&self, request: &ResolveRequest) -> Result<Coordinates> {
        let coords = match (present(&request.lat), present(&request.lon), present(&request.ip)) {
            (Some(lat), Some(lon), _) => Coordinates::parse(lat, lon)?,
            (_, _, Some(ip)) => {
                let location = self.locator.locate(ip.trim()).await?;
                debug!(ip = %ip, lat = location.coordinates.lat, lon = location.coordinates.lon, "Located IP");
                location.coordinates
            }
            _ => return Err(Error::MissingInput),
        };

        Ok(coords)
    }

    /// Locate an IP address without reverse geocoding it
    pub async fn locate_ip(&self, ip: Option<&str>) -> Result<IpLocation> {
        let ip = ip
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .ok_or_else(|| Error::InvalidRequest("ip parameter is required".to_string()))?;
        self.locator.locate(ip).await
    }

    /// Resolve already determined coordinates
    pub async fn resolve_coordinates(&self, coords: Coordinates) -> Result<Resolution> {
        coords.validate()?;
        let key = coords.cache_key(self.settings.precision);

        if let Some(address) = self.lookup(&key).await {
            debug!(key = %key, "Cache hit");
            return Ok(Self::resolution(address, Source::Cache, coords));
        }

        debug!(key = %key, "Cache miss, querying upstream geocoder");
        let address = self.geocoder.reverse(coords).await?;

        self.write_back(&key, &address).await?;

        Ok(Self::resolution(address, Source::Live, coords))
    }

    /// Cached address for `key`, if it should be served
    async fn lookup(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(entry)) if entry.address.is_empty() && !self.settings.empty_address_is_hit => {
                debug!(key = %key, "Ignoring cached empty address");
                None
            }
            Ok(Some(entry)) => Some(entry.address),
            Ok(None) => None,
            Err(e) => {
                warn!(store = self.store.name(), key = %key, error = %e, "Cache read failed, treating as miss");
                None
            }
        }
    }

    async fn write_back(&self, key: &str, address: &str) -> Result<()> {
        let result = self.store.put(key, address, self.settings.ttl_secs()).await;

        match (result, self.settings.write_policy) {
            (Ok(()), _) => Ok(()),
            (Err(e), WritePolicy::Strict) => Err(e),
            (Err(e), WritePolicy::BestEffort) => {
                warn!(store = self.store.name(), key = %key, error = %e, "Cache write failed, returning live result");
                Ok(())
            }
        }
    }

    fn resolution(address: String, source: Source, coordinates: Coordinates) -> Resolution {
        Resolution {
            address,
            source,
            coordinates,
            timestamp: Utc::now(),
        }
    }
}
