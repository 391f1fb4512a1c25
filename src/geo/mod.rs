//! Geocoding collaborators
//!
//! Provides reverse geocoding (coordinates to address) and IP geolocation.
//! Both are remote services; the resolver only depends on the traits below.

pub mod ip_location;
pub mod nominatim;

use crate::config::UpstreamConfig;
use crate::coord::Coordinates;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Approximate location of an IP address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IpLocation {
    pub ip: String,
    pub coordinates: Coordinates,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// Trait for reverse geocoding backends
pub trait ReverseGeocoder: Send + Sync {
    /// Resolve coordinates to a display address
    ///
    /// An empty string means the provider has no address for the point; that
    /// is a valid answer, not an error. Provider failures surface as
    /// `Error::Upstream` carrying the provider's status.
    fn reverse(&self, coords: Coordinates) -> impl Future<Output = Result<String>> + Send;
}

/// Trait for IP geolocation backends
pub trait IpLocate: Send + Sync {
    /// Resolve an IP address to approximate coordinates
    ///
    /// Fails with `Error::LocationUnavailable` when the provider cannot place
    /// the address.
    fn locate(&self, ip: &str) -> impl Future<Output = Result<IpLocation>> + Send;
}

/// Build the HTTP client shared by the provider adapters
pub fn http_client(config: &UpstreamConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Get the configured reverse geocoder
pub fn get_geocoder(config: &UpstreamConfig) -> Result<nominatim::NominatimBackend> {
    Ok(nominatim::NominatimBackend::new(
        http_client(config)?,
        &config.nominatim_url,
    ))
}

/// Get the configured IP locator
pub fn get_ip_locator(config: &UpstreamConfig) -> Result<ip_location::IpLocator> {
    Ok(ip_location::IpLocator::new(
        http_client(config)?,
        &config.ip_api_url,
    ))
}
