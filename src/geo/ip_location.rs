//! IP-based geolocation
//!
//! Uses ipapi.co to place an IP address. Any provider failure (transport,
//! non-success status, error body, missing coordinates) is reported as
//! `Error::LocationUnavailable`; a missing coordinate is never read as 0.
//! Only syntactically valid IPv4/IPv6 addresses are ever sent to the provider.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::{IpLocate, IpLocation};
use serde::Deserialize;
use serde_json::Value;
use std::net::IpAddr;

/// IP location service
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: reqwest::Client,
    base_url: String,
}

/// ipapi.co response
#[derive(Debug, Deserialize)]
struct IpApiResponse {
    #[serde(default)]
    error: bool,
    reason: Option<String>,
    latitude: Option<Value>,
    longitude: Option<Value>,
    city: Option<String>,
    region: Option<String>,
    country_name: Option<String>,
    timezone: Option<String>,
}

/// Read a coordinate that may arrive as a number or a numeric string
fn coordinate(value: Option<&Value>) -> Option<f64> {
    match value? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl IpLocator {
    /// Create a locator talking to `base_url` (no trailing slash needed)
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn lookup_url(&self, ip: IpAddr) -> String {
        format!("{}/{}/json/", self.base_url, urlencoding::encode(&ip.to_string()))
    }

    fn parse_response(ip: &str, data: IpApiResponse) -> Result<IpLocation> {
        if data.error {
            return Err(Error::LocationUnavailable(
                data.reason.unwrap_or_else(|| ip.to_string()),
            ));
        }

        let lat = coordinate(data.latitude.as_ref());
        let lon = coordinate(data.longitude.as_ref());
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(Error::LocationUnavailable(format!(
                "No coordinates for {}",
                ip
            )));
        };

        Ok(IpLocation {
            ip: ip.to_string(),
            coordinates: Coordinates::new(lat, lon),
            city: data.city,
            region: data.region,
            country: data.country_name,
            timezone: data.timezone,
        })
    }
}

impl IpLocate for IpLocator {
    async fn locate(&self, ip: &str) -> Result<IpLocation> {
        let addr = parse_ip(ip)?;
        let ip = addr.to_string();

        let response = self
            .client
            .get(self.lookup_url(addr))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::LocationUnavailable(format!("IP location request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::LocationUnavailable(format!(
                "IP location API returned status: {}",
                response.status()
            )));
        }

        let data: IpApiResponse = response.json().await.map_err(|e| {
            Error::LocationUnavailable(format!("Failed to parse IP location response: {}", e))
        })?;

        Self::parse_response(&ip, data)
    }
}

fn parse_ip(ip: &str) -> Result<IpAddr> {
    ip.trim()
        .parse()
        .map_err(|_| Error::LocationUnavailable(format!("Not an IP address: {}", ip.trim())))
}
