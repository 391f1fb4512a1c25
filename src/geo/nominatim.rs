//! Nominatim reverse geocoding backend (OpenStreetMap)
//!
//! Uses the free Nominatim API for reverse geocoding.
//! Rate limit: 1 request per second, and a User-Agent is required.

use crate::coord::Coordinates;
use crate::error::{Error, Result};
use crate::geo::ReverseGeocoder;
use serde::Deserialize;

/// Status reported when the provider could not be reached at all
const BAD_GATEWAY: u16 = 502;

/// Nominatim reverse geocoding backend
#[derive(Debug, Clone)]
pub struct NominatimBackend {
    client: reqwest::Client,
    base_url: String,
}

/// Nominatim reverse response
///
/// Points with no data (open ocean) come back as `{"error": "..."}` with a
/// 200 status, so `display_name` is optional.
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    display_name: Option<String>,
}

impl NominatimBackend {
    /// Create a backend talking to `base_url` (no trailing slash needed)
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn reverse_url(&self, coords: Coordinates) -> String {
        format!(
            "{}/reverse?format=jsonv2&lat={}&lon={}&zoom=18&addressdetails=1",
            self.base_url, coords.lat, coords.lon
        )
    }
}

impl ReverseGeocoder for NominatimBackend {
    async fn reverse(&self, coords: Coordinates) -> Result<String> {
        let response = self
            .client
            .get(self.reverse_url(coords))
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::Upstream {
                status: BAD_GATEWAY,
                message: format!("Nominatim request failed: {}", e),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Upstream {
                status: status.as_u16(),
                message: format!("Nominatim returned status: {}", status),
            });
        }

        let result: NominatimReverse = response.json().await.map_err(|e| Error::Upstream {
            status: BAD_GATEWAY,
            message: format!("Failed to parse Nominatim response: {}", e),
        })?;

        Ok(result.display_name.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::testing::spawn_stub;
    use axum::extract::Query;
    use axum::http::StatusCode;
    use axum::routing::get;
    use axum::{Json, Router};
    use std::collections::HashMap;

    fn backend(base_url: &str) -> NominatimBackend {
        NominatimBackend::new(reqwest::Client::new(), base_url)
    }

    #[test]
    fn test_reverse_url() {
        let url = backend("https://nominatim.example/").reverse_url(Coordinates::new(40.7128, -74.006));
        assert_eq!(
            url,
            "https://nominatim.example/reverse?format=jsonv2&lat=40.7128&lon=-74.006&zoom=18&addressdetails=1"
        );
    }

    #[test]
    fn test_backend_creation() {
        let backend = backend("https://nominatim.example");
        assert!(format!("{:?}", backend).contains("NominatimBackend"));
    }

    #[tokio::test]
    async fn test_reverse_returns_display_name() {
        let router = Router::new().route(
            "/reverse",
            get(|Query(q): Query<HashMap<String, String>>| async move {
                assert_eq!(q.get("format").map(String::as_str), Some("jsonv2"));
                assert_eq!(q.get("lat").map(String::as_str), Some("40.7128"));
                Json(serde_json::json!({ "display_name": "New York, NY" }))
            }),
        );
        let base = spawn_stub(router).await;

        let address = backend(&base)
            .reverse(Coordinates::new(40.7128, -74.006))
            .await
            .unwrap();
        assert_eq!(address, "New York, NY");
    }

    #[tokio::test]
    async fn test_reverse_without_display_name_is_empty() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { Json(serde_json::json!({ "error": "Unable to geocode" })) }),
        );
        let base = spawn_stub(router).await;

        let address = backend(&base).reverse(Coordinates::new(0.0, -30.0)).await.unwrap();
        assert_eq!(address, "");
    }

    #[tokio::test]
    async fn test_reverse_passes_through_status() {
        let router = Router::new().route(
            "/reverse",
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "busy") }),
        );
        let base = spawn_stub(router).await;

        let err = backend(&base)
            .reverse(Coordinates::new(40.7128, -74.006))
            .await
            .unwrap_err();
        match err {
            Error::Upstream { status, .. } => assert_eq!(status, 503),
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_reverse_unreachable_is_bad_gateway() {
        // Bind then drop to get a port nobody listens on
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(&format!("http://{}", addr))
            .reverse(Coordinates::new(1.0, 1.0))
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), 502);
    }
}
