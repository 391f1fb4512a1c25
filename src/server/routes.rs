//! HTTP API routes
//!
//! Defines all REST API endpoints for the server.

use crate::cache::CacheStore;
use crate::error::Error;
use crate::coord::Coordinates;
use crate::geo::{IpLocate, IpLocation, ReverseGeocoder};
use crate::resolve::{Resolution, ResolveRequest};
use crate::server::state::AppState;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, Instrument};
use uuid::Uuid;

const SERVICE_NAME: &str = "where-am-i";

/// Create the API router
pub fn create_router<S, G, L>(state: Arc<AppState<S, G, L>>) -> Router
where
    S: CacheStore + 'static,
    G: ReverseGeocoder + 'static,
    L: IpLocate + 'static,
{
    Router::new()
        .route("/api/reverse", get(reverse_handler::<S, G, L>))
        .route("/api/ip-to-coords", get(ip_to_coords_handler::<S, G, L>))
        .route("/api/health", get(health_handler::<S, G, L>))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// API error response
///
/// Serialized as `{ "error": "..." }`; the status travels in the HTTP
/// response line only.
#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: String,
    #[serde(skip)]
    pub status: StatusCode,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self)).into_response()
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let status =
            StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        let message = match &err {
            Error::MissingInput
            | Error::InvalidRequest(_)
            | Error::InvalidCoordinates(_)
            | Error::LocationUnavailable(_) => err.to_string(),
            Error::Upstream { .. } => "Upstream geocoding service error".to_string(),
            _ => {
                error!(error = %err, "Reverse geocoding failed");
                "Internal server error".to_string()
            }
        };

        ApiError {
            error: message,
            status,
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::from(Error::InvalidRequest(rejection.body_text()))
    }
}

/// Turn a handler panic into the generic 500 envelope
fn handle_panic(panic: Box<dyn Any + Send + 'static>) -> axum::response::Response {
    let detail = panic
        .downcast_ref::<String>()
        .cloned()
        .or_else(|| panic.downcast_ref::<&str>().map(|s| s.to_string()))
        .unwrap_or_else(|| "unknown panic".to_string());

    ApiError::from(Error::Internal(format!("handler panicked: {}", detail))).into_response()
}

/// Reverse geocode coordinates or an IP address
///
/// GET /api/reverse?lat=..&lon=..  or  GET /api/reverse?ip=..
async fn reverse_handler<S, G, L>(
    State(state): State<Arc<AppState<S, G, L>>>,
    query: Result<Query<ResolveRequest>, QueryRejection>,
) -> Result<Json<Resolution>, ApiError>
where
    S: CacheStore + 'static,
    G: ReverseGeocoder + 'static,
    L: IpLocate + 'static,
{
    let Query(request) = query?;
    let span = tracing::info_span!("reverse", request_id = %Uuid::new_v4());

    let resolution = state
        .resolver
        .resolve(&request)
        .instrument(span)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(resolution))
}

/// Query for the IP lookup endpoint
#[derive(Debug, Deserialize)]
pub struct IpQuery {
    pub ip: Option<String>,
}

/// Place details reported for an IP address
#[derive(Debug, Serialize, Deserialize)]
pub struct PlaceDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

/// IP lookup response
#[derive(Debug, Serialize, Deserialize)]
pub struct IpLookupResponse {
    pub ip: String,
    pub coordinates: Coordinates,
    pub location: PlaceDetails,
    pub timestamp: DateTime<Utc>,
}

impl From<IpLocation> for IpLookupResponse {
    fn from(location: IpLocation) -> Self {
        Self {
            ip: location.ip,
            coordinates: location.coordinates,
            location: PlaceDetails {
                city: location.city,
                region: location.region,
                country: location.country,
                timezone: location.timezone,
            },
            timestamp: Utc::now(),
        }
    }
}

/// Locate an IP address without reverse geocoding
///
/// GET /api/ip-to-coords?ip=..
async fn ip_to_coords_handler<S, G, L>(
    State(state): State<Arc<AppState<S, G, L>>>,
    query: Result<Query<IpQuery>, QueryRejection>,
) -> Result<Json<IpLookupResponse>, ApiError>
where
    S: CacheStore + 'static,
    G: ReverseGeocoder + 'static,
    L: IpLocate + 'static,
{
    let Query(query) = query?;
    let span = tracing::info_span!("ip_to_coords", request_id = %Uuid::new_v4());

    let location = state
        .resolver
        .locate_ip(query.ip.as_deref())
        .instrument(span)
        .await?;

    Ok(Json(IpLookupResponse::from(location)))
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub service: String,
    pub version: String,
    pub uptime_secs: u64,
}

/// Health check endpoint
///
/// GET /api/health
async fn health_handler<S, G, L>(State(state): State<Arc<AppState<S, G, L>>>) -> Json<HealthResponse>
where
    S: CacheStore + 'static,
    G: ReverseGeocoder + 'static,
    L: IpLocate + 'static,
{
    Json(HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.uptime_secs(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::memory::MemoryStore;
    use crate::resolve::testing::{BrokenStore, FakeGeocoder, FakeLocator};
    use crate::resolve::{Resolver, ResolverSettings, Source, WritePolicy};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn create_test_state(
        geocoder: FakeGeocoder,
        locator: FakeLocator,
    ) -> Arc<AppState<MemoryStore, FakeGeocoder, FakeLocator>> {
        Arc::new(AppState::new(Resolver::new(
            MemoryStore::new(100),
            geocoder,
            locator,
            ResolverSettings::default(),
        )))
    }

    async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::default());
        let app = create_router(state);

        let response = app
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();

        assert_eq!(health.status, "ok");
        assert_eq!(health.service, "where-am-i");
    }

    #[tokio::test]
    async fn test_reverse_miss_then_hit() {
        let state = create_test_state(FakeGeocoder::answering("New York, NY"), FakeLocator::default());
        let app = create_router(state.clone());

        let (status, body) = get_json(app.clone(), "/api/reverse?lat=40.7128&lon=-74.0060").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], "New York, NY");
        assert_eq!(body["source"], "live");
        assert_eq!(body["coordinates"]["lat"], 40.7128);
        assert!(body["timestamp"].is_string());

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/reverse?lat=40.7128&lon=-74.0060")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let resolution: Resolution = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(resolution.source, Source::Cache);
        assert_eq!(state.resolver.store().len().await, 1);
    }

    #[tokio::test]
    async fn test_reverse_by_ip() {
        let state = create_test_state(FakeGeocoder::answering("Mountain View, CA"), FakeLocator::at(37.4, -122.1));
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/reverse?ip=8.8.8.8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["address"], "Mountain View, CA");
        assert_eq!(body["coordinates"]["lon"], -122.1);
    }

    #[tokio::test]
    async fn test_reverse_missing_input() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::default());
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/reverse").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(body.as_object().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_reverse_invalid_coordinates() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::default());
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/reverse?lat=invalid&lon=-74.0060").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("Invalid coordinates"));
    }

    #[tokio::test]
    async fn test_reverse_location_unavailable() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::unavailable());
        let app = create_router(state);

        let (status, _) = get_json(app, "/api/reverse?ip=10.0.0.1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_reverse_upstream_status_passthrough() {
        let state = create_test_state(FakeGeocoder::failing(503), FakeLocator::default());
        let app = create_router(state.clone());

        let (status, body) = get_json(app, "/api/reverse?lat=40.7128&lon=-74.0060").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "Upstream geocoding service error");
        assert!(state.resolver.store().is_empty().await);
    }

    #[tokio::test]
    async fn test_reverse_internal_error_is_generic() {
        let settings = ResolverSettings {
            write_policy: WritePolicy::Strict,
            ..ResolverSettings::default()
        };
        let store = BrokenStore {
            fail_put: true,
            ..BrokenStore::default()
        };
        let state = Arc::new(AppState::new(Resolver::new(
            store,
            FakeGeocoder::answering("x"),
            FakeLocator::default(),
            settings,
        )));
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/reverse?lat=1&lon=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_reverse_rejected_query_uses_envelope() {
        let state = create_test_state(FakeGeocoder::answering("x"), FakeLocator::default());
        let app = create_router(state.clone());

        let (status, body) = get_json(app, "/api/reverse?lat=1&lat=2&lon=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("lat"));
        assert_eq!(body.as_object().unwrap().len(), 1);
        assert_eq!(state.resolver.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_ip_to_coords() {
        let state = create_test_state(
            FakeGeocoder::answering("unused"),
            FakeLocator::at(37.4, -122.1).in_city("Mountain View"),
        );
        let app = create_router(state.clone());

        let (status, body) = get_json(app, "/api/ip-to-coords?ip=8.8.8.8").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ip"], "8.8.8.8");
        assert_eq!(body["coordinates"]["lat"], 37.4);
        assert_eq!(body["location"]["city"], "Mountain View");
        assert!(body["timestamp"].is_string());
        assert_eq!(state.resolver.store().len().await, 0);
    }

    #[tokio::test]
    async fn test_ip_to_coords_requires_ip() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::at(1.0, 1.0));

        for uri in ["/api/ip-to-coords", "/api/ip-to-coords?ip="] {
            let (status, body) = get_json(create_router(state.clone()), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["error"], "ip parameter is required");
        }
    }

    #[tokio::test]
    async fn test_ip_to_coords_unavailable() {
        let state = create_test_state(FakeGeocoder::default(), FakeLocator::unavailable());
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/ip-to-coords?ip=10.0.0.1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_handler_panic_is_generic_500() {
        let geocoder = FakeGeocoder {
            panics: true,
            ..FakeGeocoder::default()
        };
        let state = create_test_state(geocoder, FakeLocator::default());
        let app = create_router(state);

        let (status, body) = get_json(app, "/api/reverse?lat=1&lon=1").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }

    #[test]
    fn test_api_error_from_upstream() {
        let err = ApiError::from(Error::Upstream {
            status: 429,
            message: "slow down".to_string(),
        });
        assert_eq!(err.status, StatusCode::TOO_MANY_REQUESTS);
    }
}
