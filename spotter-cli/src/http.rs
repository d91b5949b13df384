//! HTTP boundary: `GET /spots` and `GET /health`.
//!
//! Query parameters are validated here, before the search runs. Each
//! request gets its own [`CancellationToken`]; it is cancelled when the
//! request future is dropped (client disconnect) or when the configured
//! deadline passes.

use std::{fmt, sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use spotter_core::{
    Coordinate, CoordinateError, QueryError, RegionKind, RegionQuery, Spot, SpotQueryService,
    SpotSource,
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;

const INVALID_LATITUDE: &str = "Invalid latitude";
const INVALID_LONGITUDE: &str = "Invalid longitude";
const INVALID_RADIUS: &str = "Invalid radius";
const INVALID_REGION_TYPE: &str = "Invalid region type";

/// Shared state handed to every request handler.
pub struct AppState {
    service: SpotQueryService<Arc<dyn SpotSource>>,
    request_timeout: Duration,
}

impl AppState {
    /// Serve searches from `source`, cancelling any that run past
    /// `request_timeout`.
    #[must_use]
    pub fn new(source: Arc<dyn SpotSource>, request_timeout: Duration) -> Self {
        Self {
            service: SpotQueryService::new(source),
            request_timeout,
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("request_timeout", &self.request_timeout)
            .finish_non_exhaustive()
    }
}

/// Build the router exposing the search and health endpoints.
#[must_use]
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/spots", get(search_spots))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Raw `GET /spots` query string.
///
/// Fields stay textual so each one can be rejected with its own message.
#[derive(Debug, Default, Deserialize)]
pub struct SpotsParams {
    /// Centre latitude in degrees.
    pub latitude: Option<String>,
    /// Centre longitude in degrees.
    pub longitude: Option<String>,
    /// Search radius in metres.
    pub radius: Option<String>,
    /// Region kind; `circle` when absent.
    #[serde(rename = "type")]
    pub region_type: Option<String>,
}

impl SpotsParams {
    /// Validate the parameters and build the search they describe.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::BadRequest`] naming the first invalid parameter.
    pub fn to_region_query(&self) -> Result<RegionQuery, ApiError> {
        let latitude = parse_finite(self.latitude.as_deref(), INVALID_LATITUDE)?;
        let longitude = parse_finite(self.longitude.as_deref(), INVALID_LONGITUDE)?;
        let center = Coordinate::new(latitude, longitude).map_err(|err| match err {
            CoordinateError::LongitudeOutOfRange(_) => ApiError::BadRequest(INVALID_LONGITUDE),
            _ => ApiError::BadRequest(INVALID_LATITUDE),
        })?;
        let radius = parse_finite(self.radius.as_deref(), INVALID_RADIUS)?;
        let kind = match self.region_type.as_deref() {
            None => RegionKind::default(),
            Some(text) => text
                .parse::<RegionKind>()
                .map_err(|_| ApiError::BadRequest(INVALID_REGION_TYPE))?,
        };
        RegionQuery::new(center, radius, kind).map_err(|_| ApiError::BadRequest(INVALID_RADIUS))
    }
}

fn parse_finite(raw: Option<&str>, message: &'static str) -> Result<f64, ApiError> {
    raw.and_then(|text| text.trim().parse::<f64>().ok())
        .filter(|value| value.is_finite())
        .ok_or(ApiError::BadRequest(message))
}

/// Failures surfaced by the HTTP handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A request parameter was missing or invalid.
    #[error("{0}")]
    BadRequest(&'static str),
    /// The search itself failed.
    #[error(transparent)]
    Query(#[from] QueryError),
}

impl ApiError {
    /// HTTP status the error maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::Query(QueryError::InvalidArgument(_)) => {
                StatusCode::BAD_REQUEST
            }
            Self::Query(QueryError::UpstreamUnavailable(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Query(QueryError::Canceled) => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            Self::BadRequest(message) => (*message).to_owned(),
            Self::Query(QueryError::InvalidArgument(reason)) => reason.clone(),
            Self::Query(QueryError::UpstreamUnavailable(source)) => {
                tracing::error!(error = %source, "spot source unavailable");
                String::from("Spot source unavailable")
            }
            Self::Query(QueryError::Canceled) => {
                tracing::warn!("spot search cancelled before completion");
                String::from("Search timed out")
            }
        };
        (status, body).into_response()
    }
}

async fn search_spots(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SpotsParams>,
) -> Result<Json<Vec<Spot>>, ApiError> {
    let query = params.to_region_query()?;
    let spots = search_with_deadline(&state, &query).await?;
    tracing::debug!(count = spots.len(), kind = %query.kind(), "answered spot search");
    Ok(Json(spots))
}

async fn search_with_deadline(
    state: &AppState,
    query: &RegionQuery,
) -> Result<Vec<Spot>, QueryError> {
    let cancel = CancellationToken::new();
    let _cancel_on_drop = cancel.clone().drop_guard();
    tokio::select! {
        result = state.service.query(query, &cancel) => result,
        () = tokio::time::sleep(state.request_timeout) => {
            cancel.cancel();
            Err(QueryError::Canceled)
        }
    }
}

/// Body of `GET /health`.
#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}
