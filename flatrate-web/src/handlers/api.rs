//! API handlers for title search and link lookup

use std::collections::BTreeMap;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use flatrate_search::{MediaSearchError, SearchQuery, ServiceGroup, StreamingService};
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::server::AppState;

/// Body of `POST /search`.
#[derive(Debug, Deserialize)]
pub struct TitleSearchRequest {
    /// Title to search for
    pub title: String,
    /// Optional release year filter; must fit a `u16`
    #[serde(default)]
    pub year: Option<u16>,
}

impl From<TitleSearchRequest> for SearchQuery {
    fn from(request: TitleSearchRequest) -> Self {
        SearchQuery::new(request.title, request.year)
    }
}

/// Body of `POST /`.
#[derive(Debug, Deserialize)]
pub struct LinkLookupRequest {
    /// Detail page URL on the scraped site
    #[serde(rename = "werstreamtesLink")]
    pub werstreamtes_link: String,
}

/// Body answered by `POST /search`.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Groups in merge order
    pub results: Vec<ServiceGroup>,
}

/// Services per source name; `None` marks a failed lookup.
pub type LookupResponse = BTreeMap<String, Option<Vec<StreamingService>>>;

/// Errors returned by API handlers.
#[derive(Debug, Error)]
pub enum ApiError {
    /// No source found a match for the requested title.
    #[error("Title not found")]
    TitleNotFound,
}

impl From<MediaSearchError> for ApiError {
    fn from(error: MediaSearchError) -> Self {
        match error {
            MediaSearchError::TitleNotFound { .. } => Self::TitleNotFound,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            Self::TitleNotFound => StatusCode::NOT_FOUND,
        };
        (status, Json(json!({ "detail": self.to_string() }))).into_response()
    }
}

/// Handles `POST /search`: aggregated title search across all sources.
///
/// # Errors
/// - `ApiError::TitleNotFound` - No source produced a match
pub async fn api_search(
    State(state): State<AppState>,
    Json(request): Json<TitleSearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    tracing::debug!(?request, "Processing title search");

    let query = SearchQuery::from(request);
    let results = state.search_service.search(&query).await?;

    Ok(Json(SearchResponse {
        results: results.into_groups(),
    }))
}

/// Handles `POST /`: flat-rate services listed on a detail page link.
///
/// Sources that fail are reported as `null` rather than failing the request.
pub async fn api_lookup(
    State(state): State<AppState>,
    Json(request): Json<LinkLookupRequest>,
) -> Json<LookupResponse> {
    tracing::debug!(?request, "Processing link lookup");

    let lookups = state
        .search_service
        .lookup_offers(&request.werstreamtes_link)
        .await;

    Json(
        lookups
            .into_iter()
            .map(|lookup| (lookup.source, lookup.services.ok()))
            .collect(),
    )
}

/// Handles `GET /health`.
pub async fn api_health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
