//! JSON API server for Flatrate
//!
//! Exposes aggregated title search and single title link lookup.

use std::net::SocketAddr;

use axum::Router;
use axum::routing::{get, post};
use flatrate_search::MediaSearchService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers::{api_health, api_lookup, api_search};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Aggregator serving every request
    pub search_service: MediaSearchService,
}

/// Address the server binds to.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to listen on
    pub host: String,
    /// TCP port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    /// `host:port` as accepted by `TcpListener::bind`.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Builds the API router around `search_service`.
pub fn build_router(search_service: MediaSearchService) -> Router {
    let state = AppState { search_service };

    Router::new()
        .route("/", post(api_lookup))
        .route("/search", post(api_search))
        .route("/health", get(api_health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serves the API until the process is stopped.
///
/// # Errors
///
/// - `std::io::Error` - If the address cannot be bound or serving fails
pub async fn run_server(
    config: ServerConfig,
    search_service: MediaSearchService,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = build_router(search_service);

    let listener = tokio::net::TcpListener::bind(config.bind_address()).await?;
    let address: SocketAddr = listener.local_addr()?;
    tracing::info!(%address, "Flatrate API listening");

    axum::serve(listener, app).await?;
    Ok(())
}
