//! finsight REST API
//!
//! HTTP surface for the financial assistant.
//!
//! # API Structure
//!
//! ```text
//! /                      - Service banner
//! /health, /ready        - Probes
//! /api/v1/ai/
//! ├── /categorize        - Categorize transactions
//! ├── /analyze           - Insights, recommendations, health score
//! ├── /recommendations   - Recommendations only
//! ├── /chat              - Conversational questions
//! ├── /budget/optimize   - Budget suggestions
//! ├── /embed             - Text embeddings
//! └── /insights/:user_id - Cached insights
//! ```
//!
//! Errors are `{code, msg}` JSON: 400 for invalid input, 503 when no model
//! backend is configured.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod state;

use axum::extract::DefaultBodyLimit;
use axum::http::HeaderName;
use axum::Router;
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub use error::{ApiError, ApiResult};
pub use state::AppState;

/// API configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Enable CORS for browser clients
    pub enable_cors: bool,
    /// Allowed origins for CORS
    pub cors_origins: Vec<String>,
    pub enable_compression: bool,
    pub enable_tracing: bool,
    /// Serve Swagger UI at `/swagger-ui`
    pub enable_swagger: bool,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            enable_cors: true,
            cors_origins: vec!["*".to_string()],
            enable_compression: true,
            enable_tracing: true,
            enable_swagger: true,
            max_body_size: 2 * 1024 * 1024, // 2MB
        }
    }
}

/// Create the main API router with all middleware
pub fn create_router(state: Arc<AppState>, config: ApiConfig) -> Router {
    let mut router = Router::new()
        .nest("/api/v1", routes::api_v1_routes())
        .merge(routes::health_routes());

    if config.enable_swagger {
        router = router.merge(routes::swagger_routes());
    }

    let mut router = router
        .layer(axum::middleware::from_fn(middleware::timing_middleware))
        .layer(DefaultBodyLimit::max(config.max_body_size))
        .with_state(state);

    // Request IDs
    let x_request_id = HeaderName::from_static("x-request-id");
    router = router
        .layer(PropagateRequestIdLayer::new(x_request_id.clone()))
        .layer(SetRequestIdLayer::new(x_request_id, MakeRequestUuid));

    if config.enable_tracing {
        router = router.layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                let request_id = request
                    .headers()
                    .get("x-request-id")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or("unknown");

                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    request_id = %request_id,
                )
            }),
        );
    }

    if config.enable_compression {
        router = router.layer(CompressionLayer::new());
    }

    if config.enable_cors {
        let cors = if config.cors_origins.iter().any(|o| o == "*") {
            CorsLayer::permissive()
        } else {
            CorsLayer::new()
                .allow_origin(
                    config
                        .cors_origins
                        .iter()
                        .filter_map(|o| o.parse().ok())
                        .collect::<Vec<_>>(),
                )
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers(Any)
        };
        router = router.layer(cors);
    }

    router
}

/// Create a minimal router for testing
pub fn create_test_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_v1_routes())
        .merge(routes::health_routes())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert!(config.enable_cors);
        assert!(config.enable_swagger);
        assert_eq!(config.max_body_size, 2 * 1024 * 1024);
    }
}
