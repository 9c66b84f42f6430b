//! API Routes

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::handlers;
use crate::state::AppState;

/// Create API v1 routes
pub fn api_v1_routes() -> Router<Arc<AppState>> {
    Router::new().nest("/ai", ai_routes())
}

/// Model-backed routes under `/api/v1/ai`
fn ai_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/categorize", post(handlers::ai::categorize))
        .route("/analyze", post(handlers::ai::analyze))
        .route("/recommendations", post(handlers::ai::recommendations))
        .route("/chat", post(handlers::ai::chat))
        .route("/budget/optimize", post(handlers::ai::optimize_budget))
        .route("/embed", post(handlers::ai::embed))
        .route("/insights/:user_id", get(handlers::ai::get_insights))
}

/// Service banner and probes
pub fn health_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::health::service_info))
        .route("/health", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check))
}

/// Create Swagger UI routes
pub fn swagger_routes() -> Router<Arc<AppState>> {
    use crate::openapi::ApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    Router::new().merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
