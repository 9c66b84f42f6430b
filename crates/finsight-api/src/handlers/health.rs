//! Health Check Handlers
//!
//! Endpoints for service health monitoring.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::dto::ServiceInfo;
use crate::state::AppState;

pub const SERVICE_NAME: &str = "finsight-ai";

/// Health check response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
    pub uptime_secs: u64,
}

/// Component status
#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentStatus {
    pub name: String,
    /// `healthy`, `unavailable` or `not_configured`
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ComponentStatus {
    fn new(name: impl Into<String>, status: &str, error: Option<String>) -> Self {
        Self {
            name: name.into(),
            status: status.to_string(),
            error,
        }
    }
}

/// Readiness check response
#[derive(Debug, Serialize, ToSchema)]
pub struct ReadinessResponse {
    /// `ready` or `not_ready`
    pub status: String,
    /// Configured LLM backends in priority order
    pub providers: Vec<ComponentStatus>,
    pub embedder: ComponentStatus,
}

/// Service banner
#[utoipa::path(
    get,
    path = "/",
    tag = "Health",
    responses(
        (status = 200, description = "Service banner", body = ServiceInfo)
    )
)]
pub async fn service_info() -> Json<ServiceInfo> {
    Json(ServiceInfo {
        service: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// Health check endpoint
///
/// Returns 200 while the process is serving; dependencies are not checked.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
    })
}

/// Readiness check endpoint
///
/// Ready when at least one LLM backend is configured and reachable. The
/// embedder is reported but does not affect readiness.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Service is ready", body = ReadinessResponse),
        (status = 503, description = "No usable LLM backend", body = ReadinessResponse)
    )
)]
pub async fn readiness_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<ReadinessResponse>) {
    let availability = state.gateway().availability().await;

    let providers: Vec<ComponentStatus> = availability
        .iter()
        .map(|(kind, available)| {
            if *available {
                ComponentStatus::new(kind.as_str(), "healthy", None)
            } else {
                ComponentStatus::new(
                    kind.as_str(),
                    "unavailable",
                    Some(format!("{kind} did not respond")),
                )
            }
        })
        .collect();

    let embedder = match &state.embedder {
        Some(embedder) => ComponentStatus::new(
            format!("embeddings ({} dims)", embedder.dimension()),
            "healthy",
            None,
        ),
        None => ComponentStatus::new("embeddings", "not_configured", None),
    };

    let ready = availability.iter().any(|(_, available)| *available);
    if !ready {
        tracing::warn!(configured = availability.len(), "Readiness check failed");
    }

    let (status_code, status) = if ready {
        (StatusCode::OK, "ready")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "not_ready")
    };

    (
        status_code,
        Json(ReadinessResponse {
            status: status.to_string(),
            providers,
            embedder,
        }),
    )
}
