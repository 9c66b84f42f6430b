//! AI Handlers
//!
//! Thin adapters from the wire DTOs to the advisor. Provider failures are
//! already folded into fallback values by the time a result reaches here;
//! only configuration absence turns into an error response.

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::dto::{
    insight_dtos, into_transactions, AnalysisRequest, AnalysisResponse, BudgetOptimizeRequest,
    BudgetOptimizeResponse, CategorizationResponse, CategorizeRequest, ChatRequest, ChatResponse,
    EmbedResponse, InsightsResponse, RecommendationsResponse, MAX_EMBED_TEXT_BYTES,
};
use crate::error::{ApiError, ApiResult};
use crate::extractors::ValidatedJson;
use crate::state::AppState;

/// Categorize transactions
#[utoipa::path(
    post,
    path = "/api/v1/ai/categorize",
    tag = "AI",
    request_body = CategorizeRequest,
    responses(
        (status = 200, description = "One result per transaction, in input order", body = Vec<CategorizationResponse>),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No LLM backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn categorize(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<CategorizeRequest>,
) -> ApiResult<Json<Vec<CategorizationResponse>>> {
    let transactions = into_transactions(request.into_inputs())?;
    let results = state.service.categorize(&transactions).await?;
    Ok(Json(results.into_iter().map(CategorizationResponse::from).collect()))
}

/// Analyze spending patterns
#[utoipa::path(
    post,
    path = "/api/v1/ai/analyze",
    tag = "AI",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Insights, recommendations and health score", body = AnalysisResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No LLM backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn analyze(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AnalysisRequest>,
) -> ApiResult<Json<AnalysisResponse>> {
    let transactions = into_transactions(request.transactions)?;
    let report = state
        .analyzer
        .analyze_spending_patterns(&request.user_id, &transactions, &request.time_period)
        .await?;
    Ok(Json(report.into()))
}

/// Personalized recommendations
#[utoipa::path(
    post,
    path = "/api/v1/ai/recommendations",
    tag = "AI",
    request_body = AnalysisRequest,
    responses(
        (status = 200, description = "Recommendation summaries", body = RecommendationsResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No LLM backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn recommendations(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<AnalysisRequest>,
) -> ApiResult<Json<RecommendationsResponse>> {
    let transactions = into_transactions(request.transactions)?;
    let recommendations = state
        .analyzer
        .generate_recommendations(&request.user_id, &transactions)
        .await?;
    Ok(Json(RecommendationsResponse { recommendations }))
}

/// Conversational financial questions
#[utoipa::path(
    post,
    path = "/api/v1/ai/chat",
    tag = "AI",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Answer and context sources", body = ChatResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No LLM backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn chat(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let context = request.chat_context();
    let reply = state
        .service
        .chat(&request.user_id, &request.message, &context)
        .await?;
    Ok(Json(reply.into()))
}

/// Budget optimization suggestions
#[utoipa::path(
    post,
    path = "/api/v1/ai/budget/optimize",
    tag = "AI",
    request_body = BudgetOptimizeRequest,
    responses(
        (status = 200, description = "Suggestions as insights", body = BudgetOptimizeResponse),
        (status = 400, description = "Invalid request", body = crate::error::ErrorResponse),
        (status = 503, description = "No LLM backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn optimize_budget(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<BudgetOptimizeRequest>,
) -> ApiResult<Json<BudgetOptimizeResponse>> {
    if let Some(user_id) = request.user_id.as_deref() {
        tracing::debug!(user_id, "Budget optimization requested");
    }
    let suggestions = state.service.optimize_budget(&request.budget_data()).await?;
    Ok(Json(BudgetOptimizeResponse {
        suggestions: insight_dtos(suggestions),
    }))
}

/// Text embedding
///
/// The body is the raw text to embed.
#[utoipa::path(
    post,
    path = "/api/v1/ai/embed",
    tag = "AI",
    request_body(content = String, content_type = "text/plain"),
    responses(
        (status = 200, description = "Embedding vector", body = EmbedResponse),
        (status = 400, description = "Empty or oversized text", body = crate::error::ErrorResponse),
        (status = 502, description = "Embedding backend failed", body = crate::error::ErrorResponse),
        (status = 503, description = "No embedding backend configured", body = crate::error::ErrorResponse)
    )
)]
pub async fn embed(State(state): State<Arc<AppState>>, text: String) -> ApiResult<Json<EmbedResponse>> {
    let embedder = state
        .embedder
        .as_ref()
        .ok_or_else(|| ApiError::Configuration("No embedding backend configured".to_string()))?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ApiError::ValidationError("text must not be empty".to_string()));
    }
    if text.len() > MAX_EMBED_TEXT_BYTES {
        return Err(ApiError::ValidationError(format!(
            "text must be at most {MAX_EMBED_TEXT_BYTES} bytes"
        )));
    }

    let embeddings = embedder.embed(text).await?;
    Ok(Json(EmbedResponse { embeddings }))
}

/// Cached insights for a user
#[utoipa::path(
    get,
    path = "/api/v1/ai/insights/{user_id}",
    tag = "AI",
    params(
        ("user_id" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Cached insights; empty when none", body = InsightsResponse)
    )
)]
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<InsightsResponse>> {
    let insights = state.analyzer.get_cached_insights(&user_id).await?;
    Ok(Json(InsightsResponse {
        insights: insight_dtos(insights),
    }))
}
