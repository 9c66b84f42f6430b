//! OpenAPI Documentation

use utoipa::OpenApi;

use crate::dto;
use crate::error::ErrorResponse;
use crate::handlers;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "finsight AI API",
        description = "Transaction categorization, spending analysis, recommendations, chat and budget optimization backed by interchangeable LLM providers.",
        version = "0.1.0",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8000", description = "Local Development")
    ),
    paths(
        // Health
        handlers::health::service_info,
        handlers::health::health_check,
        handlers::health::readiness_check,
        // AI
        handlers::ai::categorize,
        handlers::ai::analyze,
        handlers::ai::recommendations,
        handlers::ai::chat,
        handlers::ai::optimize_budget,
        handlers::ai::embed,
        handlers::ai::get_insights,
    ),
    components(
        schemas(
            ErrorResponse,
            dto::ServiceInfo,
            dto::TransactionInput,
            dto::CategorizeRequest,
            dto::CategorizationResponse,
            dto::AnalysisRequest,
            dto::AnalysisResponse,
            dto::InsightDto,
            dto::RecommendationsResponse,
            dto::InsightsResponse,
            dto::ChatRequest,
            dto::ChatResponse,
            dto::BudgetCategoryInput,
            dto::BudgetOptimizeRequest,
            dto::BudgetOptimizeResponse,
            dto::EmbedResponse,
            handlers::health::HealthResponse,
            handlers::health::ReadinessResponse,
            handlers::health::ComponentStatus,
        )
    ),
    tags(
        (name = "Health", description = "Service banner and probes"),
        (name = "AI", description = "Model-backed financial assistance")
    )
)]
pub struct ApiDoc;
