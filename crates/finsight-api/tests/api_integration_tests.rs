//! API Integration Tests
//!
//! Full request/response cycles against a router backed by a scripted model,
//! so no network access is needed.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use finsight_api::{create_router, create_test_router, ApiConfig, AppState};
use finsight_llm::{
    CompletionRequest, GatewayConfig, HashEmbedder, LLMError, ModelGateway, RetryPolicy,
    ScriptedProvider,
};
use serde_json::{json, Value};
use tower::ServiceExt;

/// Answers each task by recognising its prompt
fn route_prompt(request: &CompletionRequest) -> Result<String, LLMError> {
    let prompt = request.last_user_message().unwrap_or_default();
    if prompt.starts_with("Analyze this financial transaction") {
        if prompt.contains("FAIL") {
            return Err(LLMError::RequestFailed {
                status: Some(400),
                message: "rejected".into(),
            });
        }
        if prompt.contains("PAYROLL") {
            return Ok("Category: salary\nConfidence: 0.95\nReasoning: Payroll deposit".into());
        }
        return Ok("Category: food\nConfidence: 0.9\nReasoning: Restaurant".into());
    }
    if prompt.starts_with("Analyze the following spending patterns") {
        return Ok("**Dining:** Restaurants are your top expense.\n\nYou saved 20% this month.".into());
    }
    if prompt.starts_with("Based on the user's financial data") {
        return Ok("Title: Cook at home\nDescription: Replace two takeout meals a week.\nImpact: $120/month".into());
    }
    if prompt.starts_with("Analyze the current budget allocation") {
        return Ok("Cut dining by $50.\n\nMove the surplus into savings.".into());
    }
    Ok("Your balance looks healthy.".into())
}

fn scripted_gateway(provider: ScriptedProvider) -> Arc<ModelGateway> {
    Arc::new(
        ModelGateway::builder()
            .with_config(GatewayConfig {
                retry: RetryPolicy::none(),
                ..GatewayConfig::default()
            })
            .with_provider(provider.into_arc())
            .build(),
    )
}

fn test_router() -> Router {
    let state = AppState::with_gateway(scripted_gateway(ScriptedProvider::from_fn(route_prompt)))
        .with_embedder(Arc::new(HashEmbedder::new(8)));
    create_test_router(Arc::new(state))
}

fn unconfigured_router() -> Router {
    let state = AppState::with_gateway(Arc::new(ModelGateway::builder().build()));
    create_test_router(Arc::new(state))
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap_or(json!(null));
    (status, json)
}

/// Make a request and get the JSON response
async fn json_request(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json");

    let body = match body {
        Some(json_body) => Body::from(serde_json::to_vec(&json_body).unwrap()),
        None => Body::empty(),
    };

    send(router, request.body(body).unwrap()).await
}

async fn text_request(router: &Router, uri: &str, text: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("Content-Type", "text/plain")
        .body(Body::from(text.to_string()))
        .unwrap();
    send(router, request).await
}

// =============================================================================
// Health
// =============================================================================

mod health {
    use super::*;

    #[tokio::test]
    async fn test_banner_and_health() {
        let router = test_router();

        let (status, json) = json_request(&router, "GET", "/", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["service"], "finsight-ai");

        let (status, json) = json_request(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "healthy");
    }

    #[tokio::test]
    async fn test_ready_reports_providers() {
        let (status, json) = json_request(&test_router(), "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ready");
        assert_eq!(json["providers"][0]["name"], "scripted");
        assert_eq!(json["embedder"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_not_ready_without_providers() {
        let (status, json) = json_request(&unconfigured_router(), "GET", "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["status"], "not_ready");
        assert_eq!(json["embedder"]["status"], "not_configured");
    }

    #[tokio::test]
    async fn test_full_router_serves_probes() {
        let state = AppState::with_gateway(scripted_gateway(ScriptedProvider::from_fn(route_prompt)));
        let router = create_router(Arc::new(state), ApiConfig::default());
        let response = router
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }
}

// =============================================================================
// Categorization
// =============================================================================

mod categorize {
    use super::*;

    #[tokio::test]
    async fn test_categorize_preserves_order_and_isolates_failures() {
        let body = json!({
            "transactions": [
                {"id": "t1", "description": "Chipotle", "amount": -12.40, "date": "2024-03-01"},
                {"description": "FAIL charge", "amount": -3, "date": "2024-03-02"},
                {"id": "t3", "description": "ACME PAYROLL", "amount": 4200, "date": "2024-03-03"}
            ]
        });
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/categorize", Some(body)).await;
        assert_eq!(status, StatusCode::OK);

        let results = json.as_array().unwrap();
        assert_eq!(results.len(), 3);

        assert_eq!(results[0]["transaction_id"], "t1");
        assert_eq!(results[0]["suggested_category"], "food");
        assert_eq!(results[0]["confidence"], 0.9);

        assert_eq!(results[1]["transaction_id"], "txn-1");
        assert_eq!(results[1]["suggested_category"], "other_expense");
        assert_eq!(results[1]["confidence"], 0.1);
        assert!(results[1]["reasoning"]
            .as_str()
            .unwrap()
            .starts_with("Error in categorization:"));

        assert_eq!(results[2]["suggested_category"], "salary");
    }

    #[tokio::test]
    async fn test_categorize_accepts_bare_array() {
        let body = json!([{"description": "Chipotle", "amount": -12, "date": "2024-03-01"}]);
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/categorize", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json[0]["transaction_id"], "txn-0");
    }

    #[tokio::test]
    async fn test_categorize_validation() {
        let router = test_router();

        let body = json!([{"description": "", "amount": -12, "date": "2024-03-01"}]);
        let (status, json) = json_request(&router, "POST", "/api/v1/ai/categorize", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], 1002);

        let body = json!([{"description": "x", "amount": -12, "date": "2024-03-01", "type": "transfer"}]);
        let (status, json) = json_request(&router, "POST", "/api/v1/ai/categorize", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["msg"].as_str().unwrap().contains("transfer"));

        let (status, _) = json_request(&router, "POST", "/api/v1/ai/categorize", Some(json!({"nope": 1}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_categorize_without_backend_is_503() {
        let body = json!([{"description": "Chipotle", "amount": -12, "date": "2024-03-01"}]);
        let (status, json) = json_request(&unconfigured_router(), "POST", "/api/v1/ai/categorize", Some(body)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], 5001);
        assert!(json["msg"].as_str().unwrap().contains("No LLM client configured"));
    }
}

// =============================================================================
// Analysis and recommendations
// =============================================================================

mod analysis {
    use super::*;

    fn analysis_body() -> Value {
        json!({
            "user_id": "user-42",
            "transactions": [
                {"description": "Salary", "amount": 5000, "date": "2024-03-01"},
                {"description": "Dinner", "amount": -1000, "date": "2024-03-05", "category": "food"}
            ]
        })
    }

    #[tokio::test]
    async fn test_analyze_then_read_cache() {
        let router = test_router();

        let (status, json) = json_request(&router, "GET", "/api/v1/ai/insights/user-42", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["insights"], json!([]));

        let (status, json) = json_request(&router, "POST", "/api/v1/ai/analyze", Some(analysis_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["insights"][0]["title"], "Dining");
        assert_eq!(json["insights"][0]["type"], "insight");
        assert_eq!(json["insights"][1]["title"], "Financial Insight");
        assert_eq!(json["recommendations"][0], "Cook at home: Replace two takeout meals a week.");
        assert_eq!(json["financial_health_score"], 90.0);

        let (status, cached) = json_request(&router, "GET", "/api/v1/ai/insights/user-42", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cached["insights"], json["insights"]);
    }

    #[tokio::test]
    async fn test_recommendations() {
        let (status, json) =
            json_request(&test_router(), "POST", "/api/v1/ai/recommendations", Some(analysis_body())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["recommendations"],
            json!(["Cook at home: Replace two takeout meals a week."])
        );
    }

    #[tokio::test]
    async fn test_analyze_survives_extreme_input() {
        let body = json!({
            "user_id": "user-7",
            "time_period": "last_100000000_days",
            "transactions": [
                {"description": "Bonus", "amount": "70000000000000000000000000000", "date": "2024-03-01"},
                {"description": "Bonus", "amount": "70000000000000000000000000000", "date": "2024-03-02"},
                {"description": "Yacht", "amount": "-70000000000000000000000000000", "date": "2024-03-03"}
            ]
        });
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/analyze", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["insights"][0]["title"], "Dining");
        assert!(json["financial_health_score"].as_f64().is_some());
    }

    #[tokio::test]
    async fn test_analyze_requires_user_id() {
        let body = json!({"user_id": "", "transactions": []});
        let (status, _) = json_request(&test_router(), "POST", "/api/v1/ai/analyze", Some(body)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

// =============================================================================
// Chat, budget and embeddings
// =============================================================================

mod conversation {
    use super::*;

    #[tokio::test]
    async fn test_chat_with_context() {
        let body = json!({
            "user_id": "u1",
            "message": "Am I doing okay?",
            "context": {"current_balance": 1200.5, "transactions": [{}, {}], "monthly_budget": {}}
        });
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/chat", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["response"], "Your balance looks healthy.");
        assert_eq!(json["sources"], json!(["Recent Transactions", "Budget Data"]));
    }

    #[tokio::test]
    async fn test_chat_failure_returns_apology() {
        let state = AppState::with_gateway(scripted_gateway(ScriptedProvider::failing(
            LLMError::Authentication {
                message: "bad key".into(),
            },
        )));
        let router = create_test_router(Arc::new(state));
        let body = json!({"user_id": "u1", "message": "hi"});

        let (status, json) = json_request(&router, "POST", "/api/v1/ai/chat", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            json["response"],
            "I'm sorry, I encountered an error processing your request. Please try again."
        );
        assert_eq!(json["sources"], json!([]));
    }

    #[tokio::test]
    async fn test_budget_optimize() {
        let body = json!({"categories": {"dining": {"allocated": 200, "spent": 260}}});
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/budget/optimize", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        let suggestions = json["suggestions"].as_array().unwrap();
        assert_eq!(suggestions.len(), 2);
        assert_eq!(suggestions[0]["title"], "Budget Optimization");
    }

    #[tokio::test]
    async fn test_budget_optimize_with_extreme_spend() {
        let body = json!({"categories": {
            "dining": {"allocated": "0.01", "spent": "70000000000000000000000000000"},
            "travel": {"allocated": "70000000000000000000000000000", "spent": "70000000000000000000000000000"}
        }});
        let (status, json) = json_request(&test_router(), "POST", "/api/v1/ai/budget/optimize", Some(body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["suggestions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_embed() {
        let router = test_router();
        let (status, json) = text_request(&router, "/api/v1/ai/embed", "coffee subscription").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["embeddings"].as_array().unwrap().len(), 8);

        let (status, _) = text_request(&router, "/api/v1/ai/embed", "   ").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_embed_without_embedder_is_503() {
        let state = AppState::with_gateway(scripted_gateway(ScriptedProvider::from_fn(route_prompt)));
        let router = create_test_router(Arc::new(state));
        let (status, _) = text_request(&router, "/api/v1/ai/embed", "coffee").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }
}
