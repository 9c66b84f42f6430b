//! Analysis, recommendation and insight DTOs

use finsight_advisor::{AnalysisReport, DEFAULT_TIME_PERIOD};
use finsight_types::{Insight, InsightType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::transaction::TransactionInput;

fn default_time_period() -> String {
    DEFAULT_TIME_PERIOD.to_string()
}

/// Body of `POST /analyze` and `POST /recommendations`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct AnalysisRequest {
    #[validate(length(min = 1, max = 128, message = "user_id must be 1-128 characters"))]
    pub user_id: String,
    #[validate(nested)]
    pub transactions: Vec<TransactionInput>,
    /// `last_<n>_days` or `all`
    #[serde(default = "default_time_period")]
    #[schema(example = "last_30_days")]
    pub time_period: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InsightDto {
    /// `insight` or `error`
    #[serde(rename = "type")]
    pub insight_type: String,
    pub title: String,
    pub description: String,
    pub confidence: f64,
}

impl From<Insight> for InsightDto {
    fn from(insight: Insight) -> Self {
        let insight_type = match insight.insight_type {
            InsightType::Insight => "insight",
            InsightType::Error => "error",
        };
        Self {
            insight_type: insight_type.to_string(),
            title: insight.title,
            description: insight.description,
            confidence: insight.confidence,
        }
    }
}

pub fn insight_dtos(insights: Vec<Insight>) -> Vec<InsightDto> {
    insights.into_iter().map(InsightDto::from).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AnalysisResponse {
    pub insights: Vec<InsightDto>,
    /// One `"Title: description"` line per recommendation
    pub recommendations: Vec<String>,
    /// 0 to 100; 50 is break-even
    pub financial_health_score: f64,
}

impl From<AnalysisReport> for AnalysisResponse {
    fn from(report: AnalysisReport) -> Self {
        Self {
            insights: insight_dtos(report.insights),
            recommendations: report.recommendations,
            financial_health_score: report.financial_health_score,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct RecommendationsResponse {
    pub recommendations: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InsightsResponse {
    pub insights: Vec<InsightDto>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_time_period_default() {
        let request: AnalysisRequest =
            serde_json::from_value(json!({"user_id": "u1", "transactions": []})).unwrap();
        assert_eq!(request.time_period, "last_30_days");
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_nested_validation() {
        let request: AnalysisRequest = serde_json::from_value(json!({
            "user_id": "u1",
            "transactions": [{"description": "", "amount": 1, "date": "2024-01-01"}]
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: AnalysisRequest =
            serde_json::from_value(json!({"user_id": "", "transactions": []})).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_insight_dto_type() {
        let dto = InsightDto::from(Insight::error("Analysis Error", "boom"));
        let value = serde_json::to_value(dto).unwrap();
        assert_eq!(value["type"], "error");
        assert_eq!(value["confidence"], 0.0);
    }
}
