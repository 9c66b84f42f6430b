//! Task outputs handed back to callers

use serde::{Deserialize, Serialize};

use crate::category::Category;

/// Confidence given to a result produced after the pipeline failed
pub const FALLBACK_CONFIDENCE: f64 = 0.1;

/// Title used when a section carries no heading of its own
pub const DEFAULT_INSIGHT_TITLE: &str = "Financial Insight";

/// Confidence attached to insights parsed from free text
pub const INSIGHT_CONFIDENCE: f64 = 0.8;

/// Clamp a confidence into `[0.0, 1.0]`. NaN carries no trust at all.
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Outcome of categorizing a single transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorizationResult {
    pub transaction_id: String,
    pub suggested_category: Category,
    pub confidence: f64,
    pub reasoning: String,
}

impl CategorizationResult {
    pub fn new(
        transaction_id: impl Into<String>,
        suggested_category: Category,
        confidence: f64,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            transaction_id: transaction_id.into(),
            suggested_category,
            confidence: clamp_confidence(confidence),
            reasoning: reasoning.into(),
        }
    }

    /// Result substituted when categorization could not complete
    pub fn fallback(transaction_id: impl Into<String>, error: impl std::fmt::Display) -> Self {
        Self::new(
            transaction_id,
            Category::FALLBACK,
            FALLBACK_CONFIDENCE,
            format!("Error in categorization: {error}"),
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InsightType {
    Insight,
    Error,
}

/// One unit of narrative analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    #[serde(rename = "type")]
    pub insight_type: InsightType,
    pub title: String,
    pub description: String,
    pub confidence: f64,
}

impl Insight {
    pub fn new(title: impl Into<String>, description: impl Into<String>, confidence: f64) -> Self {
        Self {
            insight_type: InsightType::Insight,
            title: title.into(),
            description: description.into(),
            confidence: clamp_confidence(confidence),
        }
    }

    /// An error insight always carries zero confidence
    pub fn error(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            insight_type: InsightType::Error,
            title: title.into(),
            description: description.into(),
            confidence: 0.0,
        }
    }

    pub fn is_error(&self) -> bool {
        self.insight_type == InsightType::Error
    }
}

/// A conversational answer with the context labels it drew on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub response: String,
    pub sources: Vec<String>,
}

impl ChatReply {
    pub const APOLOGY: &'static str =
        "I'm sorry, I encountered an error processing your request. Please try again.";

    pub fn new(response: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            response: response.into(),
            sources,
        }
    }

    pub fn apology() -> Self {
        Self::new(Self::APOLOGY, Vec::new())
    }
}

/// A personalized recommendation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impact: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeline: Option<String>,
    pub confidence: f64,
}

impl Recommendation {
    pub fn new(title: impl Into<String>, description: impl Into<String>, confidence: f64) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            impact: None,
            timeline: None,
            confidence: clamp_confidence(confidence),
        }
    }

    pub fn with_impact(mut self, impact: impl Into<String>) -> Self {
        self.impact = Some(impact.into());
        self
    }

    pub fn with_timeline(mut self, timeline: impl Into<String>) -> Self {
        self.timeline = Some(timeline.into());
        self
    }

    /// Placeholder returned when recommendations could not be generated
    pub fn fallback(error: impl std::fmt::Display) -> Self {
        Self::new(
            "Recommendations Unavailable",
            format!("Unable to generate recommendations: {error}"),
            0.0,
        )
    }

    /// One-line rendering, `Title: description`
    pub fn summary(&self) -> String {
        if self.title.is_empty() {
            self.description.clone()
        } else if self.description.is_empty() {
            self.title.clone()
        } else {
            format!("{}: {}", self.title, self.description)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_confidence() {
        assert_eq!(clamp_confidence(0.95), 0.95);
        assert_eq!(clamp_confidence(1.7), 1.0);
        assert_eq!(clamp_confidence(-0.2), 0.0);
        assert_eq!(clamp_confidence(f64::NAN), 0.0);
        assert_eq!(clamp_confidence(f64::INFINITY), 1.0);
    }

    #[test]
    fn test_categorization_fallback() {
        let result = CategorizationResult::fallback("txn-1", "provider timed out");
        assert_eq!(result.suggested_category, Category::OtherExpense);
        assert_eq!(result.confidence, 0.1);
        assert_eq!(result.reasoning, "Error in categorization: provider timed out");
    }

    #[test]
    fn test_constructors_clamp() {
        assert_eq!(CategorizationResult::new("t", Category::Food, 3.0, "x").confidence, 1.0);
        assert_eq!(Insight::new("t", "d", -1.0).confidence, 0.0);
        assert_eq!(Recommendation::new("t", "d", 2.0).confidence, 1.0);
    }

    #[test]
    fn test_insight_serializes_type_field() {
        let insight = Insight::error("Analysis Error", "Unable to generate insights: boom");
        let json = serde_json::to_value(&insight).unwrap();
        assert_eq!(json["type"], "error");
        assert_eq!(json["confidence"], 0.0);
        assert!(insight.is_error());
    }

    #[test]
    fn test_apology_has_no_sources() {
        let reply = ChatReply::apology();
        assert!(reply.sources.is_empty());
        assert!(reply.response.starts_with("I'm sorry"));
    }

    #[test]
    fn test_recommendation_summary() {
        let rec = Recommendation::new("Cut dining out", "Cook at home twice a week", 0.8)
            .with_impact("Save $120/month");
        assert_eq!(rec.summary(), "Cut dining out: Cook at home twice a week");
        assert_eq!(rec.impact.as_deref(), Some("Save $120/month"));
    }
}
