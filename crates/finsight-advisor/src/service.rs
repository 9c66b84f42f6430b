//! LLM Service - the orchestrator
//!
//! Every task is a linear pipeline: build the prompt, dispatch it through the
//! gateway, interpret the reply. Any failure along the way is replaced by a
//! typed, low-confidence fallback scoped to the smallest unit of work (one
//! transaction for categorization, one call otherwise). Only a missing
//! backend configuration is returned as an error.

use std::sync::Arc;

use finsight_guard::{
    parse_categorization, parse_insights, parse_insights_titled, parse_recommendations,
};
use finsight_llm::{LLMError, ModelGateway};
use finsight_prompts::{
    analysis_prompt, budget_optimization_prompt, categorization_prompt, chat_prompt,
    recommendation_prompt, structured_categorization_prompt,
};
use finsight_types::{
    BudgetData, CategorizationResult, ChatContext, ChatReply, Insight, Recommendation,
    Transaction, UserData, UserProfile,
};
use futures::stream::{self, StreamExt};

use crate::config::AdvisorConfig;
use crate::error::{AdvisorError, Result};

pub const ANALYSIS_ERROR_TITLE: &str = "Analysis Error";
pub const OPTIMIZATION_TITLE: &str = "Budget Optimization";
pub const OPTIMIZATION_ERROR_TITLE: &str = "Optimization Error";

/// Stand-in error for a reply that interpreted to nothing
fn empty_reply() -> LLMError {
    LLMError::InvalidResponse {
        message: "model returned no usable content".to_string(),
    }
}

fn record_fallback(task: &'static str, error: &LLMError) {
    tracing::warn!(task, error = %error, "LLM task failed, returning fallback");
    metrics::counter!("finsight_fallbacks_total", "task" => task).increment(1);
}

/// Orchestrates the five LLM-backed tasks
pub struct LlmService {
    gateway: Arc<ModelGateway>,
    config: AdvisorConfig,
}

impl LlmService {
    pub fn new(gateway: Arc<ModelGateway>, config: AdvisorConfig) -> Self {
        Self { gateway, config }
    }

    pub fn gateway(&self) -> &Arc<ModelGateway> {
        &self.gateway
    }

    pub fn config(&self) -> &AdvisorConfig {
        &self.config
    }

    fn ensure_configured(&self) -> Result<()> {
        self.gateway.ensure_configured().map_err(|e| match e {
            LLMError::Configuration { message } => AdvisorError::Configuration { message },
            other => AdvisorError::Configuration {
                message: other.to_string(),
            },
        })
    }

    /// Categorize each transaction independently, preserving input order.
    ///
    /// A failure for one transaction yields a fallback result at its position
    /// while the rest proceed.
    pub async fn categorize(&self, transactions: &[Transaction]) -> Result<Vec<CategorizationResult>> {
        self.ensure_configured()?;

        let concurrency = self.config.categorize_concurrency.max(1);
        tracing::info!(count = transactions.len(), concurrency, "Categorizing transactions");

        let pending: Vec<_> = transactions.iter().map(|tx| self.categorize_one(tx)).collect();
        let results = stream::iter(pending)
            .buffered(concurrency)
            .collect::<Vec<_>>()
            .await;

        Ok(results)
    }

    async fn categorize_one(&self, tx: &Transaction) -> CategorizationResult {
        let budget = self.config.budgets.categorize;
        let reply = if self.config.structured_output {
            let prompt = structured_categorization_prompt(&tx.description, tx.amount);
            self.gateway.complete_json(&prompt, budget).await
        } else {
            let prompt = categorization_prompt(&tx.description, tx.amount);
            self.gateway.complete(&prompt, budget).await
        };

        match reply {
            Ok(text) => {
                let verdict = parse_categorization(&text);
                tracing::debug!(
                    transaction_id = %tx.id,
                    category = %verdict.category,
                    confidence = verdict.confidence,
                    source = ?verdict.source,
                    "Transaction categorized"
                );
                CategorizationResult::new(
                    tx.id.clone(),
                    verdict.category,
                    verdict.confidence,
                    verdict.reasoning,
                )
            }
            Err(e) => {
                record_fallback("categorize", &e);
                CategorizationResult::fallback(tx.id.clone(), e)
            }
        }
    }

    /// Answer a question using the caller's context
    pub async fn chat(&self, user_id: &str, message: &str, context: &ChatContext) -> Result<ChatReply> {
        self.ensure_configured()?;
        tracing::info!(user_id, "Processing chat message");

        let prompt = chat_prompt(message, context);
        let reply = self
            .gateway
            .complete(&prompt, self.config.budgets.chat)
            .await
            .and_then(|text| {
                let text = text.trim();
                if text.is_empty() {
                    Err(empty_reply())
                } else {
                    Ok(text.to_string())
                }
            });

        Ok(match reply {
            Ok(text) => ChatReply::new(text, context.sources()),
            Err(e) => {
                record_fallback("chat", &e);
                ChatReply::apology()
            }
        })
    }

    /// Narrative insights on spending patterns
    pub async fn analyze(&self, transactions: &[Transaction], profile: &UserProfile) -> Result<Vec<Insight>> {
        self.ensure_configured()?;
        tracing::info!(count = transactions.len(), "Generating financial insights");

        let prompt = analysis_prompt(transactions, profile);
        let insights = self
            .gateway
            .complete(&prompt, self.config.budgets.analyze)
            .await
            .map(|text| parse_insights(&text))
            .and_then(|insights| {
                if insights.is_empty() {
                    Err(empty_reply())
                } else {
                    Ok(insights)
                }
            });

        Ok(insights.unwrap_or_else(|e| {
            record_fallback("analyze", &e);
            vec![Insight::error(
                ANALYSIS_ERROR_TITLE,
                format!("Unable to generate insights: {e}"),
            )]
        }))
    }

    /// Personalized recommendations from aggregate figures
    pub async fn recommend(&self, data: &UserData) -> Result<Vec<Recommendation>> {
        self.ensure_configured()?;
        tracing::info!("Generating recommendations");

        let prompt = recommendation_prompt(data);
        let recommendations = self
            .gateway
            .complete(&prompt, self.config.budgets.recommend)
            .await
            .map(|text| parse_recommendations(&text))
            .and_then(|recs| if recs.is_empty() { Err(empty_reply()) } else { Ok(recs) });

        Ok(recommendations.unwrap_or_else(|e| {
            record_fallback("recommend", &e);
            vec![Recommendation::fallback(e)]
        }))
    }

    /// Suggestions for rebalancing a budget
    pub async fn optimize_budget(&self, budget: &BudgetData) -> Result<Vec<Insight>> {
        self.ensure_configured()?;
        tracing::info!(categories = budget.categories.len(), "Optimizing budget");

        let prompt = budget_optimization_prompt(budget);
        let suggestions = self
            .gateway
            .complete(&prompt, self.config.budgets.optimize)
            .await
            .map(|text| parse_insights_titled(&text, OPTIMIZATION_TITLE))
            .and_then(|s| if s.is_empty() { Err(empty_reply()) } else { Ok(s) });

        Ok(suggestions.unwrap_or_else(|e| {
            record_fallback("optimize_budget", &e);
            vec![Insight::error(
                OPTIMIZATION_ERROR_TITLE,
                format!("Unable to generate budget suggestions: {e}"),
            )]
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use finsight_llm::{GatewayConfig, RetryPolicy, ScriptedProvider};
    use finsight_types::{BudgetCategory, Category};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn gateway(provider: Arc<ScriptedProvider>) -> Arc<ModelGateway> {
        Arc::new(
            ModelGateway::builder()
                .with_config(GatewayConfig {
                    retry: RetryPolicy::none(),
                    ..GatewayConfig::default()
                })
                .with_provider(provider)
                .build(),
        )
    }

    fn service(provider: Arc<ScriptedProvider>) -> LlmService {
        LlmService::new(gateway(provider), AdvisorConfig::default())
    }

    fn unconfigured() -> LlmService {
        LlmService::new(Arc::new(ModelGateway::builder().build()), AdvisorConfig::default())
    }

    fn tx(id: &str, description: &str, amount: rust_decimal::Decimal) -> Transaction {
        Transaction::new(id, description, amount, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap())
    }

    fn provider_error() -> LLMError {
        LLMError::RequestFailed {
            status: Some(400),
            message: "bad request".into(),
        }
    }

    #[tokio::test]
    async fn test_one_failure_in_batch_is_isolated() {
        let provider = ScriptedProvider::sequence(vec![
            Ok("Category: food\nConfidence: 0.9\nReasoning: cafe".into()),
            Err(provider_error()),
            Ok("Category: salary\nConfidence: 0.99\nReasoning: payroll".into()),
        ])
        .into_arc();
        let svc = service(provider.clone());

        let txs = vec![
            tx("a", "Blue Bottle Coffee", dec!(-6.50)),
            tx("b", "Mystery charge", dec!(-20)),
            tx("c", "ACME PAYROLL", dec!(4000)),
        ];
        let results = svc.categorize(&txs).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].transaction_id, "a");
        assert_eq!(results[0].suggested_category, Category::Food);

        assert_eq!(results[1].transaction_id, "b");
        assert_eq!(results[1].suggested_category, Category::OtherExpense);
        assert_eq!(results[1].confidence, 0.1);
        assert!(results[1].reasoning.starts_with("Error in categorization:"));

        assert_eq!(results[2].transaction_id, "c");
        assert_eq!(results[2].suggested_category, Category::Salary);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn test_concurrent_categorization_preserves_order() {
        let provider = ScriptedProvider::from_fn(|req| {
            let prompt = req.last_user_message().unwrap_or_default();
            if prompt.contains("Uber") {
                Ok("Category: transport\nConfidence: 0.8".into())
            } else {
                Ok("Category: shopping\nConfidence: 0.7".into())
            }
        })
        .into_arc();
        let config = AdvisorConfig {
            categorize_concurrency: 4,
            ..AdvisorConfig::default()
        };
        let svc = LlmService::new(gateway(provider), config);

        let txs: Vec<Transaction> = (0..10)
            .map(|i| {
                let description = if i % 2 == 0 { "Uber trip" } else { "Amazon order" };
                tx(&format!("t{i}"), description, dec!(-15))
            })
            .collect();
        let results = svc.categorize(&txs).await.unwrap();

        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.transaction_id, format!("t{i}"));
            let expected = if i % 2 == 0 { Category::Transport } else { Category::Shopping };
            assert_eq!(result.suggested_category, expected);
        }
    }

    #[tokio::test]
    async fn test_structured_mode_requests_json() {
        let provider = ScriptedProvider::always(r#"{"category": "housing", "confidence": 0.97, "reasoning": "rent"}"#).into_arc();
        let config = AdvisorConfig {
            structured_output: true,
            ..AdvisorConfig::default()
        };
        let svc = LlmService::new(gateway(provider.clone()), config);

        let results = svc.categorize(&[tx("r", "Rent", dec!(-1500))]).await.unwrap();
        assert_eq!(results[0].suggested_category, Category::Housing);

        let request = &provider.requests()[0];
        assert!(request.json_mode);
        assert_eq!(request.max_tokens, Some(100));
    }

    #[tokio::test]
    async fn test_configuration_error_before_any_call() {
        let svc = unconfigured();
        let err = svc.categorize(&[tx("a", "x", dec!(1))]).await.unwrap_err();
        assert!(err.is_configuration());
        assert!(svc.chat("u1", "hi", &ChatContext::new()).await.unwrap_err().is_configuration());
        assert!(svc.analyze(&[], &UserProfile::default()).await.is_err());
        assert!(svc.recommend(&UserData::default()).await.is_err());
        assert!(svc.optimize_budget(&BudgetData::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_chat_reply_and_sources() {
        let provider = ScriptedProvider::always("  Cut back on takeout.  ").into_arc();
        let svc = service(provider.clone());
        let context = ChatContext::new()
            .with("transactions", json!([]))
            .with("goals", json!([]));

        let reply = svc.chat("u1", "How do I save?", &context).await.unwrap();
        assert_eq!(reply.response, "Cut back on takeout.");
        assert_eq!(reply.sources, vec!["Recent Transactions", "Financial Goals"]);
        assert_eq!(provider.requests()[0].max_tokens, Some(500));
    }

    #[tokio::test]
    async fn test_chat_failure_is_apology() {
        let provider = ScriptedProvider::failing(provider_error()).into_arc();
        let svc = service(provider);
        let context = ChatContext::new().with("transactions", json!([]));

        let reply = svc.chat("u1", "hello", &context).await.unwrap();
        assert_eq!(reply, ChatReply::apology());
        assert!(reply.sources.is_empty());
    }

    #[tokio::test]
    async fn test_analyze_sections_and_failure() {
        let provider = ScriptedProvider::sequence(vec![
            Ok("Food spending rose.\n\nRent is stable.".into()),
            Err(LLMError::Timeout { after_ms: 30_000 }),
            Ok("   ".into()),
        ])
        .into_arc();
        let svc = service(provider);

        let insights = svc.analyze(&[], &UserProfile::default()).await.unwrap();
        assert_eq!(insights.len(), 2);
        assert!(insights.iter().all(|i| i.confidence == 0.8));

        let failed = svc.analyze(&[], &UserProfile::default()).await.unwrap();
        assert_eq!(failed.len(), 1);
        assert!(failed[0].is_error());
        assert_eq!(failed[0].title, "Analysis Error");
        assert_eq!(failed[0].confidence, 0.0);
        assert!(failed[0].description.starts_with("Unable to generate insights:"));

        let empty = svc.analyze(&[], &UserProfile::default()).await.unwrap();
        assert!(empty[0].is_error());
    }

    #[tokio::test]
    async fn test_recommend_and_fallback() {
        let provider = ScriptedProvider::sequence(vec![
            Ok("Title: Automate savings\nDescription: Move 10% on payday.".into()),
            Err(provider_error()),
        ])
        .into_arc();
        let svc = service(provider);

        let recs = svc.recommend(&UserData::default()).await.unwrap();
        assert_eq!(recs[0].title, "Automate savings");

        let fallback = svc.recommend(&UserData::default()).await.unwrap();
        assert_eq!(fallback.len(), 1);
        assert_eq!(fallback[0].confidence, 0.0);
    }

    #[tokio::test]
    async fn test_optimize_budget() {
        let provider = ScriptedProvider::sequence(vec![
            Ok("Reduce food spending by $100.".into()),
            Err(provider_error()),
        ])
        .into_arc();
        let svc = service(provider.clone());
        let budget = BudgetData::default().with_category("food", BudgetCategory::new(dec!(400), dec!(500)));

        let suggestions = svc.optimize_budget(&budget).await.unwrap();
        assert_eq!(suggestions[0].title, "Budget Optimization");
        let prompt = provider.requests()[0].last_user_message().unwrap_or_default().to_string();
        assert!(prompt.contains("- Food: 125.0% (Over)"));

        let failed = svc.optimize_budget(&budget).await.unwrap();
        assert!(failed[0].is_error());
    }
}
