//! Financial Analyzer
//!
//! Builds on [`LlmService`] for the analysis flows: narrative insights plus
//! recommendations for one user, a deterministic health score, and a per-user
//! insight cache.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate};
use finsight_prompts::{top_categories, total_expenses, total_income};
use finsight_types::{Decimal, Insight, Transaction, UserData, UserProfile};
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::service::LlmService;
use crate::store::InsightStore;

pub const DEFAULT_TIME_PERIOD: &str = "last_30_days";

/// Score reported when there is nothing to judge
pub const NEUTRAL_HEALTH_SCORE: f64 = 50.0;

/// Window of transactions an analysis covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePeriod {
    /// Trailing window ending at the most recent transaction
    LastDays(u32),
    All,
}

impl TimePeriod {
    /// Accepts `last_<n>_days` and `all`; anything else covers everything
    pub fn parse(s: &str) -> Self {
        let s = s.trim().to_ascii_lowercase();
        s.strip_prefix("last_")
            .and_then(|rest| rest.strip_suffix("_days"))
            .and_then(|n| n.parse::<u32>().ok())
            .filter(|n| *n > 0)
            .map(Self::LastDays)
            .unwrap_or(Self::All)
    }

    pub fn select<'a>(&self, transactions: &'a [Transaction]) -> Vec<&'a Transaction> {
        match self {
            Self::All => transactions.iter().collect(),
            Self::LastDays(days) => {
                let Some(latest) = transactions.iter().map(|t| t.date).max() else {
                    return Vec::new();
                };
                // A window reaching past the calendar's start covers everything
                match latest.checked_sub_days(Days::new(u64::from(*days) - 1)) {
                    Some(start) => transactions.iter().filter(|t| t.date >= start).collect(),
                    None => transactions.iter().collect(),
                }
            }
        }
    }
}

/// Result of a spending analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub insights: Vec<Insight>,
    pub recommendations: Vec<String>,
    pub financial_health_score: f64,
}

/// Health score in `[0, 100]` from income and expense totals.
///
/// Breaking even scores 50; saving everything scores 100; spending twice the
/// income or more scores 0.
pub fn health_score(transactions: &[Transaction]) -> f64 {
    if transactions.is_empty() {
        return NEUTRAL_HEALTH_SCORE;
    }
    let income = total_income(transactions);
    let expenses = total_expenses(transactions);

    if income <= Decimal::ZERO {
        return if expenses > Decimal::ZERO { 0.0 } else { NEUTRAL_HEALTH_SCORE };
    }

    let margin = savings_margin(income, expenses).clamp(-1.0, 1.0);
    let score = (50.0 + 50.0 * margin).clamp(0.0, 100.0);
    (score * 10.0).round() / 10.0
}

/// `(income - expenses) / income` for positive income, saturating at ±1 on overflow
fn savings_margin(income: Decimal, expenses: Decimal) -> f64 {
    let net = income.saturating_sub(expenses);
    match net.checked_div(income) {
        Some(margin) => margin.to_f64().unwrap_or(0.0),
        None if net.is_sign_negative() => -1.0,
        None => 1.0,
    }
}

fn distinct_months(transactions: &[Transaction]) -> usize {
    transactions
        .iter()
        .map(|t| (t.date.year(), t.date.month()))
        .collect::<BTreeSet<_>>()
        .len()
}

/// Aggregate figures for the recommendation prompt, derived from raw transactions
pub fn user_data_from_transactions(transactions: &[Transaction]) -> UserData {
    let income = total_income(transactions);
    let expenses = total_expenses(transactions);
    let months = Decimal::from(distinct_months(transactions).max(1));

    let savings_rate = if income > Decimal::ZERO {
        savings_margin(income, expenses)
    } else {
        0.0
    };

    UserData {
        total_balance: income.saturating_sub(expenses),
        monthly_income: (income / months).round_dp(2),
        monthly_expenses: (expenses / months).round_dp(2),
        savings_rate,
        top_categories: top_categories(transactions, 3)
            .into_iter()
            .map(|(name, _)| name)
            .collect(),
        goals: Vec::new(),
    }
}

fn earliest(transactions: &[Transaction]) -> Option<NaiveDate> {
    transactions.iter().map(|t| t.date).min()
}

pub struct FinancialAnalyzer {
    service: Arc<LlmService>,
    store: Arc<dyn InsightStore>,
}

impl FinancialAnalyzer {
    pub fn new(service: Arc<LlmService>, store: Arc<dyn InsightStore>) -> Self {
        Self { service, store }
    }

    pub fn service(&self) -> &Arc<LlmService> {
        &self.service
    }

    /// Insights, recommendations and a health score for one user.
    ///
    /// Successful insights replace the user's cache entry; error insights are
    /// never cached.
    pub async fn analyze_spending_patterns(
        &self,
        user_id: &str,
        transactions: &[Transaction],
        time_period: &str,
    ) -> Result<AnalysisReport> {
        let period = TimePeriod::parse(time_period);
        let selected: Vec<Transaction> = period.select(transactions).into_iter().cloned().collect();
        tracing::info!(
            user_id,
            time_period,
            total = transactions.len(),
            selected = selected.len(),
            since = ?earliest(&selected),
            "Analyzing spending patterns"
        );

        let data = user_data_from_transactions(&selected);
        let profile = UserProfile::default().with_monthly_income(data.monthly_income);

        let insights = self.service.analyze(&selected, &profile).await?;
        let recommendations = self
            .service
            .recommend(&data)
            .await?
            .iter()
            .map(|r| r.summary())
            .collect();

        let cacheable: Vec<Insight> = insights.iter().filter(|i| !i.is_error()).cloned().collect();
        if !cacheable.is_empty() {
            if let Err(e) = self.store.put(user_id, cacheable).await {
                tracing::warn!(user_id, error = %e, "Failed to cache insights");
            }
        }

        Ok(AnalysisReport {
            insights,
            recommendations,
            financial_health_score: health_score(&selected),
        })
    }

    /// Recommendation summaries (`"Title: description"`) for one user
    pub async fn generate_recommendations(
        &self,
        user_id: &str,
        transactions: &[Transaction],
    ) -> Result<Vec<String>> {
        tracing::info!(user_id, count = transactions.len(), "Generating recommendations");
        let data = user_data_from_transactions(transactions);
        let recommendations = self.service.recommend(&data).await?;
        Ok(recommendations.iter().map(|r| r.summary()).collect())
    }

    /// Cached insights for a user; empty when nothing is cached
    pub async fn get_cached_insights(&self, user_id: &str) -> Result<Vec<Insight>> {
        let cached = self.store.get(user_id).await?;
        tracing::debug!(user_id, hit = cached.is_some(), "Insight cache lookup");
        Ok(cached.unwrap_or_default())
    }
}
