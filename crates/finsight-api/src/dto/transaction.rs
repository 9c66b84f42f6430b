//! Transaction and categorization DTOs

use std::str::FromStr;

use chrono::NaiveDate;
use finsight_types::{CategorizationResult, Category, Decimal, Transaction, TransactionType};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::error::ApiResult;

/// A transaction as submitted by a client
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct TransactionInput {
    /// Client identifier; generated from the position when absent
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 500, message = "description must be 1-500 characters"))]
    pub description: String,
    /// Signed amount; negative values are expenses
    #[schema(value_type = f64, example = -42.5)]
    pub amount: Decimal,
    #[serde(deserialize_with = "super::common::deserialize_date")]
    #[schema(value_type = String, example = "2024-01-15")]
    pub date: NaiveDate,
    /// `income` or `expense`; inferred from the amount sign when absent
    #[serde(default, rename = "type")]
    pub transaction_type: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

impl TransactionInput {
    /// Convert into a domain transaction; `index` names transactions without an id
    pub fn into_transaction(self, index: usize) -> ApiResult<Transaction> {
        let id = self
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("txn-{index}"));

        let mut tx = Transaction::new(id, self.description, self.amount, self.date);
        if let Some(raw) = self.transaction_type.as_deref() {
            tx = tx.with_type(TransactionType::from_str(raw)?);
        }
        if let Some(raw) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            tx = tx.with_category(Category::from_str(raw)?);
        }
        if let Some(account_id) = self.account_id {
            tx = tx.with_account(account_id);
        }
        Ok(tx)
    }
}

/// Convert a batch, numbering id-less transactions by position
pub fn into_transactions(inputs: Vec<TransactionInput>) -> ApiResult<Vec<Transaction>> {
    inputs
        .into_iter()
        .enumerate()
        .map(|(index, input)| input.into_transaction(index))
        .collect()
}

/// Body of `POST /categorize`: `{transactions: [...]}` or a bare array
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum CategorizeRequest {
    Wrapped { transactions: Vec<TransactionInput> },
    List(Vec<TransactionInput>),
}

impl CategorizeRequest {
    pub fn transactions(&self) -> &[TransactionInput] {
        match self {
            Self::Wrapped { transactions } | Self::List(transactions) => transactions,
        }
    }

    pub fn into_inputs(self) -> Vec<TransactionInput> {
        match self {
            Self::Wrapped { transactions } | Self::List(transactions) => transactions,
        }
    }
}

impl Validate for CategorizeRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        for input in self.transactions() {
            input.validate()?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CategorizationResponse {
    pub transaction_id: String,
    #[schema(example = "food")]
    pub suggested_category: String,
    pub confidence: f64,
    pub reasoning: String,
}

impl From<CategorizationResult> for CategorizationResponse {
    fn from(result: CategorizationResult) -> Self {
        Self {
            transaction_id: result.transaction_id,
            suggested_category: result.suggested_category.as_str().to_string(),
            confidence: result.confidence,
            reasoning: result.reasoning,
        }
    }
}
