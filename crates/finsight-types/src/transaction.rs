//! Transaction types
//!
//! A transaction is one financial movement as reported by the caller. The
//! amount sign is taken as given and is not required to agree with the
//! transaction type.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::category::Category;
use crate::error::TypesError;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    /// Best guess when the caller did not say: negative amounts are money out
    pub fn infer_from_amount(amount: Decimal) -> Self {
        if amount.is_sign_negative() && !amount.is_zero() {
            Self::Expense
        } else {
            Self::Income
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl FromStr for TransactionType {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "income" | "credit" => Ok(Self::Income),
            "expense" | "debit" => Ok(Self::Expense),
            other => Err(TypesError::UnknownTransactionType(other.to_string())),
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single financial movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub description: String,
    /// Signed amount in the account currency
    pub amount: Decimal,
    pub date: NaiveDate,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    /// Only present once the transaction has been categorized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Transaction {
    /// Create an uncategorized transaction, inferring its type from the amount sign
    pub fn new(
        id: impl Into<String>,
        description: impl Into<String>,
        amount: Decimal,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
            amount,
            date,
            transaction_type: TransactionType::infer_from_amount(amount),
            category: None,
            account_id: None,
        }
    }

    pub fn with_type(mut self, transaction_type: TransactionType) -> Self {
        self.transaction_type = transaction_type;
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn is_expense(&self) -> bool {
        self.transaction_type == TransactionType::Expense
    }

    pub fn is_income(&self) -> bool {
        self.transaction_type == TransactionType::Income
    }

    /// Size of the movement regardless of sign convention
    pub fn magnitude(&self) -> Decimal {
        self.amount.abs()
    }
}
