//! Budget optimization DTOs

use std::borrow::Cow;
use std::collections::BTreeMap;

use finsight_types::{BudgetCategory, BudgetData, Decimal};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use super::analysis::InsightDto;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetCategoryInput {
    #[serde(default)]
    #[schema(value_type = f64, example = 400.0)]
    pub allocated: Decimal,
    #[serde(default)]
    #[schema(value_type = f64, example = 425.5)]
    pub spent: Decimal,
}

fn non_negative_amounts(categories: &BTreeMap<String, BudgetCategoryInput>) -> Result<(), ValidationError> {
    match categories
        .iter()
        .find(|(_, c)| c.allocated.is_sign_negative() || c.spent.is_sign_negative())
    {
        Some((name, _)) => {
            let mut error = ValidationError::new("non_negative");
            error.message = Some(Cow::Owned(format!("{name}: amounts must not be negative")));
            Err(error)
        }
        None => Ok(()),
    }
}

/// Body of `POST /budget/optimize`
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BudgetOptimizeRequest {
    #[serde(default)]
    pub user_id: Option<String>,
    /// Category name to allocation and spend
    #[validate(custom(function = "non_negative_amounts"))]
    pub categories: BTreeMap<String, BudgetCategoryInput>,
}

impl BudgetOptimizeRequest {
    pub fn budget_data(&self) -> BudgetData {
        self.categories
            .iter()
            .fold(BudgetData::default(), |budget, (name, c)| {
                budget.with_category(name.clone(), BudgetCategory::new(c.allocated, c.spent))
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BudgetOptimizeResponse {
    pub suggestions: Vec<InsightDto>,
}
