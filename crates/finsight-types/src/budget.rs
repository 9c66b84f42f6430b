//! Budget allocations versus actual spending

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Spending below this share of the allocation counts as under budget
const UNDER_THRESHOLD: Decimal = Decimal::from_parts(80, 0, 0, false, 0);
const OVER_THRESHOLD: Decimal = Decimal::ONE_HUNDRED;

/// Where a category stands relative to its allocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    Under,
    OnTrack,
    Over,
}

impl BudgetStatus {
    /// Classify a utilization percentage: above 100 is over, below 80 is under
    pub fn from_percent(percent: Decimal) -> Self {
        if percent > OVER_THRESHOLD {
            Self::Over
        } else if percent < UNDER_THRESHOLD {
            Self::Under
        } else {
            Self::OnTrack
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Under => "Under",
            Self::OnTrack => "On Track",
            Self::Over => "Over",
        }
    }
}

impl fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Allocation and actual spend for one category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetCategory {
    #[serde(default)]
    pub allocated: Decimal,
    #[serde(default)]
    pub spent: Decimal,
}

impl BudgetCategory {
    pub fn new(allocated: Decimal, spent: Decimal) -> Self {
        Self { allocated, spent }
    }

    /// `spent / allocated * 100`, defined only when something was allocated.
    ///
    /// Saturates at `Decimal::MAX` (or `MIN` for negative spend) when the
    /// ratio does not fit.
    pub fn utilization_percent(&self) -> Option<Decimal> {
        if self.allocated <= Decimal::ZERO {
            return None;
        }
        let percent = self
            .spent
            .checked_div(self.allocated)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));
        Some(percent.unwrap_or(if self.spent.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }))
    }

    pub fn status(&self) -> Option<BudgetStatus> {
        self.utilization_percent().map(BudgetStatus::from_percent)
    }

    pub fn remaining(&self) -> Decimal {
        self.allocated.saturating_sub(self.spent)
    }
}

/// A budget keyed by category name, iterated in name order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BudgetData {
    #[serde(default)]
    pub categories: BTreeMap<String, BudgetCategory>,
}

impl BudgetData {
    pub fn with_category(mut self, name: impl Into<String>, category: BudgetCategory) -> Self {
        self.categories.insert(name.into(), category);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn total_allocated(&self) -> Decimal {
        self.categories
            .values()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.allocated))
    }

    pub fn total_spent(&self) -> Decimal {
        self.categories
            .values()
            .fold(Decimal::ZERO, |acc, c| acc.saturating_add(c.spent))
    }

    pub fn over_budget(&self) -> impl Iterator<Item = (&str, &BudgetCategory)> {
        self.categories
            .iter()
            .filter(|(_, c)| c.status() == Some(BudgetStatus::Over))
            .map(|(name, c)| (name.as_str(), c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_status_thresholds() {
        assert_eq!(BudgetCategory::new(dec!(100), dec!(79.99)).status(), Some(BudgetStatus::Under));
        assert_eq!(BudgetCategory::new(dec!(100), dec!(80)).status(), Some(BudgetStatus::OnTrack));
        assert_eq!(BudgetCategory::new(dec!(100), dec!(100)).status(), Some(BudgetStatus::OnTrack));
        assert_eq!(BudgetCategory::new(dec!(100), dec!(100.01)).status(), Some(BudgetStatus::Over));
    }

    #[test]
    fn test_zero_allocation_has_no_percentage() {
        let category = BudgetCategory::new(Decimal::ZERO, dec!(50));
        assert_eq!(category.utilization_percent(), None);
        assert_eq!(category.status(), None);
    }

    #[test]
    fn test_budget_totals_and_over_budget() {
        let budget = BudgetData::default()
            .with_category("food", BudgetCategory::new(dec!(400), dec!(520)))
            .with_category("transport", BudgetCategory::new(dec!(150), dec!(60)));

        assert_eq!(budget.total_allocated(), dec!(550));
        assert_eq!(budget.total_spent(), dec!(580));

        let over: Vec<&str> = budget.over_budget().map(|(name, _)| name).collect();
        assert_eq!(over, vec!["food"]);
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let category = BudgetCategory::new(dec!(0.01), Decimal::MAX);
        assert_eq!(category.utilization_percent(), Some(Decimal::MAX));
        assert_eq!(category.status(), Some(BudgetStatus::Over));

        let refund = BudgetCategory::new(dec!(0.01), Decimal::MIN);
        assert_eq!(refund.utilization_percent(), Some(Decimal::MIN));
        assert_eq!(refund.remaining(), Decimal::MAX);

        let budget = BudgetData::default()
            .with_category("a", BudgetCategory::new(Decimal::MAX, Decimal::MAX))
            .with_category("b", BudgetCategory::new(Decimal::MAX, dec!(1)));
        assert_eq!(budget.total_allocated(), Decimal::MAX);
        assert_eq!(budget.total_spent(), Decimal::MAX);
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(BudgetStatus::OnTrack.to_string(), "On Track");
        assert_eq!(BudgetStatus::Over.to_string(), "Over");
    }
}
