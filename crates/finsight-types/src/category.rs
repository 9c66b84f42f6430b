//! The closed transaction category set
//!
//! This enumeration is the single source of truth for categorization: the
//! prompt builder lists it verbatim and the interpreter validates against it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// A transaction category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    // Income
    Salary,
    Freelance,
    Investment,
    Business,
    OtherIncome,
    // Expenses
    Food,
    Transport,
    Housing,
    Utilities,
    Healthcare,
    Entertainment,
    Shopping,
    Education,
    Savings,
    OtherExpense,
}

impl Category {
    /// Every category, income first, in prompt order
    pub const ALL: [Category; 15] = [
        Self::Salary,
        Self::Freelance,
        Self::Investment,
        Self::Business,
        Self::OtherIncome,
        Self::Food,
        Self::Transport,
        Self::Housing,
        Self::Utilities,
        Self::Healthcare,
        Self::Entertainment,
        Self::Shopping,
        Self::Education,
        Self::Savings,
        Self::OtherExpense,
    ];

    /// Category assigned when nothing better is known
    pub const FALLBACK: Category = Self::OtherExpense;

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Salary => "salary",
            Self::Freelance => "freelance",
            Self::Investment => "investment",
            Self::Business => "business",
            Self::OtherIncome => "other_income",
            Self::Food => "food",
            Self::Transport => "transport",
            Self::Housing => "housing",
            Self::Utilities => "utilities",
            Self::Healthcare => "healthcare",
            Self::Entertainment => "entertainment",
            Self::Shopping => "shopping",
            Self::Education => "education",
            Self::Savings => "savings",
            Self::OtherExpense => "other_expense",
        }
    }

    pub fn is_income(&self) -> bool {
        matches!(
            self,
            Self::Salary | Self::Freelance | Self::Investment | Self::Business | Self::OtherIncome
        )
    }

    pub fn income() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| c.is_income())
    }

    pub fn expenses() -> impl Iterator<Item = Category> {
        Self::ALL.into_iter().filter(|c| !c.is_income())
    }

    /// Parse a model-produced label.
    ///
    /// Tolerates case, surrounding quotes/brackets/markdown emphasis, a
    /// trailing period, and spaces or hyphens in place of underscores.
    /// Anything that still does not name a member of the set is rejected.
    pub fn parse_label(label: &str) -> Result<Self, TypesError> {
        let cleaned: String = label
            .trim()
            .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '[' | ']' | '(' | ')' | '.'))
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == cleaned)
            .ok_or_else(|| TypesError::UnknownCategory(label.trim().to_string()))
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl FromStr for Category {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_label(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_set_has_fifteen_members() {
        assert_eq!(Category::ALL.len(), 15);
        assert_eq!(Category::income().count(), 5);
        assert_eq!(Category::expenses().count(), 10);
    }

    #[test]
    fn test_parse_label_is_lenient_about_formatting() {
        assert_eq!(Category::parse_label("food").unwrap(), Category::Food);
        assert_eq!(Category::parse_label(" Food ").unwrap(), Category::Food);
        assert_eq!(Category::parse_label("[food]").unwrap(), Category::Food);
        assert_eq!(Category::parse_label("\"other income\"").unwrap(), Category::OtherIncome);
        assert_eq!(Category::parse_label("Other-Expense.").unwrap(), Category::OtherExpense);
        assert_eq!(Category::parse_label("**healthcare**").unwrap(), Category::Healthcare);
    }

    #[test]
    fn test_parse_label_rejects_unknown() {
        assert_eq!(
            Category::parse_label("groceries"),
            Err(TypesError::UnknownCategory("groceries".to_string()))
        );
        assert!(Category::parse_label("").is_err());
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let json = serde_json::to_string(&Category::OtherExpense).unwrap();
        assert_eq!(json, "\"other_expense\"");
        let parsed: Category = serde_json::from_str("\"other_income\"").unwrap();
        assert_eq!(parsed, Category::OtherIncome);
    }

    #[test]
    fn test_as_str_round_trips_through_parse() {
        for category in Category::ALL {
            assert_eq!(Category::parse_label(category.as_str()).unwrap(), category);
        }
    }
}
