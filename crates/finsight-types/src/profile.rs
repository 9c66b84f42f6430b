//! User profile, goals and the aggregate view used for recommendations

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::TypesError;

/// How much risk the user is willing to take
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTolerance {
    Low,
    #[default]
    Medium,
    High,
}

impl RiskTolerance {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl FromStr for RiskTolerance {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(TypesError::UnknownRiskTolerance(other.to_string())),
        }
    }
}

impl fmt::Display for RiskTolerance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn untitled() -> String {
    "Untitled".to_string()
}

/// A savings or spending target. Progress may exceed the target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinancialGoal {
    #[serde(default = "untitled")]
    pub title: String,
    #[serde(default)]
    pub current_amount: Decimal,
    #[serde(default)]
    pub target_amount: Decimal,
}

impl FinancialGoal {
    pub fn new(title: impl Into<String>, current_amount: Decimal, target_amount: Decimal) -> Self {
        Self {
            title: title.into(),
            current_amount,
            target_amount,
        }
    }

    pub fn is_reached(&self) -> bool {
        self.current_amount >= self.target_amount
    }
}

/// Goals as supplied by callers: free text, a list of names, or structured goals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProfileGoals {
    Text(String),
    Names(Vec<String>),
    Goals(Vec<FinancialGoal>),
}

impl ProfileGoals {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::Names(names) => names.is_empty(),
            Self::Goals(goals) => goals.is_empty(),
        }
    }
}

impl fmt::Display for ProfileGoals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text.trim()),
            Self::Names(names) => f.write_str(&names.join(", ")),
            Self::Goals(goals) => {
                let titles: Vec<&str> = goals.iter().map(|g| g.title.as_str()).collect();
                f.write_str(&titles.join(", "))
            }
        }
    }
}

/// The user's financial context. Every field has a default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default)]
    pub monthly_income: Decimal,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<ProfileGoals>,
    #[serde(default)]
    pub risk_tolerance: RiskTolerance,
}

impl UserProfile {
    pub fn with_monthly_income(mut self, monthly_income: Decimal) -> Self {
        self.monthly_income = monthly_income.max(Decimal::ZERO);
        self
    }

    pub fn with_goals(mut self, goals: ProfileGoals) -> Self {
        self.goals = Some(goals);
        self
    }

    pub fn with_risk_tolerance(mut self, risk_tolerance: RiskTolerance) -> Self {
        self.risk_tolerance = risk_tolerance;
        self
    }
}

/// Aggregate figures behind a recommendation request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub total_balance: Decimal,
    #[serde(default)]
    pub monthly_income: Decimal,
    #[serde(default)]
    pub monthly_expenses: Decimal,
    /// Fraction of income saved, e.g. `0.125` for 12.5%
    #[serde(default)]
    pub savings_rate: f64,
    #[serde(default)]
    pub top_categories: Vec<String>,
    #[serde(default)]
    pub goals: Vec<FinancialGoal>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_profile_defaults() {
        let profile: UserProfile = serde_json::from_str("{}").unwrap();
        assert_eq!(profile.monthly_income, Decimal::ZERO);
        assert!(profile.goals.is_none());
        assert_eq!(profile.risk_tolerance, RiskTolerance::Medium);
    }

    #[test]
    fn test_goals_accept_text_or_list() {
        let profile: UserProfile =
            serde_json::from_str(r#"{"goals": "Buy a house", "risk_tolerance": "high"}"#).unwrap();
        assert_eq!(profile.goals.unwrap().to_string(), "Buy a house");
        assert_eq!(profile.risk_tolerance, RiskTolerance::High);

        let profile: UserProfile =
            serde_json::from_str(r#"{"goals": ["Emergency fund", "Vacation"]}"#).unwrap();
        assert_eq!(profile.goals.unwrap().to_string(), "Emergency fund, Vacation");

        let profile: UserProfile = serde_json::from_str(
            r#"{"goals": [{"title": "Car", "current_amount": "100", "target_amount": "5000"}]}"#,
        )
        .unwrap();
        assert_eq!(profile.goals.unwrap().to_string(), "Car");
    }

    #[test]
    fn test_goal_may_exceed_target() {
        let goal = FinancialGoal::new("Emergency fund", dec!(1200), dec!(1000));
        assert!(goal.is_reached());

        let goal: FinancialGoal = serde_json::from_str("{}").unwrap();
        assert_eq!(goal.title, "Untitled");
        assert!(goal.is_reached());
    }

    #[test]
    fn test_negative_income_is_floored() {
        let profile = UserProfile::default().with_monthly_income(dec!(-10));
        assert_eq!(profile.monthly_income, Decimal::ZERO);
    }

    #[test]
    fn test_risk_tolerance_parsing() {
        assert_eq!("LOW".parse::<RiskTolerance>().unwrap(), RiskTolerance::Low);
        assert!("reckless".parse::<RiskTolerance>().is_err());
        assert_eq!(RiskTolerance::default().to_string(), "Medium");
    }
}
