//! Free-form chat context supplied alongside a user question

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::str::FromStr;

/// Context keys and the source label each one contributes to a chat reply
const SOURCE_LABELS: [(&[&str], &str); 3] = [
    (&["transactions", "recent_transactions"], "Recent Transactions"),
    (&["budgets", "monthly_budget"], "Budget Data"),
    (&["goals", "financial_goals"], "Financial Goals"),
];

/// Read a money amount from a JSON number or numeric string
pub fn decimal_from_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .map(Decimal::from)
            .or_else(|| n.as_f64().and_then(Decimal::from_f64)),
        Value::String(s) => Decimal::from_str(s.trim()).ok(),
        _ => None,
    }
}

/// Key/value context for a chat question
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatContext(Map<String, Value>);

impl ChatContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of entries under `key` when it holds an array
    pub fn count(&self, key: &str) -> Option<usize> {
        self.0.get(key).and_then(Value::as_array).map(Vec::len)
    }

    pub fn decimal(&self, key: &str) -> Option<Decimal> {
        self.0.get(key).and_then(decimal_from_value)
    }

    /// Source labels for the keys present, in fixed order and without repeats
    pub fn sources(&self) -> Vec<String> {
        SOURCE_LABELS
            .iter()
            .filter(|(keys, _)| keys.iter().any(|k| self.contains(k)))
            .map(|(_, label)| label.to_string())
            .collect()
    }
}

impl From<Map<String, Value>> for ChatContext {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_sources_follow_keys_present() {
        let context = ChatContext::new()
            .with("goals", json!([]))
            .with("transactions", json!([{"amount": 1}]));
        assert_eq!(context.sources(), vec!["Recent Transactions", "Financial Goals"]);
    }

    #[test]
    fn test_sources_never_duplicate() {
        let context = ChatContext::new()
            .with("transactions", json!([]))
            .with("recent_transactions", json!([]))
            .with("budgets", json!({}))
            .with("monthly_budget", json!(1200));
        assert_eq!(context.sources(), vec!["Recent Transactions", "Budget Data"]);
    }

    #[test]
    fn test_empty_context_has_no_sources() {
        assert!(ChatContext::new().sources().is_empty());
        let context = ChatContext::new().with("unrelated", json!(true));
        assert!(context.sources().is_empty());
    }

    #[test]
    fn test_decimal_from_value() {
        assert_eq!(decimal_from_value(&json!(1200)), Some(dec!(1200)));
        assert_eq!(decimal_from_value(&json!("99.5")), Some(dec!(99.5)));
        assert_eq!(decimal_from_value(&json!(12.25)), Some(dec!(12.25)));
        assert_eq!(decimal_from_value(&json!("lots")), None);
        assert_eq!(decimal_from_value(&json!(null)), None);
    }

    #[test]
    fn test_deserializes_from_plain_object() {
        let context: ChatContext =
            serde_json::from_value(json!({"current_balance": "2500.00", "financial_goals": [1, 2]}))
                .unwrap();
        assert_eq!(context.decimal("current_balance"), Some(dec!(2500.00)));
        assert_eq!(context.count("financial_goals"), Some(2));
        assert_eq!(context.count("current_balance"), None);
    }
}
