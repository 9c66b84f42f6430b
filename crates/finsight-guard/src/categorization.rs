//! Categorization replies
//!
//! A JSON object is tried first. Otherwise the reply is scanned line by line
//! for `category:`, `confidence:` and `reasoning:` prefixes, last occurrence
//! winning. Nothing here fails: absent or malformed fields take defaults.

use finsight_types::{clamp_confidence, Category, FALLBACK_CONFIDENCE};
use serde_json::Value;

use crate::fields::key_value;
use crate::json::{extract_json_object, string_field};

/// Confidence used when the reply carries no usable number
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

pub const DEFAULT_REASONING: &str = "Default categorization";

/// How a verdict was read from the reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseSource {
    Json,
    Lines,
}

/// The interpreted categorization, before it is tied to a transaction
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryVerdict {
    pub category: Category,
    pub confidence: f64,
    pub reasoning: String,
    pub source: ParseSource,
}

/// Parse a confidence such as `0.9`, `[0.9]` or `90%`.
/// Returns `None` for anything that is not a finite number.
pub fn parse_confidence(text: &str) -> Option<f64> {
    let cleaned = text
        .trim()
        .trim_matches(|c: char| matches!(c, '[' | ']' | '(' | ')' | '"' | '\'' | '*'))
        .trim();

    let (number, scale) = match cleaned.strip_suffix('%') {
        Some(n) => (n.trim(), 100.0),
        None => (cleaned, 1.0),
    };

    number
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .map(|v| v / scale)
}

fn confidence_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => parse_confidence(s),
        _ => None,
    }
}

/// Resolve a label against the closed set; unknown labels fall back with capped trust
fn resolve(label: Option<&str>, confidence: Option<f64>) -> (Category, f64) {
    let confidence = clamp_confidence(confidence.unwrap_or(DEFAULT_CONFIDENCE));
    match label {
        None => (Category::FALLBACK, confidence),
        Some(label) => match Category::parse_label(label) {
            Ok(category) => (category, confidence),
            Err(e) => {
                tracing::debug!(error = %e, "Model proposed a category outside the closed set");
                (Category::FALLBACK, confidence.min(FALLBACK_CONFIDENCE))
            }
        },
    }
}

fn from_json(raw: &str) -> Option<CategoryVerdict> {
    let map = extract_json_object(raw).ok()?;
    let label = string_field(&map, "category")?;
    let (category, confidence) = resolve(Some(label), map.get("confidence").and_then(confidence_from_value));

    Some(CategoryVerdict {
        category,
        confidence,
        reasoning: string_field(&map, "reasoning")
            .unwrap_or(DEFAULT_REASONING)
            .to_string(),
        source: ParseSource::Json,
    })
}

fn from_lines(raw: &str) -> CategoryVerdict {
    let mut label = None;
    let mut confidence_text = None;
    let mut reasoning = None;

    for line in raw.lines() {
        if let Some(v) = key_value(line, "category") {
            label = Some(v);
        } else if let Some(v) = key_value(line, "confidence") {
            confidence_text = Some(v);
        } else if let Some(v) = key_value(line, "reasoning") {
            reasoning = Some(v);
        }
    }

    // A malformed last occurrence degrades to the default, never to an earlier value
    let (category, confidence) = resolve(label, confidence_text.and_then(parse_confidence));

    CategoryVerdict {
        category,
        confidence,
        reasoning: reasoning.unwrap_or(DEFAULT_REASONING).to_string(),
        source: ParseSource::Lines,
    }
}

/// Interpret a categorization reply. Never fails.
pub fn parse_categorization(raw: &str) -> CategoryVerdict {
    from_json(raw).unwrap_or_else(|| from_lines(raw))
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn assert_bounded(verdict: &CategoryVerdict) {
        assert!((0.0..=1.0).contains(&verdict.confidence), "confidence {}", verdict.confidence);
        assert!(Category::ALL.contains(&verdict.category));
    }

    proptest! {
        #[test]
        fn arbitrary_text_stays_bounded(raw in any::<String>()) {
            assert_bounded(&parse_categorization(&raw));
        }

        #[test]
        fn prefixed_fields_stay_bounded(
            label in "[A-Za-z_ ]{0,20}",
            confidence in prop_oneof![
                any::<f64>().prop_map(|f| f.to_string()),
                "[-0-9.%eE\\[\\]]{0,12}",
            ],
            reasoning in "[^\\n]{0,40}",
        ) {
            let raw = format!("Category: {label}\nConfidence: {confidence}\nReasoning: {reasoning}");
            assert_bounded(&parse_categorization(&raw));
        }

        #[test]
        fn json_fields_stay_bounded(label in "[a-z_]{0,16}", confidence in any::<f64>()) {
            let raw = format!(r#"{{"category": "{label}", "confidence": {confidence}}}"#);
            assert_bounded(&parse_categorization(&raw));
        }
    }
}
