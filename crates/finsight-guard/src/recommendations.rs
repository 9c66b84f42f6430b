//! Recommendation replies
//!
//! The prompt asks for `Title:` / `Description:` / `Impact:` / `Timeline:`
//! blocks. Each `Title:` line opens a new record; unlabelled lines continue
//! the current description. Replies with no labelled titles are read one
//! recommendation per paragraph instead, at lower confidence.

use finsight_types::{Recommendation, INSIGHT_CONFIDENCE};

use crate::fields::{key_value, normalize_newlines};
use crate::insights::sections_to_insights;
use crate::json::{extract_json_array, string_field};

/// Confidence for recommendations read from unlabelled paragraphs
pub const UNSTRUCTURED_CONFIDENCE: f64 = 0.6;

pub const DEFAULT_RECOMMENDATION_TITLE: &str = "Recommendation";

#[derive(Default)]
struct Draft {
    title: Option<String>,
    description: Vec<String>,
    impact: Option<String>,
    timeline: Option<String>,
}

impl Draft {
    fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_empty()
    }

    fn finish(self) -> Option<Recommendation> {
        if self.is_empty() {
            return None;
        }
        let mut rec = Recommendation::new(
            self.title
                .unwrap_or_else(|| DEFAULT_RECOMMENDATION_TITLE.to_string()),
            self.description.join(" "),
            INSIGHT_CONFIDENCE,
        );
        rec.impact = self.impact;
        rec.timeline = self.timeline;
        Some(rec)
    }
}

fn from_labelled_blocks(raw: &str) -> Vec<Recommendation> {
    let normalized = normalize_newlines(raw);
    let mut out = Vec::new();
    let mut current: Option<Draft> = None;

    for line in normalized.lines() {
        if line.trim().is_empty() {
            continue;
        }
        if let Some(title) = key_value(line, "title") {
            if let Some(rec) = current.take().and_then(Draft::finish) {
                out.push(rec);
            }
            current = Some(Draft {
                title: Some(title.to_string()),
                ..Draft::default()
            });
            continue;
        }

        // Text before the first title is preamble
        let Some(draft) = current.as_mut() else {
            continue;
        };

        if let Some(v) = key_value(line, "description") {
            draft.description.push(v.to_string());
        } else if let Some(v) = key_value(line, "impact") {
            draft.impact = Some(v.to_string());
        } else if let Some(v) = key_value(line, "timeline") {
            draft.timeline = Some(v.to_string());
        } else if draft.impact.is_none() && draft.timeline.is_none() {
            draft.description.push(line.trim().to_string());
        }
    }

    if let Some(rec) = current.and_then(Draft::finish) {
        out.push(rec);
    }
    out
}

fn from_json(raw: &str) -> Option<Vec<Recommendation>> {
    let items = extract_json_array(raw).ok()?;
    let recs: Vec<Recommendation> = items
        .iter()
        .filter_map(|item| {
            let title = string_field(item, "title");
            let description = string_field(item, "description");
            if title.is_none() && description.is_none() {
                return None;
            }
            let mut rec = Recommendation::new(
                title.unwrap_or(DEFAULT_RECOMMENDATION_TITLE),
                description.unwrap_or_default(),
                INSIGHT_CONFIDENCE,
            );
            rec.impact = string_field(item, "impact").map(str::to_string);
            rec.timeline = string_field(item, "timeline").map(str::to_string);
            Some(rec)
        })
        .collect();
    (!recs.is_empty()).then_some(recs)
}

/// Interpret a recommendation reply. Never fails; empty input yields nothing.
pub fn parse_recommendations(raw: &str) -> Vec<Recommendation> {
    if let Some(recs) = from_json(raw) {
        return recs;
    }

    let labelled = from_labelled_blocks(raw);
    if !labelled.is_empty() {
        return labelled;
    }

    sections_to_insights(raw, DEFAULT_RECOMMENDATION_TITLE, UNSTRUCTURED_CONFIDENCE)
        .into_iter()
        .map(|insight| Recommendation::new(insight.title, insight.description, insight.confidence))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labelled_blocks() {
        let raw = "Here are my recommendations:

1. Title: Build an emergency fund
   Description: Set aside $200 per month
   until you have three months of expenses.
   Impact: Protects against job loss
   Timeline: Start this month

2. **Title:** Cut dining out
   **Description:** Limit restaurants to once a week.
   **Impact:** Saves about $150/month";

        let recs = parse_recommendations(raw);
        assert_eq!(recs.len(), 2);

        assert_eq!(recs[0].title, "Build an emergency fund");
        assert_eq!(
            recs[0].description,
            "Set aside $200 per month until you have three months of expenses."
        );
        assert_eq!(recs[0].impact.as_deref(), Some("Protects against job loss"));
        assert_eq!(recs[0].timeline.as_deref(), Some("Start this month"));
        assert_eq!(recs[0].confidence, 0.8);

        assert_eq!(recs[1].title, "Cut dining out");
        assert_eq!(recs[1].impact.as_deref(), Some("Saves about $150/month"));
        assert_eq!(recs[1].timeline, None);
    }

    #[test]
    fn test_paragraph_fallback() {
        let raw = "Pay down the credit card first.\n\n**Automate savings**\nMove 10% on payday.";
        let recs = parse_recommendations(raw);
        assert_eq!(recs.len(), 2);
        assert_eq!(recs[0].title, "Recommendation");
        assert_eq!(recs[0].description, "Pay down the credit card first.");
        assert_eq!(recs[1].title, "Automate savings");
        assert_eq!(recs[0].confidence, UNSTRUCTURED_CONFIDENCE);
    }

    #[test]
    fn test_json_reply() {
        let raw = r#"{"recommendations": [{"title": "Refinance", "description": "Lower your rate.", "timeline": "Q3"}]}"#;
        let recs = parse_recommendations(raw);
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].timeline.as_deref(), Some("Q3"));
    }

    #[test]
    fn test_empty_reply() {
        assert!(parse_recommendations("").is_empty());
    }
}
