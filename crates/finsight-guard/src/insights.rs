//! Narrative analysis replies
//!
//! The reply is split on blank lines and every non-empty section becomes one
//! insight. Blank-line segmentation is a heuristic: a model that separates
//! paragraphs differently yields a different number of insights.

use finsight_types::{Insight, DEFAULT_INSIGHT_TITLE, INSIGHT_CONFIDENCE};

use crate::fields::{split_sections, strip_marker};
use crate::json::{extract_json_array, string_field};

/// Title and body of a section whose first line is a heading or bold label
pub(crate) struct Titled {
    pub title: String,
    pub body: String,
}

/// Read a markdown heading (`## Title`) or bold label (`**Title:** rest`) off
/// the first line of a section
pub(crate) fn split_title(section: &str) -> Option<Titled> {
    let mut lines = section.lines();
    let first = lines.next()?.trim();
    let rest: Vec<&str> = lines.collect();

    let (title, inline) = if first.starts_with('#') {
        (first.trim_start_matches('#').trim().trim_matches('*').trim(), "")
    } else {
        let unmarked = strip_marker_keep_bold(first);
        let inner = unmarked.strip_prefix("**")?;
        let close = inner.find("**")?;
        let label = inner[..close].trim().trim_end_matches(':').trim();
        let after = inner[close + 2..].trim_start_matches(':').trim();
        (label, after)
    };

    if title.is_empty() {
        return None;
    }

    let mut body = inline.to_string();
    let rest = rest.join("\n");
    let rest = rest.trim();
    if !rest.is_empty() {
        if !body.is_empty() {
            body.push('\n');
        }
        body.push_str(rest);
    }

    Some(Titled {
        title: title.trim_end_matches(':').trim().to_string(),
        body,
    })
}

/// Like [`strip_marker`] but leaves a leading `**` in place
fn strip_marker_keep_bold(line: &str) -> &str {
    let stripped = strip_marker(line);
    let consumed = line.len() - stripped.len();
    let prefix = &line[..consumed];
    // Give back asterisks that belonged to a bold marker
    let stars = prefix.chars().rev().take_while(|c| *c == '*').count();
    &line[consumed - stars..]
}

/// Turn sections into insights, exactly one per non-empty section.
///
/// A section holding only a heading keeps the heading text as its description
/// under the default title.
pub(crate) fn sections_to_insights(raw: &str, default_title: &str, confidence: f64) -> Vec<Insight> {
    split_sections(raw)
        .into_iter()
        .map(|section| match split_title(&section) {
            Some(Titled { title, body }) if body.is_empty() => {
                Insight::new(default_title, title, confidence)
            }
            Some(Titled { title, body }) => Insight::new(title, body, confidence),
            None => Insight::new(default_title, section, confidence),
        })
        .collect()
}

fn from_json(raw: &str, default_title: &str) -> Option<Vec<Insight>> {
    let items = extract_json_array(raw).ok()?;
    let insights: Vec<Insight> = items
        .iter()
        .filter_map(|item| {
            let description = string_field(item, "description")?;
            let title = string_field(item, "title").unwrap_or(default_title);
            Some(Insight::new(title, description, INSIGHT_CONFIDENCE))
        })
        .collect();
    (!insights.is_empty()).then_some(insights)
}

/// Interpret an analysis reply. Empty input yields no insights.
pub fn parse_insights(raw: &str) -> Vec<Insight> {
    parse_insights_titled(raw, DEFAULT_INSIGHT_TITLE)
}

/// As [`parse_insights`], with a caller-chosen title for untitled sections
pub fn parse_insights_titled(raw: &str, default_title: &str) -> Vec<Insight> {
    from_json(raw, default_title)
        .unwrap_or_else(|| sections_to_insights(raw, default_title, INSIGHT_CONFIDENCE))
}
