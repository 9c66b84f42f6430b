//! Line-level helpers shared by the free-text parsers

/// Strip list bullets, enumerations and leading emphasis from a line
pub(crate) fn strip_marker(line: &str) -> &str {
    let mut rest = line.trim_start();

    // "1. " / "2) "
    let digits = rest.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let after = &rest[digits..];
        if let Some(stripped) = after.strip_prefix(". ").or_else(|| after.strip_prefix(") ")) {
            rest = stripped;
        }
    }

    rest.trim_start_matches(|c: char| matches!(c, '-' | '*' | '•' | '#' | '>') || c.is_whitespace())
}

/// Value of `key: value` when the line starts with `key` (case-insensitive).
///
/// The value is everything after the first colon, trimmed of whitespace and
/// stray emphasis. Empty values count as absent.
pub(crate) fn key_value<'a>(line: &'a str, key: &str) -> Option<&'a str> {
    let body = strip_marker(line);
    let head = body.get(..key.len())?;
    if !head.eq_ignore_ascii_case(key) {
        return None;
    }

    let after_key = body[key.len()..].trim_start_matches('*').trim_start();
    let value = after_key.strip_prefix(':')?;
    let value = value
        .trim()
        .trim_start_matches('*')
        .trim_end_matches('*')
        .trim();

    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Normalize line endings so blank-line detection sees `\r\n` input the same way
pub(crate) fn normalize_newlines(raw: &str) -> String {
    raw.replace("\r\n", "\n").replace('\r', "\n")
}

/// Split text into trimmed, non-empty blocks separated by whitespace-only lines
pub fn split_sections(raw: &str) -> Vec<String> {
    let normalized = normalize_newlines(raw);
    let mut sections = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in normalized.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                sections.push(current.join("\n").trim().to_string());
                current.clear();
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        sections.push(current.join("\n").trim().to_string());
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_marker() {
        assert_eq!(strip_marker("- Category: food"), "Category: food");
        assert_eq!(strip_marker("  * **Title**"), "Title**");
        assert_eq!(strip_marker("2. Title: x"), "Title: x");
        assert_eq!(strip_marker("## Heading"), "Heading");
        assert_eq!(strip_marker("2024 budget"), "2024 budget");
    }

    #[test]
    fn test_key_value_matching() {
        assert_eq!(key_value("Category: food", "category"), Some("food"));
        assert_eq!(key_value("CATEGORY:food", "category"), Some("food"));
        assert_eq!(key_value("**Category:** food", "category"), Some("food"));
        assert_eq!(key_value("- Confidence : 0.9", "confidence"), Some("0.9"));
        assert_eq!(key_value("Reasoning: a: b", "reasoning"), Some("a: b"));
        assert_eq!(key_value("Category:", "category"), None);
        assert_eq!(key_value("The category: food", "category"), None);
        assert_eq!(key_value("Categorywise: x", "category"), None);
    }

    #[test]
    fn test_split_sections() {
        let raw = "First para\nstill first\n\n\n  \nSecond\r\n\r\nThird  ";
        assert_eq!(split_sections(raw), vec!["First para\nstill first", "Second", "Third"]);
        assert!(split_sections("").is_empty());
        assert!(split_sections(" \n\t\n").is_empty());
    }
}
