//! Locating JSON inside model output

use serde_json::{Map, Value};

use crate::{GuardError, Result};

/// Cut the JSON payload out of a reply that may wrap it in prose or code fences
fn clean_json_output(raw: &str, open: char, close: char) -> Option<&str> {
    let start = raw.find(open)?;
    let end = raw.rfind(close)?;
    (end > start).then(|| &raw[start..=end])
}

/// Find and parse the first JSON object in `raw`
pub fn extract_json_object(raw: &str) -> Result<Map<String, Value>> {
    let candidate = clean_json_output(raw, '{', '}').ok_or(GuardError::NoJson)?;
    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(GuardError::InvalidJson {
            message: "expected an object".to_string(),
        }),
        Err(e) => Err(GuardError::InvalidJson {
            message: e.to_string(),
        }),
    }
}

/// Find and parse the first JSON array of objects in `raw`; a wrapping
/// object with a single array field is unwrapped
pub fn extract_json_array(raw: &str) -> Result<Vec<Map<String, Value>>> {
    let items = match clean_json_output(raw, '[', ']')
        .and_then(|candidate| serde_json::from_str::<Value>(candidate).ok())
    {
        Some(Value::Array(items)) => items,
        _ => {
            let object = extract_json_object(raw)?;
            object
                .into_iter()
                .find_map(|(_, v)| match v {
                    Value::Array(items) => Some(items),
                    _ => None,
                })
                .ok_or_else(|| GuardError::MissingField {
                    field: "array".to_string(),
                })?
        }
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(map) => Some(map),
            _ => None,
        })
        .collect())
}

/// A trimmed, non-empty string field
pub(crate) fn string_field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}
