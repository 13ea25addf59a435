//! Defensive handling of JSON embedded in free-text model output.

use serde_json::{Map, Value};

/// Finds the first brace-delimited object in `text`.
///
/// Starts at the first `{` and returns the span up to its balancing `}`, skipping braces
/// inside string literals, so nested objects stay intact. Returns `None` when there is no
/// `{` or it never closes.
pub fn first_object_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Every double-quoted string in `text`, in order. Used on model answers that are meant to
/// be JSON string arrays but are not trusted to be valid JSON.
pub fn quoted_strings(text: &str) -> Vec<String> {
    if let Ok(Value::Array(items)) = serde_json::from_str::<Value>(text.trim()) {
        return items
            .into_iter()
            .filter_map(|v| match v {
                Value::String(s) => Some(s),
                _ => None,
            })
            .collect();
    }

    text.split('"')
        .skip(1)
        .step_by(2)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Collapses an arbitrary JSON value into an optional display string.
///
/// Objects become `"key: value, key: value"` with empty values dropped, arrays are joined
/// with `", "`, blank strings and `null` become `None`.
pub fn value_to_text(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(value_to_text)
            .collect::<Vec<_>>()
            .join(", "),
        Value::Object(map) => flatten_object(map),
    };

    if text.is_empty() { None } else { Some(text) }
}

fn flatten_object(map: &Map<String, Value>) -> String {
    map.iter()
        .filter_map(|(key, value)| value_to_text(value).map(|v| format!("{}: {}", key, v)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Looks up the first key of `keys` present in `object`, comparing case-insensitively and
/// ignoring spaces, underscores and hyphens.
pub fn lookup<'a>(object: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter().find_map(|wanted| {
        let wanted = squash_key(wanted);
        object
            .iter()
            .find(|(key, _)| squash_key(key) == wanted)
            .map(|(_, value)| value)
    })
}

fn squash_key(key: &str) -> String {
    key.chars()
        .filter(|c| !matches!(c, ' ' | '_' | '-'))
        .flat_map(char::to_lowercase)
        .collect()
}
