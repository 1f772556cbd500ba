use serde_json::Value;
use thiserror::Error;

/// Why a completion text could not be turned into a JSON object.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("no JSON object found in text")]
    NoObject,
    #[error("JSON parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Finds the first balanced `{ ... }` span in free text.
///
/// Brace depth is only counted outside string literals, so braces inside
/// quoted values and prose after the object do not extend the span.
pub fn extract_json_span(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }

    None
}

/// Pulls the first JSON object out of free-form model output. Models often
/// wrap the object in prose even when told not to.
pub fn extract_json_object(text: &str) -> Result<Value, ExtractError> {
    let span = extract_json_span(text).ok_or(ExtractError::NoObject)?;
    Ok(serde_json::from_str(span)?)
}

pub fn mask_api_key(key: &str) -> String {
    // Counted in chars, not bytes, so multi-byte values cannot panic.
    let masked = key.chars().count().saturating_sub(5);
    if masked == 0 {
        return key.to_string();
    }
    let prefix: String = key.chars().take(5).collect();
    format!("{}{}", prefix, "*".repeat(masked))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn span_of_bare_object_is_unchanged() {
        let text = r#"{"name": "ok"}"#;
        assert_eq!(extract_json_span(text), Some(text));
    }

    #[test]
    fn span_ignores_prose_and_stray_braces() {
        let text = r#"Sure! Here you go: {"a": 1, "b": 2} Enjoy :-}"#;
        assert_eq!(extract_json_span(text), Some(r#"{"a": 1, "b": 2}"#));
    }

    #[test]
    fn span_handles_nested_objects() {
        let text = r#"prefix {"outer": {"inner": 2}} suffix"#;
        assert_eq!(extract_json_span(text), Some(r#"{"outer": {"inner": 2}}"#));
    }

    #[test]
    fn span_skips_braces_inside_strings() {
        let text = r#"{"smiley": ":-}", "quote": "\"{\""}"#;
        assert_eq!(extract_json_span(text), Some(text));
    }

    #[test]
    fn unterminated_object_yields_none() {
        assert_eq!(extract_json_span(r#"{"a": 1"#), None);
        assert_eq!(extract_json_span("no object here"), None);
    }

    #[test]
    fn object_is_parsed_from_surrounding_text() {
        let value = extract_json_object(r#"answer: {"appetizer": 12, "main": 22} done"#).unwrap();
        assert_eq!(value["appetizer"], 12);
        assert_eq!(value["main"], 22);
    }

    #[test]
    fn invalid_json_in_span_is_a_parse_error() {
        let result = extract_json_object(r#"{"a": undefined}"#);
        assert!(matches!(result, Err(ExtractError::Parse(_))));
    }

    #[test]
    fn missing_object_is_reported() {
        let result = extract_json_object("I cannot answer that.");
        assert!(matches!(result, Err(ExtractError::NoObject)));
    }

    #[test]
    fn mask_api_key_keeps_prefix_only() {
        assert_eq!(mask_api_key("sk-abcdef1234"), "sk-ab********");
        assert_eq!(mask_api_key("short"), "short");
    }

    #[test]
    fn mask_api_key_handles_multibyte_values() {
        assert_eq!(mask_api_key("ключ-абвгд"), "ключ-*****");
        assert_eq!(mask_api_key("日本語"), "日本語");
    }
}
