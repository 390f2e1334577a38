//! Locate a JSON object inside free-form model output.
//!
//! Models wrap JSON in markdown fences or chatty prose despite instructions.
//! This only finds the object; interpreting its fields is the caller's job.

/// Return the first balanced `{...}` substring of `text` that parses as JSON.
///
/// Braces inside JSON string literals (including escaped quotes) are not
/// counted. Candidates that are balanced but not valid JSON are skipped and
/// the search resumes at the next `{`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let bytes = text.as_bytes();
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = matching_brace(bytes, start) {
            let candidate = &text[start..=end];
            if serde_json::from_str::<serde_json::Value>(candidate).is_ok() {
                return Some(candidate);
            }
        }
        search_from = start + 1;
    }

    None
}

/// Index of the `}` closing the `{` at `start`, if any.
fn matching_brace(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, &b) in bytes.iter().enumerate().skip(start) {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }

        match b {
            b'"' => in_string = true,
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        assert_eq!(extract_json_object(r#"{"a": 1}"#), Some(r#"{"a": 1}"#));
    }

    #[test]
    fn test_markdown_fence() {
        let text = "```json\n{\"classifications\": []}\n```";
        assert_eq!(extract_json_object(text), Some("{\"classifications\": []}"));
    }

    #[test]
    fn test_surrounding_prose() {
        let text = "Sure! Here you go: {\"a\": {\"b\": [1, 2]}} Let me know if...";
        assert_eq!(extract_json_object(text), Some("{\"a\": {\"b\": [1, 2]}}"));
    }

    #[test]
    fn test_braces_inside_strings() {
        let text = r#"{"name": "odd } name", "quote": "say \"{hi\""}"#;
        assert_eq!(extract_json_object(text), Some(text));
    }

    #[test]
    fn test_skips_invalid_candidate() {
        let text = "{not json} then {\"ok\": true}";
        assert_eq!(extract_json_object(text), Some("{\"ok\": true}"));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(extract_json_object("I could not classify these."), None);
        assert_eq!(extract_json_object("{\"unterminated\": 1"), None);
        assert_eq!(extract_json_object(""), None);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Voilà ½ → {\"name\": \"crème brûlée\"}";
        assert_eq!(extract_json_object(text), Some("{\"name\": \"crème brûlée\"}"));
    }
}
