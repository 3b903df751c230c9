//! Coarse JSON document handling for the receive path.
//!
//! The transport may hand a JSON body over in several chunks; completeness
//! is decided by string-aware brace balancing (not a full parse). Only once
//! the document is complete is it parsed to recover the correlation id.

/// Default frame id when the body has no usable `"id"` field.
pub const NULL_FRAME_ID: &str = "NULL";

/// True when `buffer` holds a syntactically complete JSON container.
pub fn json_document_complete(buffer: &str) -> bool {
    let mut depth: i64 = 0;
    let mut in_string = false;
    let mut escaped = false;
    let mut seen_container = false;

    for c in buffer.chars() {
        if in_string {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' | '[' => {
                depth += 1;
                seen_container = true;
            }
            '}' | ']' => depth -= 1,
            _ => {}
        }
    }
    seen_container && depth == 0 && !in_string
}

/// The top-level `"id"` string value, [`NULL_FRAME_ID`] when absent.
pub fn extract_frame_id(data: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(value) => value
            .get("id")
            .and_then(serde_json::Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| NULL_FRAME_ID.to_string()),
        Err(_) => NULL_FRAME_ID.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complete_documents_are_detected() {
        assert!(json_document_complete(r#"{"id":"a"}"#));
        assert!(json_document_complete(r#"[1,2,3]"#));
        assert!(json_document_complete(r#"{"a":{"b":[1]}}"#));
    }

    #[test]
    fn partial_documents_are_not() {
        assert!(!json_document_complete(r#"{"id":"a""#));
        assert!(!json_document_complete(r#"{"nested":{"x":1}"#));
        assert!(!json_document_complete(""));
        assert!(!json_document_complete("plain text"));
    }

    #[test]
    fn braces_inside_strings_do_not_count() {
        assert!(json_document_complete(r#"{"text":"{not a brace}"}"#));
        assert!(!json_document_complete(r#"{"text":"}{""#));
        assert!(json_document_complete(r#"{"quote":"a \" b"}"#));
    }

    #[test]
    fn frame_id_extraction_defaults_to_null() {
        assert_eq!(extract_frame_id(r#"{"id":"req-1","result":{}}"#), "req-1");
        assert_eq!(extract_frame_id(r#"{"result":{}}"#), NULL_FRAME_ID);
        assert_eq!(extract_frame_id(r#"{"id":42}"#), NULL_FRAME_ID);
        assert_eq!(extract_frame_id("not json"), NULL_FRAME_ID);
    }
}
