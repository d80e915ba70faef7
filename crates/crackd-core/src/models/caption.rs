//! Caption records returned by the generation endpoint.
//!
//! The endpoint has shipped several response shapes over time; records may
//! carry their text under `content`, `caption`, or `text`. Normalization
//! picks the first non-empty field in that priority order.

use serde::Serialize;
use serde_json::Value;

/// A single generated caption, normalized from a heterogeneous API record.
#[derive(Debug, Clone, Serialize)]
pub struct CaptionRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub text: String,
    #[serde(skip)]
    raw: Value,
}

/// Text field priority: `content` > `caption` > `text`. A field counts only
/// when it is a string with non-whitespace content; the original value is
/// kept untrimmed.
fn extract_caption_text(record: &Value) -> String {
    for key in ["content", "caption", "text"] {
        if let Some(s) = record.get(key).and_then(Value::as_str) {
            if !s.trim().is_empty() {
                return s.to_string();
            }
        }
    }
    String::new()
}

impl CaptionRecord {
    pub fn from_value(record: Value) -> Self {
        let id = record
            .get("id")
            .and_then(Value::as_str)
            .map(|s| s.to_string());
        let text = extract_caption_text(&record);
        CaptionRecord {
            id,
            text,
            raw: record,
        }
    }

    /// Text to show the user. Records with no usable text field render as
    /// their raw JSON payload rather than a blank line.
    pub fn display_text(&self) -> String {
        if self.text.is_empty() {
            self.raw.to_string()
        } else {
            self.text.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn normalizes_in_priority_order() {
        let cases = [
            (json!({"content": "A"}), "A"),
            (json!({"caption": "B"}), "B"),
            (json!({"text": "C"}), "C"),
            (json!({}), ""),
        ];
        for (value, expected) in cases {
            let record = CaptionRecord::from_value(value);
            assert_eq!(record.text, expected);
        }
    }

    #[test]
    fn content_wins_over_caption_and_text() {
        let record = CaptionRecord::from_value(json!({
            "content": "first",
            "caption": "second",
            "text": "third",
        }));
        assert_eq!(record.text, "first");

        let record = CaptionRecord::from_value(json!({
            "caption": "second",
            "text": "third",
        }));
        assert_eq!(record.text, "second");
    }

    #[test]
    fn blank_fields_are_skipped() {
        let record = CaptionRecord::from_value(json!({
            "content": "   ",
            "caption": "kept",
        }));
        assert_eq!(record.text, "kept");

        // Non-string fields do not count either.
        let record = CaptionRecord::from_value(json!({
            "content": 42,
            "text": "fallback",
        }));
        assert_eq!(record.text, "fallback");
    }

    #[test]
    fn text_is_kept_untrimmed() {
        let record = CaptionRecord::from_value(json!({"content": "  padded  "}));
        assert_eq!(record.text, "  padded  ");
    }

    #[test]
    fn display_falls_back_to_raw_payload() {
        let record = CaptionRecord::from_value(json!({"id": "c1", "score": 0.9}));
        assert_eq!(record.id.as_deref(), Some("c1"));
        assert!(record.text.is_empty());
        let shown = record.display_text();
        assert!(shown.contains("\"score\""));

        let record = CaptionRecord::from_value(json!({"content": "hello"}));
        assert_eq!(record.display_text(), "hello");
    }
}
