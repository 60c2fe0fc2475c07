//! Pull the likely generated text out of a JSON response body.
//!
//! Extraction is an ordered table of pure functions over the parsed value.
//! Every strategy that recognises its shape contributes fragments; the
//! fragments are joined with newlines.

use serde_json::Value;

type Extractor = fn(&Value, &mut Vec<String>);

/// Top-level string fields checked when no structured shape is present.
pub const FALLBACK_FIELDS: &[&str] = &[
    "content",
    "text",
    "output",
    "output_text",
    "response",
    "completion",
    "generated_text",
    "result",
];

const STRATEGIES: &[(&str, Extractor)] = &[
    ("choices", from_choices),
    ("results", from_results),
    ("fallback_fields", from_fallback_fields),
    ("data", from_data),
    ("candidates", from_candidates),
    ("content_blocks", from_content_blocks),
];

/// Extracted text, or `None` when no strategy found anything.
pub fn extract_text(value: &Value) -> Option<String> {
    let mut fragments = Vec::new();
    for (name, strategy) in STRATEGIES {
        let before = fragments.len();
        strategy(value, &mut fragments);
        if fragments.len() > before {
            tracing::trace!(strategy = *name, found = fragments.len() - before, "extracted text");
        }
    }
    if fragments.is_empty() {
        None
    } else {
        Some(fragments.join("\n"))
    }
}

fn push_str(value: Option<&Value>, out: &mut Vec<String>) -> bool {
    match value.and_then(Value::as_str) {
        Some(s) => {
            out.push(s.to_string());
            true
        }
        None => false,
    }
}

/// `choices[*].message.content`, `choices[*].delta.content`, `choices[*].text`.
fn from_choices(value: &Value, out: &mut Vec<String>) {
    let Some(choices) = value.get("choices").and_then(Value::as_array) else {
        return;
    };
    for choice in choices {
        push_str(choice.pointer("/message/content"), out);
        push_str(choice.pointer("/delta/content"), out);
        push_str(choice.get("text"), out);
    }
}

/// `results[*].text | content | output_text`, first field present per item.
fn from_results(value: &Value, out: &mut Vec<String>) {
    let Some(results) = value.get("results").and_then(Value::as_array) else {
        return;
    };
    for item in results {
        let _ = push_str(item.get("text"), out)
            || push_str(item.get("content"), out)
            || push_str(item.get("output_text"), out);
    }
}

fn from_fallback_fields(value: &Value, out: &mut Vec<String>) {
    let Some(obj) = value.as_object() else {
        return;
    };
    for field in FALLBACK_FIELDS {
        push_str(obj.get(*field), out);
    }
}

/// `data[0].text`.
fn from_data(value: &Value, out: &mut Vec<String>) {
    push_str(value.pointer("/data/0/text"), out);
}

/// `candidates[*].content.parts[*].text`.
fn from_candidates(value: &Value, out: &mut Vec<String>) {
    let Some(candidates) = value.get("candidates").and_then(Value::as_array) else {
        return;
    };
    for candidate in candidates {
        let parts = candidate.pointer("/content/parts").and_then(Value::as_array);
        for part in parts.into_iter().flatten() {
            push_str(part.get("text"), out);
        }
    }
}

/// Top-level `content` as an array of `{ "type": "text", "text": ... }` blocks.
fn from_content_blocks(value: &Value, out: &mut Vec<String>) {
    let Some(blocks) = value.get("content").and_then(Value::as_array) else {
        return;
    };
    for block in blocks {
        push_str(block.get("text"), out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_completion_message_content() {
        let v = json!({"choices": [{"message": {"role": "assistant", "content": "Hello there"}}]});
        assert_eq!(extract_text(&v).as_deref(), Some("Hello there"));
    }

    #[test]
    fn multiple_choices_joined_with_newline() {
        let v = json!({"choices": [
            {"delta": {"content": "a"}},
            {"text": "b"},
            {"message": {"content": null}}
        ]});
        assert_eq!(extract_text(&v).as_deref(), Some("a\nb"));
    }

    #[test]
    fn results_shape_takes_first_present_field() {
        let v = json!({"results": [{"output_text": "x"}, {"text": "y", "content": "z"}]});
        assert_eq!(extract_text(&v).as_deref(), Some("x\ny"));
    }

    #[test]
    fn fallback_scalar_fields() {
        let v = json!({"response": "generated", "id": "abc", "text": 5});
        assert_eq!(extract_text(&v).as_deref(), Some("generated"));
    }

    #[test]
    fn data_first_item_text() {
        let v = json!({"data": [{"text": "first"}, {"text": "second"}]});
        assert_eq!(extract_text(&v).as_deref(), Some("first"));
    }

    #[test]
    fn gemini_candidates_parts() {
        let v = json!({"candidates": [{"content": {"parts": [{"text": "p1"}, {"text": "p2"}]}}]});
        assert_eq!(extract_text(&v).as_deref(), Some("p1\np2"));
    }

    #[test]
    fn content_block_array() {
        let v = json!({"content": [{"type": "text", "text": "block"}], "role": "assistant"});
        assert_eq!(extract_text(&v).as_deref(), Some("block"));
    }

    #[test]
    fn nothing_recognised() {
        assert!(extract_text(&json!({"id": 1, "object": "chat.completion"})).is_none());
        assert!(extract_text(&json!([1, 2, 3])).is_none());
        assert!(extract_text(&json!("bare string")).is_none());
    }
}
