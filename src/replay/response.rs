//!
//! Model response representation and rendering.
//!
//! A replayed call returns an ordered list of parts. Rendering turns them into
//! one display string: text first, then a numbered tool-call section, or a
//! placeholder when the model produced neither.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde::{Deserialize, Serialize};
use serde_json::Value;

/* --- constants ------------------------------------------------------------------------------ */

/** rendered when a response has neither text nor tool calls */
pub const EMPTY_RESPONSE_PLACEHOLDER: &str = "[No response content or tool calls]";

/* --- types ----------------------------------------------------------------------------------- */

///
/// Response returned by the model invocation capability.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelResponse {
    /** response parts in the order the model produced them */
    pub parts: Vec<ResponsePart>,
}

///
/// One part of a model response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "part_kind", rename_all = "kebab-case")]
pub enum ResponsePart {
    Text {
        content: String,
    },
    ToolCall {
        tool_name: String,
        tool_call_id: String,
        /** arguments as the model sent them: a JSON string or a structured value */
        args: Value,
    },
}

///
/// Summary numbers about a response's text content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseMetadata {
    pub parts_count: usize,
    /** whether any text part is non-empty */
    pub has_content: bool,
    /** total length of non-empty text parts, in bytes */
    pub content_length: usize,
}

/* --- start of code -------------------------------------------------------------------------- */

impl ModelResponse {
    /// Response made of a single text part.
    pub fn text(content: impl Into<String>) -> Self {
        Self { parts: vec![ResponsePart::Text { content: content.into() }] }
    }

    /// Concatenated text of all text parts.
    pub fn text_content(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text { content } => Some(content.as_str()),
                ResponsePart::ToolCall { .. } => None,
            })
            .collect()
    }

    /// Names of the tools the model called, in order.
    pub fn tool_names(&self) -> Vec<&str> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::ToolCall { tool_name, .. } => Some(tool_name.as_str()),
                ResponsePart::Text { .. } => None,
            })
            .collect()
    }
}

impl ResponseMetadata {
    /// Compute metadata for a response.
    pub fn from_response(response: &ModelResponse) -> Self {
        let texts: Vec<&String> = response
            .parts
            .iter()
            .filter_map(|part| match part {
                ResponsePart::Text { content } if !content.is_empty() => Some(content),
                _ => None,
            })
            .collect();

        Self {
            parts_count: response.parts.len(),
            has_content: !texts.is_empty(),
            content_length: texts.iter().map(|t| t.len()).sum(),
        }
    }
}

///
/// Render a model response as a single display string.
///
/// # Arguments
///  * `response` - the model response
///
/// # Returns
///  * text content, followed by a `=== Tool Calls ===` section when the
///    model called tools, or the empty-response placeholder
pub fn format_response(response: &ModelResponse) -> String {
    let mut out = response.text_content();

    let calls: Vec<(&String, &String, &Value)> = response
        .parts
        .iter()
        .filter_map(|part| match part {
            ResponsePart::ToolCall { tool_name, tool_call_id, args } => Some((tool_name, tool_call_id, args)),
            ResponsePart::Text { .. } => None,
        })
        .collect();

    if !calls.is_empty() {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("=== Tool Calls ===\n");
        for (index, (name, id, args)) in calls.iter().enumerate() {
            out.push_str(&format!("Tool Call {}:\n", index + 1));
            out.push_str(&format!("  Name: {}\n", name));
            out.push_str(&format!("  ID: {}\n", id));
            out.push_str(&format!("  Arguments: {}\n", format_arguments(args)));
            if index + 1 < calls.len() {
                out.push('\n');
            }
        }
    }

    if out.is_empty() {
        tracing::warn!("No content or tool calls in model response");
        return EMPTY_RESPONSE_PLACEHOLDER.to_string();
    }
    out
}

/* --- helper functions ----------------------------------------------------------------------- */

/// Pretty-print arguments; a string that is not valid JSON is shown as-is.
fn format_arguments(args: &Value) -> String {
    let parsed = match args {
        Value::String(raw) => match serde_json::from_str::<Value>(raw) {
            Ok(parsed) => parsed,
            Err(_) => return raw.clone(),
        },
        other => other.clone(),
    };
    serde_json::to_string_pretty(&parsed).unwrap_or_else(|_| parsed.to_string())
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_argument_formatting() {
        assert_eq!(format_arguments(&json!("{\"a\":1}")), "{\n  \"a\": 1\n}");
        assert_eq!(format_arguments(&json!("not json")), "not json");
        assert_eq!(format_arguments(&json!({"b": [1]})), "{\n  \"b\": [\n    1\n  ]\n}");
    }

    #[test]
    fn test_metadata_counts_text_only() {
        let response = ModelResponse {
            parts: vec![
                ResponsePart::Text { content: "abc".into() },
                ResponsePart::Text { content: String::new() },
                ResponsePart::ToolCall { tool_name: "f".into(), tool_call_id: "1".into(), args: json!({}) },
            ],
        };
        assert_eq!(
            ResponseMetadata::from_response(&response),
            ResponseMetadata { parts_count: 3, has_content: true, content_length: 3 }
        );
        assert!(!ResponseMetadata::from_response(&ModelResponse::default()).has_content);
    }

    #[test]
    fn test_part_wire_shape() {
        let part: ResponsePart =
            serde_json::from_value(json!({"part_kind": "tool-call", "tool_name": "f", "tool_call_id": "x", "args": "{}"}))
                .unwrap();
        assert_eq!(part, ResponsePart::ToolCall { tool_name: "f".into(), tool_call_id: "x".into(), args: json!("{}") });
    }
}
