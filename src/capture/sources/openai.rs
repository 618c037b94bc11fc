//!
//! Adapter for captured OpenAI chat completions request bodies.
//!
//! The body is already in canonical shape: messages and tools are decoded
//! verbatim and only generation parameters need renaming.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::sources::{SourceAdapter, debug, request_body};
use crate::capture::types::{CanonicalMessage, CanonicalRequest, ModelSettings, SourceFormat};
use crate::config::LogLevel;
use crate::converter::decode_openai_tools;
use crate::error::{ReplayError, Result};

/* --- constants ------------------------------------------------------------------------------ */

/** top-level request keys copied into model settings under the same name */
const PASSTHROUGH_PARAMS: [&str; 6] =
    ["temperature", "top_p", "parallel_tool_calls", "seed", "presence_penalty", "frequency_penalty"];

/* --- types ----------------------------------------------------------------------------------- */

///
/// OpenAI request body adapter.
#[derive(Debug, Clone)]
pub struct OpenAiBodyAdapter {
    log_level: LogLevel,
}

/* --- start of code -------------------------------------------------------------------------- */

impl OpenAiBodyAdapter {
    /// Create the adapter.
    pub fn new(log_level: LogLevel) -> Self {
        Self { log_level }
    }
}

impl SourceAdapter for OpenAiBodyAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::HttpBodyOpenai
    }

    fn to_canonical(&self, attrs: &Map<String, Value>) -> Result<CanonicalRequest> {
        let body = request_body(attrs, self.format())?;

        let messages = match body.get("messages") {
            Some(Value::Array(raw)) => raw
                .iter()
                .enumerate()
                .map(|(index, message)| {
                    serde_json::from_value::<CanonicalMessage>(message.clone()).map_err(|e| {
                        ReplayError::capture(self.format(), format!("messages[{}]: {}", index, e))
                    })
                })
                .collect::<Result<Vec<_>>>()?,
            _ => Vec::new(),
        };

        let tools = match body.get("tools") {
            Some(Value::Array(raw)) => decode_openai_tools(raw)?,
            _ => Vec::new(),
        };

        let model_name = body.get("model").and_then(Value::as_str).unwrap_or_default().to_string();
        let params = extract_params(&body)?;

        debug(
            self.log_level,
            &format!(
                "OpenAI body: {} messages, {} tools, model {}",
                messages.len(),
                tools.len(),
                model_name
            ),
        );

        Ok(CanonicalRequest { messages, tools, model_name, params })
    }
}

///
/// Collect generation parameters from a request body.
///
/// `max_completion_tokens` takes priority over `max_tokens`; both map to the
/// canonical `max_tokens`. Null values count as absent.
///
/// # Returns
///  * settings with only the present keys set
///  * `ReplayError::InvalidCapture` if a present value has the wrong type
pub fn extract_params(body: &Map<String, Value>) -> Result<ModelSettings> {
    let mut params = ModelSettings::default();

    for key in PASSTHROUGH_PARAMS {
        if let Some(value) = present(body, key) {
            params.set(key, value)?;
        }
    }

    if let Some(value) = present(body, "max_completion_tokens").or_else(|| present(body, "max_tokens")) {
        params.set("max_tokens", value)?;
    }

    Ok(params)
}

fn present<'a>(body: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    body.get(key).filter(|v| !v.is_null())
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_completion_tokens_alias_wins() {
        let params = extract_params(&body(json!({"temperature": 0.2, "max_completion_tokens": 1000}))).unwrap();
        assert_eq!(serde_json::to_value(&params).unwrap(), json!({"temperature": 0.2, "max_tokens": 1000}));

        let both = extract_params(&body(json!({"max_tokens": 5, "max_completion_tokens": 9}))).unwrap();
        assert_eq!(both.max_tokens, Some(9));
    }

    #[test]
    fn test_no_whitelisted_keys_is_empty() {
        let params = extract_params(&body(json!({"stream": true, "temperature": null}))).unwrap();
        assert!(params.is_empty());
    }

    #[test]
    fn test_wrong_typed_param_is_invalid() {
        let err = extract_params(&body(json!({"temperature": "hot"}))).unwrap_err();
        assert!(err.is_invalid_capture());
    }

    #[test]
    fn test_messages_keep_extra_fields_and_tool_calls() {
        let attrs = body(json!({"http.request.body.text": {
            "model": "gpt-4o",
            "messages": [
                {"role": "user", "content": "hi", "name": "alice"},
                {"role": "assistant", "content": null, "tool_calls": [
                    {"id": "c1", "type": "function", "function": {"name": "f", "arguments": "{}"}}
                ]},
                {"role": "tool", "content": "ok", "tool_call_id": "c1"}
            ]
        }}));

        let request = OpenAiBodyAdapter::new(LogLevel::Info).to_canonical(&attrs).unwrap();
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].extra.get("name"), Some(&json!("alice")));
        assert_eq!(request.messages[1].tool_calls[0].id, "c1");
        assert_eq!(
            serde_json::to_value(&request.messages[2]).unwrap(),
            json!({"role": "tool", "content": "ok", "tool_call_id": "c1"})
        );
        assert!(request.params.is_empty());
    }
}
