//!
//! Adapter for generation-telemetry captures (`gen_ai.*` span attributes).
//!
//! Input messages arrive as `{role, parts}` entries with canonical role names;
//! the system prompt lives in its own attribute and is emitted first. Tool
//! definitions come from the agent's `model_request_parameters` attribute.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::sources::{SourceAdapter, debug};
use crate::capture::types::{CanonicalMessage, CanonicalRequest, ModelSettings, Role, SourceFormat, ToolDefinition};
use crate::capture::{keys, string_attr, structured_attr};
use crate::config::LogLevel;
use crate::converter::{MessageConverter, join_text_parts};
use crate::error::{ReplayError, Result};

/* --- constants ------------------------------------------------------------------------------ */

/** telemetry attribute -> canonical settings key */
const REQUEST_PARAMS: [(&str, &str); 6] = [
    (keys::GEN_AI_TEMPERATURE, "temperature"),
    (keys::GEN_AI_MAX_TOKENS, "max_tokens"),
    (keys::GEN_AI_TOP_P, "top_p"),
    (keys::GEN_AI_SEED, "seed"),
    (keys::GEN_AI_PRESENCE_PENALTY, "presence_penalty"),
    (keys::GEN_AI_FREQUENCY_PENALTY, "frequency_penalty"),
];

/** tool lists inside `model_request_parameters`, in emission order */
const TOOL_LISTS: [&str; 2] = ["function_tools", "output_tools"];

/* --- types ----------------------------------------------------------------------------------- */

///
/// Generation-telemetry adapter.
#[derive(Debug, Clone)]
pub struct TelemetryAdapter {
    log_level: LogLevel,
}

/* --- start of code -------------------------------------------------------------------------- */

impl TelemetryAdapter {
    /// Create the adapter.
    pub fn new(log_level: LogLevel) -> Self {
        Self { log_level }
    }

    fn convert_messages(&self, attrs: &Map<String, Value>) -> Result<Vec<CanonicalMessage>> {
        let mut messages = Vec::new();

        if let Some(instructions) = structured_attr(attrs, keys::GEN_AI_SYSTEM_INSTRUCTIONS) {
            let text = system_text(&instructions);
            if !text.is_empty() {
                messages.push(CanonicalMessage::system(text));
            }
        }

        let Some(Value::Array(inputs)) = structured_attr(attrs, keys::GEN_AI_INPUT_MESSAGES) else {
            return Ok(messages);
        };

        let mut converter = MessageConverter::new(self.log_level);
        for (index, entry) in inputs.iter().enumerate() {
            let label = entry.get("role").and_then(Value::as_str).unwrap_or_default();
            let role = Role::from_label(label).ok_or_else(|| {
                ReplayError::capture(
                    self.format(),
                    format!("input message {} has unsupported role '{}'", index, label),
                )
            })?;
            let parts = entry.get("parts").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
            messages.extend(converter.convert(parts, role)?);
        }

        Ok(messages)
    }
}

impl SourceAdapter for TelemetryAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::PydanticAi
    }

    fn to_canonical(&self, attrs: &Map<String, Value>) -> Result<CanonicalRequest> {
        let messages = self.convert_messages(attrs)?;

        let model_name = string_attr(attrs, keys::GEN_AI_REQUEST_MODEL)
            .or_else(|| string_attr(attrs, keys::GEN_AI_RESPONSE_MODEL))
            .unwrap_or_default()
            .to_string();

        let mut params = ModelSettings::default();
        for (key, canonical) in REQUEST_PARAMS {
            if let Some(value) = scalar_attr(attrs, key) {
                params.set(canonical, &value)?;
            }
        }

        let tools = match structured_attr(attrs, keys::MODEL_REQUEST_PARAMETERS) {
            Some(Value::Object(request_params)) => collect_tools(&request_params)?,
            _ => Vec::new(),
        };

        debug(
            self.log_level,
            &format!(
                "Telemetry: {} messages, {} tools, model {}",
                messages.len(),
                tools.len(),
                model_name
            ),
        );

        Ok(CanonicalRequest { messages, tools, model_name, params })
    }
}

///
/// Join system instruction entries with newlines.
///
/// An entry is a string, an object with string `content`, or an object with
/// a `parts` list.
pub fn system_text(instructions: &Value) -> String {
    let entries = match instructions {
        Value::Array(entries) => entries.as_slice(),
        Value::String(text) => return text.clone(),
        other => std::slice::from_ref(other),
    };

    entries
        .iter()
        .filter_map(|entry| match entry {
            Value::String(text) => Some(text.clone()),
            Value::Object(obj) => match (obj.get("content"), obj.get("parts")) {
                (Some(Value::String(content)), _) => Some(content.clone()),
                (_, Some(Value::Array(parts))) => Some(join_text_parts(parts)),
                _ => None,
            },
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n")
}

///
/// Rename agent tool definitions into canonical tools.
///
/// `{name, description, parameters_json_schema, strict}` becomes
/// `{name, description, parameters, strict}`; schemas are already lowercase.
pub fn collect_tools(request_params: &Map<String, Value>) -> Result<Vec<ToolDefinition>> {
    let mut tools = Vec::new();

    for list in TOOL_LISTS {
        let Some(entries) = request_params.get(list).and_then(Value::as_array) else {
            continue;
        };
        for (index, entry) in entries.iter().enumerate() {
            let name = entry.get("name").and_then(Value::as_str).filter(|n| !n.is_empty()).ok_or_else(|| {
                ReplayError::capture(
                    SourceFormat::PydanticAi,
                    format!("{}.{}[{}] has no name", keys::MODEL_REQUEST_PARAMETERS, list, index),
                )
            })?;
            let description = entry.get("description").and_then(Value::as_str).unwrap_or_default();
            let parameters = entry
                .get("parameters_json_schema")
                .filter(|p| !p.is_null())
                .cloned()
                .unwrap_or_else(ToolDefinition::empty_parameters);

            let mut tool = ToolDefinition::new(name, description, parameters);
            tool.strict = entry.get("strict").and_then(Value::as_bool);
            tools.push(tool);
        }
    }

    Ok(tools)
}

/* --- helper functions ----------------------------------------------------------------------- */

/// Scalar attribute, decoding numbers and booleans exported as strings.
fn scalar_attr(attrs: &Map<String, Value>, key: &str) -> Option<Value> {
    match attrs.get(key)? {
        Value::Null => None,
        Value::String(encoded) => match serde_json::from_str::<Value>(encoded) {
            Ok(decoded @ (Value::Number(_) | Value::Bool(_))) => Some(decoded),
            _ => Some(Value::String(encoded.clone())),
        },
        other => Some(other.clone()),
    }
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_system_text_shapes() {
        let instructions = json!([
            {"type": "text", "content": "First."},
            {"parts": [{"text": "Second."}]},
            "Third."
        ]);
        assert_eq!(system_text(&instructions), "First.\nSecond.\nThird.");
        assert_eq!(system_text(&json!("Only.")), "Only.");
    }

    #[test]
    fn test_tools_are_renamed() {
        let request_params = json!({
            "function_tools": [{
                "name": "lookup",
                "description": "Look up",
                "parameters_json_schema": {"type": "object", "properties": {"q": {"type": "string"}}},
                "strict": true
            }],
            "output_tools": [{"name": "final_result", "parameters_json_schema": {"type": "object"}}]
        });
        let tools = collect_tools(request_params.as_object().unwrap()).unwrap();

        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].strict, Some(true));
        assert_eq!(tools[1].name, "final_result");
        assert_eq!(
            serde_json::to_value(&tools[1]).unwrap(),
            json!({"type": "function", "function": {
                "name": "final_result", "description": "", "parameters": {"type": "object"}
            }})
        );
    }

    #[test]
    fn test_params_accept_string_encoded_numbers() {
        let attrs = json!({
            "gen_ai.input.messages": [{"role": "user", "parts": [{"type": "text", "content": "hi"}]}],
            "gen_ai.response.model": "gpt-4o",
            "gen_ai.request.temperature": "0.7",
            "gen_ai.request.max_tokens": 64
        });
        let request = TelemetryAdapter::new(LogLevel::Info).to_canonical(attrs.as_object().unwrap()).unwrap();

        assert_eq!(request.model_name, "gpt-4o");
        assert_eq!(request.params.temperature, Some(0.7));
        assert_eq!(request.params.max_tokens, Some(64));
    }
}
