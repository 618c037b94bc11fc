//!
//! Canonical data model shared by the parser and the replay engine.
//!
//! Every captured request, whatever its wire shape, is reduced to these types.
//! Their JSON form follows the OpenAI chat wire shape so that a stored split can
//! be handed back to any OpenAI-style consumer unchanged.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{ReplayError, Result};

/* --- types ----------------------------------------------------------------------------------- */

///
/// Canonical message role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

///
/// Message content: plain text, or structured content blocks kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    /** simple string content */
    Text(String),
    /** structured content blocks (multimodal OpenAI messages) */
    Parts(Vec<Value>),
}

///
/// One message of a canonical conversation.
///
/// Fields the canonical form does not model (for example `name`) are kept in
/// `extra` so that verbatim OpenAI messages survive a store/replay cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalMessage {
    /** message role */
    pub role: Role,
    /** message content; serialized as `null` when absent */
    #[serde(default)]
    pub content: Option<MessageContent>,
    /** tool calls issued by an assistant message */
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCallRef>,
    /** id of the call a tool message answers */
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /** any other fields of the source message */
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

///
/// Reference to a single tool invocation made by an assistant message.
///
/// A call decoded from a captured body keeps its wire form in `source` when
/// that form is not the plain function shape, and is serialized back from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ToolCallRef {
    /** call identifier, source-supplied or synthesized */
    pub id: String,
    /** function name, or the tool name of a non-function call */
    pub name: String,
    /** JSON-serialized arguments */
    pub arguments: String,
    /** captured wire form, serialized verbatim when present */
    pub source: Option<Value>,
}

///
/// Canonical tool definition.
///
/// Serialized in OpenAI wire shape: `{"type":"function","function":{...}}`.
/// A definition decoded from a captured body that does not match that shape
/// exactly (another tool type, omitted optional fields) keeps its wire form in
/// `source` and is serialized back from it unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct ToolDefinition {
    /** function name, or the tool type of a non-function tool */
    pub name: String,
    /** human description, empty when the source has none */
    pub description: String,
    /** JSON schema of the parameters, lowercase type names */
    pub parameters: Value,
    /** strict-schema flag when the source declares one */
    pub strict: Option<bool>,
    /** captured wire form, serialized verbatim when present */
    pub source: Option<Value>,
}

///
/// Generation parameters under their canonical names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ModelSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parallel_tool_calls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f64>,
}

///
/// Durable output of the capture parser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedCapture {
    /** conversation minus the extracted system prompt and last turn */
    pub middle_messages: Vec<CanonicalMessage>,
    /** canonical tool definitions, `None` when the capture declared none */
    pub tools: Option<Vec<ToolDefinition>>,
    /** model identifier */
    pub model_name: String,
    /** generation parameters, `None` when the capture carried none */
    pub model_settings: Option<ModelSettings>,
    /** content of the first system message, empty when there is none */
    pub system_prompt: String,
    /** content of the last non-assistant turn */
    pub last_user_message: String,
}

///
/// Known capture formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /** generation-telemetry attributes (`gen_ai.input.messages`) */
    PydanticAi,
    /** captured OpenAI chat completions request body */
    HttpBodyOpenai,
    /** captured Gemini generateContent request body */
    HttpBodyGemini,
    /** none of the above */
    Unknown,
}

///
/// Format-independent result of a source adapter, before partitioning.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CanonicalRequest {
    pub messages: Vec<CanonicalMessage>,
    pub tools: Vec<ToolDefinition>,
    pub model_name: String,
    pub params: ModelSettings,
}

/* --- start of code -------------------------------------------------------------------------- */

impl Role {
    /// Canonical label of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }

    /// Parse a canonical role label; anything else is `None`.
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "system" => Some(Role::System),
            "user" => Some(Role::User),
            "assistant" => Some(Role::Assistant),
            "tool" => Some(Role::Tool),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl CanonicalMessage {
    ///
    /// Create a plain text message.
    ///
    /// # Arguments
    ///  * `role` - message role
    ///  * `content` - text content
    pub fn text(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: Some(MessageContent::Text(content.into())),
            tool_calls: Vec::new(),
            tool_call_id: None,
            extra: Map::new(),
        }
    }

    /// Create a system message.
    pub fn system(content: impl Into<String>) -> Self {
        Self::text(Role::System, content)
    }

    /// Create a user message.
    pub fn user(content: impl Into<String>) -> Self {
        Self::text(Role::User, content)
    }

    /// Create a tool-result message, optionally linked to its originating call.
    pub fn tool_result(content: impl Into<String>, tool_call_id: Option<String>) -> Self {
        Self { tool_call_id, ..Self::text(Role::Tool, content) }
    }

    /// Content flattened to a string: text as-is, structured blocks as JSON, absent as empty.
    pub fn content_text(&self) -> String {
        match &self.content {
            Some(MessageContent::Text(text)) => text.clone(),
            Some(MessageContent::Parts(parts)) => Value::Array(parts.clone()).to_string(),
            None => String::new(),
        }
    }

    /// Whether this message carries tool calls.
    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }
}

impl ToolCallRef {
    /// Create a new tool call reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self { id: id.into(), name: name.into(), arguments: arguments.into(), source: None }
    }

    /// Plain function-call wire form built from the fields.
    fn function_wire(&self) -> Value {
        json!({
            "id": self.id,
            "type": "function",
            "function": {"name": self.name, "arguments": self.arguments}
        })
    }
}

impl TryFrom<Value> for ToolCallRef {
    type Error = String;

    fn try_from(raw: Value) -> std::result::Result<Self, Self::Error> {
        let obj = raw.as_object().ok_or_else(|| "tool call must be an object".to_string())?;
        let id = obj.get("id").and_then(Value::as_str).unwrap_or_default().to_string();
        let kind = obj.get("type").and_then(Value::as_str).unwrap_or("function");

        let mut call = if kind == "function" {
            let function = obj
                .get("function")
                .and_then(Value::as_object)
                .ok_or_else(|| "function call without a function object".to_string())?;
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .ok_or_else(|| "function call without a name".to_string())?;
            ToolCallRef::new(id, name, arguments_to_string(function.get("arguments").unwrap_or(&Value::Null)))
        } else {
            let payload = obj.get(kind);
            let name = payload.and_then(|p| p.get("name")).and_then(Value::as_str).unwrap_or(kind);
            let input = payload.and_then(|p| p.get("input")).unwrap_or(&Value::Null);
            ToolCallRef::new(id, name, arguments_to_string(input))
        };

        if call.function_wire() != raw {
            call.source = Some(raw);
        }
        Ok(call)
    }
}

impl From<ToolCallRef> for Value {
    fn from(call: ToolCallRef) -> Self {
        match call.source {
            Some(raw) => raw,
            None => call.function_wire(),
        }
    }
}

impl ToolDefinition {
    /// Create a tool definition without a strict flag.
    pub fn new(name: impl Into<String>, description: impl Into<String>, parameters: Value) -> Self {
        Self { name: name.into(), description: description.into(), parameters, strict: None, source: None }
    }

    /// Schema used when a declaration carries no parameters.
    pub fn empty_parameters() -> Value {
        json!({"type": "object", "properties": {}})
    }

    /// Whether this is a callable function tool.
    pub fn is_function(&self) -> bool {
        self.source
            .as_ref()
            .and_then(|raw| raw.get("type"))
            .and_then(Value::as_str)
            .is_none_or(|kind| kind == "function")
    }

    /// Plain function wire form built from the fields.
    fn function_wire(&self) -> Value {
        let mut function = Map::new();
        function.insert("name".to_string(), Value::String(self.name.clone()));
        function.insert("description".to_string(), Value::String(self.description.clone()));
        function.insert("parameters".to_string(), self.parameters.clone());
        if let Some(strict) = self.strict {
            function.insert("strict".to_string(), Value::Bool(strict));
        }
        json!({"type": "function", "function": function})
    }
}

impl TryFrom<Value> for ToolDefinition {
    type Error = String;

    fn try_from(raw: Value) -> std::result::Result<Self, Self::Error> {
        let obj = raw.as_object().ok_or_else(|| "tool must be an object".to_string())?;
        let kind = obj.get("type").and_then(Value::as_str).unwrap_or("function");

        let mut tool = if kind == "function" {
            let function = obj
                .get("function")
                .and_then(Value::as_object)
                .ok_or_else(|| "function tool without a function object".to_string())?;
            let name = function
                .get("name")
                .and_then(Value::as_str)
                .filter(|name| !name.is_empty())
                .ok_or_else(|| "function tool without a name".to_string())?;
            let mut tool = ToolDefinition::new(
                name,
                function.get("description").and_then(Value::as_str).unwrap_or_default(),
                function
                    .get("parameters")
                    .filter(|p| !p.is_null())
                    .cloned()
                    .unwrap_or_else(ToolDefinition::empty_parameters),
            );
            tool.strict = function.get("strict").and_then(Value::as_bool);
            tool
        } else {
            let payload = obj.get(kind);
            let name = payload.and_then(|p| p.get("name")).and_then(Value::as_str).unwrap_or(kind);
            let description = payload.and_then(|p| p.get("description")).and_then(Value::as_str);
            ToolDefinition::new(name, description.unwrap_or_default(), Value::Null)
        };

        if tool.function_wire() != raw {
            tool.source = Some(raw);
        }
        Ok(tool)
    }
}

impl From<ToolDefinition> for Value {
    fn from(tool: ToolDefinition) -> Self {
        match tool.source {
            Some(raw) => raw,
            None => tool.function_wire(),
        }
    }
}

impl ModelSettings {
    /// Whether no parameter is set.
    pub fn is_empty(&self) -> bool {
        *self == ModelSettings::default()
    }

    /// `None` when empty, so "no settings" is never stored as an empty mapping.
    pub fn into_option(self) -> Option<Self> {
        if self.is_empty() { None } else { Some(self) }
    }

    ///
    /// Set one parameter by canonical name from a JSON value.
    ///
    /// # Arguments
    ///  * `key` - canonical parameter name
    ///  * `value` - raw JSON value
    ///
    /// # Returns
    ///  * `Ok(())` when the value was stored or the key is not canonical
    ///  * `ReplayError::InvalidCapture` if the value has the wrong JSON type
    pub fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let invalid = || {
            ReplayError::InvalidCapture(format!("invalid value for '{}': {}", key, value))
        };
        match key {
            "temperature" => self.temperature = Some(value.as_f64().ok_or_else(invalid)?),
            "top_p" => self.top_p = Some(value.as_f64().ok_or_else(invalid)?),
            "max_tokens" => self.max_tokens = Some(value.as_u64().ok_or_else(invalid)?),
            "parallel_tool_calls" => {
                self.parallel_tool_calls = Some(value.as_bool().ok_or_else(invalid)?)
            }
            "seed" => self.seed = Some(value.as_i64().ok_or_else(invalid)?),
            "presence_penalty" => self.presence_penalty = Some(value.as_f64().ok_or_else(invalid)?),
            "frequency_penalty" => {
                self.frequency_penalty = Some(value.as_f64().ok_or_else(invalid)?)
            }
            _ => {}
        }
        Ok(())
    }
}

impl SourceFormat {
    /// Format tag as reported by the detector.
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceFormat::PydanticAi => "pydantic_ai",
            SourceFormat::HttpBodyOpenai => "http_body_openai",
            SourceFormat::HttpBodyGemini => "http_body_gemini",
            SourceFormat::Unknown => "unknown",
        }
    }
}

impl fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/* --- helper functions ----------------------------------------------------------------------- */

/// Accept `"tool_calls": null` as an empty list.
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<ToolCallRef>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<ToolCallRef>>::deserialize(deserializer)?.unwrap_or_default())
}

///
/// Tool-call arguments as a string: strings pass through, anything else is compact JSON.
pub(crate) fn arguments_to_string(arguments: &Value) -> String {
    match arguments {
        Value::String(s) => s.clone(),
        Value::Null => "{}".to_string(),
        other => other.to_string(),
    }
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_custom_tool_call_keeps_captured_form() {
        let wire = json!({"id": "c", "type": "custom", "custom": {"name": "grep", "input": "x"}});
        let call: ToolCallRef = serde_json::from_value(wire.clone()).unwrap();

        assert_eq!(call.id, "c");
        assert_eq!(call.name, "grep");
        assert_eq!(call.arguments, "x");
        assert_eq!(serde_json::to_string(&call).unwrap(), wire.to_string());
    }

    #[test]
    fn test_complete_function_forms_are_not_duplicated() {
        let call_wire = json!({"id": "1", "type": "function", "function": {"name": "f", "arguments": "{}"}});
        let call: ToolCallRef = serde_json::from_value(call_wire.clone()).unwrap();
        assert_eq!(call, ToolCallRef::new("1", "f", "{}"));
        assert_eq!(serde_json::to_value(&call).unwrap(), call_wire);

        let tool_wire = json!({
            "type": "function",
            "function": {"name": "f", "description": "F", "parameters": {"type": "object"}, "strict": true}
        });
        let tool: ToolDefinition = serde_json::from_value(tool_wire.clone()).unwrap();
        assert_eq!(tool.source, None);
        assert_eq!(tool.strict, Some(true));
        assert_eq!(serde_json::to_value(&tool).unwrap(), tool_wire);
    }

    #[test]
    fn test_sparse_function_tool_is_not_filled_in() {
        let wire = json!({"type": "function", "function": {"name": "f"}});
        let tool: ToolDefinition = serde_json::from_value(wire.clone()).unwrap();

        assert!(tool.is_function());
        assert_eq!(tool.parameters, ToolDefinition::empty_parameters());
        assert_eq!(serde_json::to_value(&tool).unwrap(), wire);
    }

    #[test]
    fn test_function_call_requires_name() {
        let wire = json!({"id": "1", "type": "function", "function": {"arguments": "{}"}});
        assert!(serde_json::from_value::<ToolCallRef>(wire).is_err());
    }
}
