//!
//! Part-list message converter.
//!
//! Turns provider-native `parts` lists into canonical messages. Tool calls and
//! tool results are linked through a `CorrelationState` that lives for exactly
//! one conversion pass: exact call id first, oldest pending call of the same
//! function name second, no link at all when neither matches.
//!
//! Two part dialects are understood:
//! - Gemini: `{"text"}`, `{"functionCall": {name, args, id?}}`,
//!   `{"functionResponse": {name, response, id?}}`
//! - generation telemetry: `{"type":"text","content"}`,
//!   `{"type":"tool_call", id, name, arguments}`,
//!   `{"type":"tool_call_response", id, name, result}`
//!
//! Anything else is preserved as JSON text.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use std::collections::{HashMap, VecDeque};

use serde_json::{Value, json};

use crate::capture::types::arguments_to_string;
use crate::capture::{CanonicalMessage, MessageContent, Role, ToolCallRef};
use crate::config::LogLevel;
use crate::error::{ReplayError, Result};

/* --- types ----------------------------------------------------------------------------------- */

///
/// Pending tool-call table for a single conversion pass.
#[derive(Debug)]
pub struct CorrelationState {
    /** counter for synthesized ids, starts at 1 */
    next_id: u64,
    /** pending call id -> function names of the calls using it, oldest first */
    by_call_id: HashMap<String, VecDeque<String>>,
    /** function name -> pending call ids, oldest first */
    by_name: HashMap<String, VecDeque<String>>,
}

///
/// A single classified part.
#[derive(Debug, Clone, PartialEq)]
pub enum Part {
    Text(String),
    FunctionCall { id: Option<String>, name: String, arguments: String },
    FunctionResponse { id: Option<String>, name: String, response: Value },
    Other(Value),
}

///
/// Converter that threads one correlation state through a whole conversation.
#[derive(Debug)]
pub struct MessageConverter {
    state: CorrelationState,
    log_level: LogLevel,
}

/* --- start of code -------------------------------------------------------------------------- */

impl Default for CorrelationState {
    fn default() -> Self {
        Self::new()
    }
}

impl CorrelationState {
    /// Create an empty table.
    pub fn new() -> Self {
        Self { next_id: 1, by_call_id: HashMap::new(), by_name: HashMap::new() }
    }

    ///
    /// Register a tool call as pending.
    ///
    /// # Arguments
    ///  * `name` - function name
    ///  * `source_id` - id carried by the source, if any
    ///
    /// # Returns
    ///  * the source id when non-empty, otherwise a synthesized `tool_call_{n}`
    pub fn register_call(&mut self, name: &str, source_id: Option<&str>) -> String {
        let id = match source_id.filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => {
                let id = format!("tool_call_{}", self.next_id);
                self.next_id += 1;
                id
            }
        };

        self.by_call_id.entry(id.clone()).or_default().push_back(name.to_string());
        self.by_name.entry(name.to_string()).or_default().push_back(id.clone());
        id
    }

    ///
    /// Resolve a tool response to the call that produced it, consuming the match.
    ///
    /// # Arguments
    ///  * `name` - function name of the response
    ///  * `source_id` - id carried by the response, if any
    ///
    /// # Returns
    ///  * the matched call id, or `None` when nothing is pending for it
    pub fn resolve_response(&mut self, name: &str, source_id: Option<&str>) -> Option<String> {
        if let Some(id) = source_id.filter(|id| !id.is_empty()) {
            if let Some(call_name) = take_first(&mut self.by_call_id, id, |_| true) {
                take_first(&mut self.by_name, &call_name, |pending| pending == id);
                return Some(id.to_string());
            }
        }

        let id = take_first(&mut self.by_name, name, |_| true)?;
        take_first(&mut self.by_call_id, &id, |pending| pending == name);
        Some(id)
    }

    /// Number of calls still waiting for a response.
    pub fn pending_count(&self) -> usize {
        self.by_name.values().map(VecDeque::len).sum()
    }
}

impl Part {
    ///
    /// Classify a raw part.
    ///
    /// # Returns
    ///  * the classified part
    ///  * `ReplayError::InvalidCapture` if a function call has no name
    pub fn classify(raw: &Value) -> Result<Self> {
        if let Some(text) = raw.as_str() {
            return Ok(Part::Text(text.to_string()));
        }

        if let Some(call) = raw.get("functionCall") {
            return Ok(Part::FunctionCall {
                id: string_field(call, "id"),
                name: required_name(call, "functionCall")?,
                arguments: arguments_to_string(call.get("args").unwrap_or(&Value::Null)),
            });
        }

        if let Some(response) = raw.get("functionResponse") {
            return Ok(Part::FunctionResponse {
                id: string_field(response, "id"),
                name: string_field(response, "name").unwrap_or_default(),
                response: response.get("response").cloned().unwrap_or(Value::Null),
            });
        }

        match raw.get("type").and_then(Value::as_str) {
            Some("tool_call") => Ok(Part::FunctionCall {
                id: string_field(raw, "id"),
                name: required_name(raw, "tool_call")?,
                arguments: arguments_to_string(raw.get("arguments").unwrap_or(&Value::Null)),
            }),
            Some("tool_call_response") => Ok(Part::FunctionResponse {
                id: string_field(raw, "id"),
                name: string_field(raw, "name").unwrap_or_default(),
                response: raw.get("result").cloned().unwrap_or(Value::Null),
            }),
            Some("text") | None => match text_field(raw) {
                Some(text) => Ok(Part::Text(text)),
                None => Ok(Part::Other(raw.clone())),
            },
            Some(_) => Ok(Part::Other(raw.clone())),
        }
    }
}

impl MessageConverter {
    /// Create a converter with a fresh correlation state.
    pub fn new(log_level: LogLevel) -> Self {
        Self { state: CorrelationState::new(), log_level }
    }

    ///
    /// Convert one provider message into canonical messages.
    ///
    /// Emits the primary message (when it has text or tool calls) followed by
    /// one `tool` message per function response, in part order.
    ///
    /// # Arguments
    ///  * `parts` - the message's part list
    ///  * `role` - canonical role, already mapped by the caller
    ///
    /// # Returns
    ///  * zero or more canonical messages
    ///  * `ReplayError::InvalidCapture` if a part cannot be classified
    pub fn convert(&mut self, parts: &[Value], role: Role) -> Result<Vec<CanonicalMessage>> {
        let mut text_segments: Vec<String> = Vec::new();
        let mut tool_calls: Vec<ToolCallRef> = Vec::new();
        let mut extra_messages: Vec<CanonicalMessage> = Vec::new();

        for raw in parts {
            match Part::classify(raw)? {
                Part::Text(text) => text_segments.push(text),
                Part::FunctionCall { id, name, arguments } => {
                    let call_id = self.state.register_call(&name, id.as_deref());
                    self.debug(&format!("Registered tool call {} -> {}", call_id, name));
                    tool_calls.push(ToolCallRef::new(call_id, name, arguments));
                }
                Part::FunctionResponse { id, name, response } => {
                    let call_id = self.state.resolve_response(&name, id.as_deref());
                    match &call_id {
                        Some(call_id) => {
                            self.debug(&format!("Paired response for {} with {}", name, call_id))
                        }
                        None => tracing::warn!("No pending call matches tool response '{}'", name),
                    }
                    let content = json!({"name": name, "response": response}).to_string();
                    extra_messages.push(CanonicalMessage::tool_result(content, call_id));
                }
                Part::Other(value) => {
                    self.debug("Preserving unrecognized part as JSON text");
                    text_segments.push(value.to_string());
                }
            }
        }

        let mut messages = Vec::with_capacity(extra_messages.len() + 1);
        if !text_segments.is_empty() || !tool_calls.is_empty() {
            let content = if !text_segments.is_empty() {
                Some(MessageContent::Text(text_segments.join("\n")))
            } else if role == Role::Assistant {
                Some(MessageContent::Text(String::new()))
            } else {
                None
            };
            messages.push(CanonicalMessage { content, tool_calls, ..CanonicalMessage::text(role, "") });
        }
        messages.extend(extra_messages);
        Ok(messages)
    }

    /// Calls still waiting for a response in this pass.
    pub fn pending_calls(&self) -> usize {
        self.state.pending_count()
    }

    pub(crate) fn debug(&self, msg: &str) {
        if self.log_level.is_trace_enabled() {
            tracing::debug!("[TRACE] {}", msg);
        }
    }
}

///
/// Join the textual content of a part list with newlines.
///
/// Used for system instructions, where only text is meaningful; any other
/// part is kept as JSON text.
pub fn join_text_parts(parts: &[Value]) -> String {
    parts
        .iter()
        .map(|raw| match raw.as_str() {
            Some(text) => text.to_string(),
            None => text_field(raw).unwrap_or_else(|| raw.to_string()),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/* --- helper functions ----------------------------------------------------------------------- */

fn text_field(raw: &Value) -> Option<String> {
    raw.get("text").or_else(|| raw.get("content")).and_then(Value::as_str).map(str::to_string)
}

fn string_field(raw: &Value, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_string)
}

fn required_name(raw: &Value, kind: &str) -> Result<String> {
    raw.get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .ok_or_else(|| ReplayError::InvalidCapture(format!("{} part without a function name", kind)))
}

/// Remove and return the first queued entry under `key` that satisfies `matches`,
/// dropping the key once its queue is empty.
fn take_first(
    queues: &mut HashMap<String, VecDeque<String>>,
    key: &str,
    matches: impl Fn(&str) -> bool,
) -> Option<String> {
    let queue = queues.get_mut(key)?;
    let position = queue.iter().position(|entry| matches(entry))?;
    let entry = queue.remove(position);
    if queue.is_empty() {
        queues.remove(key);
    }
    entry
}

/* --- tests ----------------------------------------------------------------------------------- */
