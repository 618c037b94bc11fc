//!
//! Capture format detection and structural validation.
//!
//! Detection looks only at the shape of the attribute map; validation then
//! checks that the detected shape carries everything its adapter needs, so
//! conversion never starts on a capture that cannot succeed.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::types::{Role, SourceFormat};
use crate::capture::{keys, string_attr, structured_attr};
use crate::error::{ReplayError, Result};

/* --- start of code -------------------------------------------------------------------------- */

///
/// Classify an attribute map into a known source format.
///
/// First match wins: telemetry input messages, then a captured HTTP body with
/// `messages` and `model` (OpenAI), then a body with `contents` or a system
/// instruction (Gemini).
///
/// # Arguments
///  * `attrs` - the capture's `attributes` map
///
/// # Returns
///  * detected format, `SourceFormat::Unknown` when nothing matches
pub fn detect_format(attrs: &Map<String, Value>) -> SourceFormat {
    if let Some(Value::Array(_)) = structured_attr(attrs, keys::GEN_AI_INPUT_MESSAGES) {
        return SourceFormat::PydanticAi;
    }

    let Some(Value::Object(body)) = structured_attr(attrs, keys::HTTP_REQUEST_BODY) else {
        return SourceFormat::Unknown;
    };

    if body.contains_key("messages") && body.contains_key("model") {
        SourceFormat::HttpBodyOpenai
    } else if body.contains_key("contents") || system_instruction(&body).is_some() {
        SourceFormat::HttpBodyGemini
    } else {
        SourceFormat::Unknown
    }
}

///
/// Check that an attribute map satisfies the structural rules of a format.
///
/// # Arguments
///  * `format` - format returned by `detect_format`
///  * `attrs` - the capture's `attributes` map
///
/// # Returns
///  * `Ok(())` when conversion can proceed
///  * `ReplayError::InvalidCapture` naming the format and the first offending field
pub fn validate_format(format: SourceFormat, attrs: &Map<String, Value>) -> Result<()> {
    match format {
        SourceFormat::HttpBodyOpenai => validate_openai(attrs),
        SourceFormat::HttpBodyGemini => validate_gemini(attrs),
        SourceFormat::PydanticAi => validate_telemetry(attrs),
        SourceFormat::Unknown => Err(ReplayError::InvalidCapture(
            "unrecognized capture format: expected a captured HTTP request body or generation telemetry"
                .to_string(),
        )),
    }
}

/// Gemini system instruction under either spelling.
pub(crate) fn system_instruction(body: &Map<String, Value>) -> Option<&Value> {
    body.get("systemInstruction")
        .or_else(|| body.get("system_instruction"))
        .filter(|v| !v.is_null())
}

/* --- helper functions ----------------------------------------------------------------------- */

fn validate_openai(attrs: &Map<String, Value>) -> Result<()> {
    let fail = |detail: String| ReplayError::capture(SourceFormat::HttpBodyOpenai, detail);
    let body = request_body(attrs).ok_or_else(|| fail("request body is not an object".into()))?;

    let messages = body
        .get("messages")
        .and_then(Value::as_array)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| fail("messages must be a non-empty list".into()))?;

    for (index, message) in messages.iter().enumerate() {
        let role = message.get("role").and_then(Value::as_str);
        if role.and_then(Role::from_label).is_none() {
            return Err(fail(format!("messages[{}].role is missing or invalid", index)));
        }
        if message.get("content").is_none() {
            return Err(fail(format!("messages[{}].content is missing", index)));
        }
    }

    match body.get("model").and_then(Value::as_str) {
        Some(model) if !model.is_empty() => Ok(()),
        _ => Err(fail("model must be a non-empty string".into())),
    }
}

fn validate_gemini(attrs: &Map<String, Value>) -> Result<()> {
    let fail = |detail: String| ReplayError::capture(SourceFormat::HttpBodyGemini, detail);
    let body = request_body(attrs).ok_or_else(|| fail("request body is not an object".into()))?;

    let contents = body.get("contents").filter(|v| !v.is_null());
    let instruction = system_instruction(&body);
    if contents.is_none() && instruction.is_none() {
        return Err(fail("contents or systemInstruction is required".into()));
    }

    if let Some(contents) = contents {
        let entries = contents.as_array().ok_or_else(|| fail("contents must be a list".into()))?;
        for (index, entry) in entries.iter().enumerate() {
            if !entry.get("parts").is_some_and(Value::is_array) {
                return Err(fail(format!("contents[{}].parts must be a list", index)));
            }
        }
    }

    if let Some(instruction) = instruction {
        if !instruction.is_string() && !instruction.get("parts").is_some_and(Value::is_array) {
            return Err(fail("systemInstruction.parts must be a list".into()));
        }
    }

    Ok(())
}

fn validate_telemetry(attrs: &Map<String, Value>) -> Result<()> {
    let fail = |detail: String| ReplayError::capture(SourceFormat::PydanticAi, detail);

    let messages = match structured_attr(attrs, keys::GEN_AI_INPUT_MESSAGES) {
        Some(Value::Array(messages)) if !messages.is_empty() => messages,
        _ => return Err(fail(format!("{} must be a non-empty list", keys::GEN_AI_INPUT_MESSAGES))),
    };

    for (index, message) in messages.iter().enumerate() {
        let Some(role) = message.get("role").and_then(Value::as_str) else {
            return Err(fail(format!("input message {} has no role", index)));
        };
        if Role::from_label(role).is_none() {
            return Err(fail(format!("input message {} has unsupported role '{}'", index, role)));
        }
        if !message.get("parts").is_some_and(Value::is_array) {
            return Err(fail(format!("input message {} parts must be a list", index)));
        }
    }

    if string_attr(attrs, keys::GEN_AI_REQUEST_MODEL)
        .or_else(|| string_attr(attrs, keys::GEN_AI_RESPONSE_MODEL))
        .is_none()
    {
        return Err(fail(format!("{} is missing", keys::GEN_AI_REQUEST_MODEL)));
    }

    Ok(())
}

fn request_body(attrs: &Map<String, Value>) -> Option<Map<String, Value>> {
    match structured_attr(attrs, keys::HTTP_REQUEST_BODY)? {
        Value::Object(body) => Some(body),
        _ => None,
    }
}

/* --- tests ----------------------------------------------------------------------------------- */
