//!
//! Canonical capture parser.
//!
//! Orchestrates detection, validation and conversion, then splits the
//! canonical conversation into the leading system prompt, the trailing
//! non-assistant turn and everything in between. The two extracted positions
//! are computed once over the full sequence and removed by index.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::detect::{detect_format, validate_format};
use crate::capture::keys;
use crate::capture::sources::{CaptureSource, SourceAdapter};
use crate::capture::types::{CanonicalMessage, ParsedCapture, Role, SourceFormat};
use crate::config::{LogLevel, ParserConfig};
use crate::error::{ReplayError, Result};

/* --- types ----------------------------------------------------------------------------------- */

///
/// Conversation split into the slots a capture is stored under.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageSplit {
    /** content of the first system message, empty when there is none */
    pub system_prompt: String,
    /** every message except the two extracted positions, in order */
    pub middle_messages: Vec<CanonicalMessage>,
    /** content of the last non-assistant message; a tool message is serialized whole */
    pub last_user_message: String,
}

///
/// Capture parser.
#[derive(Debug, Clone)]
pub struct CaptureParser {
    config: ParserConfig,
    log_level: LogLevel,
}

/* --- start of code -------------------------------------------------------------------------- */

impl Default for CaptureParser {
    fn default() -> Self {
        Self::new(&ParserConfig::default(), LogLevel::default())
    }
}

impl CaptureParser {
    ///
    /// Create a new parser.
    ///
    /// # Arguments
    ///  * `config` - parser configuration
    ///  * `log_level` - step-level logging switch
    pub fn new(config: &ParserConfig, log_level: LogLevel) -> Self {
        Self { config: config.clone(), log_level }
    }

    ///
    /// Detect the format of a raw capture without converting it.
    ///
    /// # Returns
    ///  * detected format
    ///  * `ReplayError::InvalidCapture` if the envelope has no attributes
    pub fn detect(&self, raw: &Value) -> Result<SourceFormat> {
        Ok(detect_format(attributes(raw)?))
    }

    ///
    /// Parse a raw capture into its stored split.
    ///
    /// Either a complete `ParsedCapture` is returned or nothing is: every
    /// failure is an `InvalidCapture` error.
    ///
    /// # Arguments
    ///  * `raw` - capture envelope holding an `attributes` map
    ///
    /// # Returns
    ///  * parsed capture
    ///  * `ReplayError::InvalidCapture` on detection, validation, conversion or empty-result failure
    pub fn parse(&self, raw: &Value) -> Result<ParsedCapture> {
        self.parse_inner(raw).inspect_err(|e| tracing::error!("Failed to parse capture: {}", e))
    }

    fn parse_inner(&self, raw: &Value) -> Result<ParsedCapture> {
        let attrs = attributes(raw)?;

        let format = detect_format(attrs);
        self.debug(&format!("Detected capture format {}", format));
        validate_format(format, attrs)?;

        let source = CaptureSource::for_format(format, &self.config, self.log_level)?;
        let request = source.to_canonical(attrs)?;

        if request.messages.is_empty() {
            return Err(ReplayError::capture(format, "no messages found"));
        }
        if request.model_name.is_empty() {
            return Err(ReplayError::capture(format, "no model specified"));
        }

        let split = partition(request.messages)?;
        self.debug(&format!(
            "Parsed capture: system_prompt={} chars, last_user_message={} chars, middle_messages={}, tools={}",
            split.system_prompt.len(),
            split.last_user_message.len(),
            split.middle_messages.len(),
            request.tools.len()
        ));

        Ok(ParsedCapture {
            middle_messages: split.middle_messages,
            tools: if request.tools.is_empty() { None } else { Some(request.tools) },
            model_name: request.model_name,
            model_settings: request.params.into_option(),
            system_prompt: split.system_prompt,
            last_user_message: split.last_user_message,
        })
    }

    pub(crate) fn debug(&self, msg: &str) {
        if self.log_level.is_trace_enabled() {
            tracing::debug!("[TRACE] {}", msg);
        }
    }
}

///
/// Parse a raw capture with the default parser configuration.
pub fn parse_capture(raw: &Value) -> Result<ParsedCapture> {
    CaptureParser::default().parse(raw)
}

///
/// Whether a raw capture has a recognized format that passes validation.
///
/// Does not run conversion, so a `true` result can still fail to parse on
/// conversion-level problems.
pub fn is_valid_capture(raw: &Value) -> bool {
    match attributes(raw) {
        Ok(attrs) => validate_format(detect_format(attrs), attrs).is_ok(),
        Err(_) => false,
    }
}

///
/// Split a canonical conversation into system prompt, middle and last turn.
///
/// # Arguments
///  * `messages` - full canonical conversation
///
/// # Returns
///  * the split; when the first system message is also the last
///    non-assistant message only that one position is removed
///  * `ReplayError::InvalidCapture` if a tool message cannot be serialized
pub fn partition(messages: Vec<CanonicalMessage>) -> Result<MessageSplit> {
    let system_index = messages.iter().position(|m| m.role == Role::System);
    let last_index = messages.iter().rposition(|m| m.role != Role::Assistant);

    let system_prompt = system_index.map(|i| messages[i].content_text()).unwrap_or_default();
    let last_user_message = match last_index.map(|i| &messages[i]) {
        Some(message) if message.role == Role::Tool => serde_json::to_string(message)
            .map_err(|e| ReplayError::InvalidCapture(format!("tool message not serializable: {}", e)))?,
        Some(message) => message.content_text(),
        None => String::new(),
    };

    let middle_messages = messages
        .into_iter()
        .enumerate()
        .filter(|(i, _)| Some(*i) != system_index && Some(*i) != last_index)
        .map(|(_, message)| message)
        .collect();

    Ok(MessageSplit { system_prompt, middle_messages, last_user_message })
}

/* --- helper functions ----------------------------------------------------------------------- */

fn attributes(raw: &Value) -> Result<&Map<String, Value>> {
    raw.get(keys::ATTRIBUTES)
        .and_then(Value::as_object)
        .filter(|attrs| !attrs.is_empty())
        .ok_or_else(|| ReplayError::InvalidCapture("missing attributes".to_string()))
}

/* --- tests ----------------------------------------------------------------------------------- */
