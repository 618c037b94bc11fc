//!
//! Capture normalization: detection, source adapters and the canonical parser.
//!
//! A capture is a recorded LLM request as stored by an observability pipeline:
//! a JSON envelope whose `attributes` map holds either a captured HTTP request
//! body or generation-telemetry attributes. This module reduces every known
//! shape to a `ParsedCapture`.
//!
//! Submodules:
//! - `types.rs` - canonical data model
//! - `detect.rs` - format detection and structural validation
//! - `sources/` - one adapter per source format
//! - `parser.rs` - orchestration and system/middle/last-turn partitioning
//! - `model_info.rs` - `provider:model` helpers
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- modules --------------------------------------------------------------------------------- */

pub mod detect;
pub mod model_info;
pub mod parser;
pub mod sources;
pub mod types;

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

pub use detect::{detect_format, validate_format};
pub use model_info::{ModelInfo, is_valid_model_name};
pub use parser::{CaptureParser, MessageSplit, is_valid_capture, parse_capture, partition};
pub use sources::{CaptureSource, SourceAdapter};
pub use types::{
    CanonicalMessage, CanonicalRequest, MessageContent, ModelSettings, ParsedCapture, Role,
    SourceFormat, ToolCallRef, ToolDefinition,
};

/* --- attribute keys -------------------------------------------------------------------------- */

pub mod keys {
    // Envelope
    pub const ATTRIBUTES: &str = "attributes";

    // Captured HTTP request
    pub const HTTP_REQUEST_BODY: &str = "http.request.body.text";
    pub const URL_FULL: &str = "url.full";
    pub const HTTP_URL: &str = "http.url";
    pub const URL_PATH: &str = "url.path";
    pub const HTTP_TARGET: &str = "http.target";

    // Generation telemetry
    pub const GEN_AI_INPUT_MESSAGES: &str = "gen_ai.input.messages";
    pub const GEN_AI_SYSTEM_INSTRUCTIONS: &str = "gen_ai.system_instructions";
    pub const GEN_AI_REQUEST_MODEL: &str = "gen_ai.request.model";
    pub const GEN_AI_RESPONSE_MODEL: &str = "gen_ai.response.model";
    pub const GEN_AI_TEMPERATURE: &str = "gen_ai.request.temperature";
    pub const GEN_AI_MAX_TOKENS: &str = "gen_ai.request.max_tokens";
    pub const GEN_AI_TOP_P: &str = "gen_ai.request.top_p";
    pub const GEN_AI_SEED: &str = "gen_ai.request.seed";
    pub const GEN_AI_PRESENCE_PENALTY: &str = "gen_ai.request.presence_penalty";
    pub const GEN_AI_FREQUENCY_PENALTY: &str = "gen_ai.request.frequency_penalty";
    pub const MODEL_REQUEST_PARAMETERS: &str = "model_request_parameters";
}

/* --- helper functions ----------------------------------------------------------------------- */

///
/// Read a structured attribute.
///
/// Exporters often store lists and objects as JSON-encoded strings; such a
/// string is decoded when it holds an array or object. Other values are
/// returned as stored.
pub(crate) fn structured_attr(attrs: &Map<String, Value>, key: &str) -> Option<Value> {
    let value = attrs.get(key)?;
    if let Value::String(encoded) = value {
        if let Ok(decoded @ (Value::Array(_) | Value::Object(_))) = serde_json::from_str::<Value>(encoded) {
            return Some(decoded);
        }
    }
    Some(value.clone())
}

/// Read a non-empty string attribute.
pub(crate) fn string_attr<'a>(attrs: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
}
