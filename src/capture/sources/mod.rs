//!
//! Source adapters: one per capture format.
//!
//! Every adapter turns a validated attribute map into the same
//! format-independent `CanonicalRequest`. The adapter is selected once from the
//! detected format; no conversion code branches on format tags afterwards.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- modules --------------------------------------------------------------------------------- */

pub mod gemini;
pub mod openai;
pub mod telemetry;

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::types::{CanonicalRequest, SourceFormat};
use crate::config::{LogLevel, ParserConfig};
use crate::error::{ReplayError, Result};

pub use gemini::GeminiBodyAdapter;
pub use openai::OpenAiBodyAdapter;
pub use telemetry::TelemetryAdapter;

/* --- adapter trait --------------------------------------------------------------------------- */

///
/// Trait that every capture source adapter must implement.
pub trait SourceAdapter: std::fmt::Debug + Send + Sync {
    ///
    /// Format this adapter understands.
    fn format(&self) -> SourceFormat;

    ///
    /// Convert a validated attribute map into canonical messages, tools, model and params.
    ///
    /// Each call uses its own correlation state; adapters hold no per-capture state.
    fn to_canonical(&self, attrs: &Map<String, Value>) -> Result<CanonicalRequest>;
}

/* --- adapter selection ----------------------------------------------------------------------- */

///
/// Adapter chosen for a detected format.
#[derive(Debug, Clone)]
pub enum CaptureSource {
    OpenAiBody(OpenAiBodyAdapter),
    GeminiBody(GeminiBodyAdapter),
    Telemetry(TelemetryAdapter),
}

impl CaptureSource {
    ///
    /// Select the adapter for a detected format.
    ///
    /// # Arguments
    ///  * `format` - detected format
    ///  * `config` - parser configuration
    ///  * `log_level` - step-level logging switch
    ///
    /// # Returns
    ///  * the adapter
    ///  * `ReplayError::InvalidCapture` for `SourceFormat::Unknown`
    pub fn for_format(format: SourceFormat, config: &ParserConfig, log_level: LogLevel) -> Result<Self> {
        match format {
            SourceFormat::HttpBodyOpenai => Ok(Self::OpenAiBody(OpenAiBodyAdapter::new(log_level))),
            SourceFormat::HttpBodyGemini => Ok(Self::GeminiBody(GeminiBodyAdapter::new(
                config.gemini_fallback_model.clone(),
                log_level,
            ))),
            SourceFormat::PydanticAi => Ok(Self::Telemetry(TelemetryAdapter::new(log_level))),
            SourceFormat::Unknown => {
                Err(ReplayError::InvalidCapture("no adapter for unknown capture format".to_string()))
            }
        }
    }
}

impl SourceAdapter for CaptureSource {
    fn format(&self) -> SourceFormat {
        match self {
            Self::OpenAiBody(a) => a.format(),
            Self::GeminiBody(a) => a.format(),
            Self::Telemetry(a) => a.format(),
        }
    }

    fn to_canonical(&self, attrs: &Map<String, Value>) -> Result<CanonicalRequest> {
        match self {
            Self::OpenAiBody(a) => a.to_canonical(attrs),
            Self::GeminiBody(a) => a.to_canonical(attrs),
            Self::Telemetry(a) => a.to_canonical(attrs),
        }
    }
}

/* --- shared helpers -------------------------------------------------------------------------- */

/// The captured HTTP request body as an object.
pub(crate) fn request_body(attrs: &Map<String, Value>, format: SourceFormat) -> Result<Map<String, Value>> {
    match crate::capture::structured_attr(attrs, crate::capture::keys::HTTP_REQUEST_BODY) {
        Some(Value::Object(body)) => Ok(body),
        _ => Err(ReplayError::capture(format, "request body is not an object")),
    }
}

/// Emit a step-level debug line when the configured level asks for it.
pub(crate) fn debug(log_level: LogLevel, msg: &str) {
    if log_level.is_trace_enabled() {
        tracing::debug!("[TRACE] {}", msg);
    }
}
