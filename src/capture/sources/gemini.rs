//!
//! Adapter for captured Gemini `generateContent` request bodies.
//!
//! Contents are converted part by part with one correlation state shared by
//! the whole conversation. The model is not part of the body; it is recovered
//! from the captured request URL (`.../models/<model>:generateContent`).
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde_json::{Map, Value};

use crate::capture::detect::system_instruction;
use crate::capture::sources::{SourceAdapter, debug, request_body};
use crate::capture::types::{CanonicalMessage, CanonicalRequest, ModelSettings, Role, SourceFormat};
use crate::capture::{keys, string_attr};
use crate::config::LogLevel;
use crate::converter::{MessageConverter, convert_gemini_tools, join_text_parts};
use crate::error::{ReplayError, Result};

/* --- constants ------------------------------------------------------------------------------ */

/** attributes that may carry the request URL, in lookup order */
const URL_KEYS: [&str; 4] = [keys::URL_FULL, keys::HTTP_URL, keys::URL_PATH, keys::HTTP_TARGET];

/** generationConfig key -> canonical settings key */
const GENERATION_PARAMS: [(&str, &str); 6] = [
    ("temperature", "temperature"),
    ("maxOutputTokens", "max_tokens"),
    ("topP", "top_p"),
    ("seed", "seed"),
    ("presencePenalty", "presence_penalty"),
    ("frequencyPenalty", "frequency_penalty"),
];

/* --- types ----------------------------------------------------------------------------------- */

///
/// Gemini request body adapter.
#[derive(Debug, Clone)]
pub struct GeminiBodyAdapter {
    /** model recorded when the URL has no model segment */
    fallback_model: String,
    log_level: LogLevel,
}

/* --- start of code -------------------------------------------------------------------------- */

impl GeminiBodyAdapter {
    /// Create the adapter.
    pub fn new(fallback_model: String, log_level: LogLevel) -> Self {
        Self { fallback_model, log_level }
    }

    fn convert_contents(&self, body: &Map<String, Value>) -> Result<Vec<CanonicalMessage>> {
        let mut messages = Vec::new();

        if let Some(instruction) = system_instruction(body) {
            let text = match instruction {
                Value::String(text) => text.clone(),
                other => join_text_parts(
                    other.get("parts").and_then(Value::as_array).map_or(&[][..], Vec::as_slice),
                ),
            };
            if !text.is_empty() {
                messages.push(CanonicalMessage::system(text));
            }
        }

        let Some(contents) = body.get("contents").and_then(Value::as_array) else {
            return Ok(messages);
        };

        let mut converter = MessageConverter::new(self.log_level);
        for (index, entry) in contents.iter().enumerate() {
            let role = map_role(entry.get("role").and_then(Value::as_str)).ok_or_else(|| {
                ReplayError::capture(self.format(), format!("contents[{}].role is not supported", index))
            })?;
            let parts = entry.get("parts").and_then(Value::as_array).map_or(&[][..], Vec::as_slice);
            messages.extend(converter.convert(parts, role)?);
        }

        if converter.pending_calls() > 0 {
            debug(self.log_level, &format!("{} tool calls left without a response", converter.pending_calls()));
        }

        Ok(messages)
    }
}

impl SourceAdapter for GeminiBodyAdapter {
    fn format(&self) -> SourceFormat {
        SourceFormat::HttpBodyGemini
    }

    fn to_canonical(&self, attrs: &Map<String, Value>) -> Result<CanonicalRequest> {
        let body = request_body(attrs, self.format())?;

        let messages = self.convert_contents(&body)?;

        let tools = match body.get("tools") {
            Some(Value::Array(groups)) => convert_gemini_tools(groups)?,
            _ => Vec::new(),
        };

        let model_name = URL_KEYS
            .iter()
            .find_map(|key| string_attr(attrs, key))
            .and_then(model_from_path)
            .unwrap_or_else(|| self.fallback_model.clone());

        let params = match body.get("generationConfig").or_else(|| body.get("generation_config")) {
            Some(Value::Object(config)) => extract_generation_params(config)?,
            _ => ModelSettings::default(),
        };

        debug(
            self.log_level,
            &format!(
                "Gemini body: {} messages, {} tools, model {}",
                messages.len(),
                tools.len(),
                model_name
            ),
        );

        Ok(CanonicalRequest { messages, tools, model_name, params })
    }
}

///
/// Extract the model from an endpoint path.
///
/// Takes the path component after a segment named `models`, up to a colon.
/// Query strings are ignored.
///
/// # Examples
/// ```rust
/// use tracereplay::capture::sources::gemini::model_from_path;
///
/// let url = "https://host/v1beta/models/gemini-2.0-flash:generateContent?alt=sse";
/// assert_eq!(model_from_path(url), Some("gemini-2.0-flash".to_string()));
/// ```
pub fn model_from_path(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/');
    segments.find(|segment| *segment == "models")?;
    let model = segments.next()?.split(':').next()?;
    if model.is_empty() { None } else { Some(model.to_string()) }
}

///
/// Map `generationConfig` onto canonical settings.
pub fn extract_generation_params(config: &Map<String, Value>) -> Result<ModelSettings> {
    let mut params = ModelSettings::default();
    for (source, canonical) in GENERATION_PARAMS {
        if let Some(value) = config.get(source).filter(|v| !v.is_null()) {
            params.set(canonical, value)?;
        }
    }
    Ok(params)
}

/* --- helper functions ----------------------------------------------------------------------- */

fn map_role(role: Option<&str>) -> Option<Role> {
    match role {
        Some("model") => Some(Role::Assistant),
        Some("function") | None => Some(Role::User),
        Some(other) => Role::from_label(other),
    }
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_from_path() {
        assert_eq!(
            model_from_path("/v1beta/models/gemini-1.5-pro:streamGenerateContent"),
            Some("gemini-1.5-pro".to_string())
        );
        assert_eq!(
            model_from_path("https://x/v1/projects/p/locations/l/publishers/google/models/gemini-2.0-flash"),
            Some("gemini-2.0-flash".to_string())
        );
        assert_eq!(model_from_path("/v1beta/models/"), None);
        assert_eq!(model_from_path("/v1beta/chat"), None);
    }

    #[test]
    fn test_generation_config_mapping() {
        let config = json!({"temperature": 0.1, "maxOutputTokens": 256, "topP": 0.9, "topK": 40});
        let params = extract_generation_params(config.as_object().unwrap()).unwrap();
        assert_eq!(
            serde_json::to_value(&params).unwrap(),
            json!({"temperature": 0.1, "max_tokens": 256, "top_p": 0.9})
        );
    }

    #[test]
    fn test_missing_url_uses_fallback_model() {
        let attrs = json!({"http.request.body.text": {
            "systemInstruction": {"parts": [{"text": "Be brief."}]},
            "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
        }});
        let adapter = GeminiBodyAdapter::new("gemini-unknown".to_string(), LogLevel::Info);
        let request = adapter.to_canonical(attrs.as_object().unwrap()).unwrap();

        assert_eq!(request.model_name, "gemini-unknown");
        assert_eq!(request.messages[0], CanonicalMessage::system("Be brief."));
        assert_eq!(request.messages[1], CanonicalMessage::user("Hi"));
    }

    #[test]
    fn test_unsupported_role_is_rejected() {
        let attrs = json!({"http.request.body.text": {
            "contents": [{"role": "narrator", "parts": [{"text": "Once"}]}]
        }});
        let adapter = GeminiBodyAdapter::new("gemini-unknown".to_string(), LogLevel::Info);
        let err = adapter.to_canonical(attrs.as_object().unwrap()).unwrap_err();
        assert!(err.to_string().contains("contents[0].role"));
    }
}
