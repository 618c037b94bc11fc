//!
//! Replay override resolution.
//!
//! Each replayable field is resolved independently with the precedence
//! request override > stored capture value > owning-agent default. Values
//! replace each other wholesale; tools and settings are never merged.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde::{Deserialize, Serialize};

use crate::capture::{CanonicalMessage, ModelSettings, ParsedCapture, ToolDefinition};
use crate::error::{ReplayError, Result};
use crate::replay::messages::build_replay_messages;

/* --- types ----------------------------------------------------------------------------------- */

///
/// Caller-supplied replacements for stored capture fields.
///
/// Empty strings and empty tool lists count as absent. A present
/// `model_settings` always wins, even when it sets nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayOverrides {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_user_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_settings: Option<ModelSettings>,
}

///
/// Defaults of the agent that owns a capture.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentDefaults {
    pub default_model_name: Option<String>,
    pub default_system_prompt: Option<String>,
    pub default_model_settings: Option<ModelSettings>,
}

///
/// Fully resolved inputs of one replay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayPlan {
    pub model_name: String,
    pub system_prompt: String,
    pub user_message: String,
    pub middle_messages: Vec<CanonicalMessage>,
    pub tools: Option<Vec<ToolDefinition>>,
    pub model_settings: Option<ModelSettings>,
}

///
/// What a stored capture would replay, without running it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPreview {
    pub model_name: String,
    pub system_prompt: String,
    pub user_message: String,
    pub has_tools: bool,
    pub tools_count: usize,
    pub other_messages_count: usize,
}

/* --- start of code -------------------------------------------------------------------------- */

impl ReplayPlan {
    ///
    /// Resolve overrides against a stored capture and agent defaults.
    ///
    /// # Arguments
    ///  * `capture` - stored split
    ///  * `overrides` - caller replacements
    ///  * `defaults` - owning-agent defaults
    ///
    /// # Returns
    ///  * the resolved plan
    ///  * `ReplayError::Replay` if no model name could be resolved
    pub fn resolve(capture: &ParsedCapture, overrides: &ReplayOverrides, defaults: &AgentDefaults) -> Result<Self> {
        let model_name = first_non_empty([
            overrides.model_name.as_deref(),
            Some(capture.model_name.as_str()),
            defaults.default_model_name.as_deref(),
        ])
        .ok_or_else(|| ReplayError::Replay("No model name specified".to_string()))?;

        let system_prompt = first_non_empty([
            overrides.system_prompt.as_deref(),
            Some(capture.system_prompt.as_str()),
            defaults.default_system_prompt.as_deref(),
        ])
        .unwrap_or_default();

        let user_message =
            first_non_empty([overrides.last_user_message.as_deref(), Some(capture.last_user_message.as_str())])
                .unwrap_or_default();

        let tools = overrides
            .tools
            .as_ref()
            .filter(|t| !t.is_empty())
            .or(capture.tools.as_ref().filter(|t| !t.is_empty()))
            .cloned();

        let model_settings = overrides
            .model_settings
            .as_ref()
            .or(capture.model_settings.as_ref())
            .or(defaults.default_model_settings.as_ref())
            .cloned();

        Ok(Self {
            model_name: model_name.to_string(),
            system_prompt: system_prompt.to_string(),
            user_message: user_message.to_string(),
            middle_messages: capture.middle_messages.clone(),
            tools,
            model_settings,
        })
    }

    /// Outbound message list for this plan.
    pub fn messages(&self) -> Vec<CanonicalMessage> {
        build_replay_messages(&self.system_prompt, &self.middle_messages, &self.user_message)
    }

    /// Resolved tools, empty when none.
    pub fn tools(&self) -> &[ToolDefinition] {
        self.tools.as_deref().unwrap_or_default()
    }
}

impl ExecutionPreview {
    /// Summarize a stored capture.
    pub fn from_capture(capture: &ParsedCapture) -> Self {
        let tools_count = capture.tools.as_ref().map_or(0, Vec::len);
        Self {
            model_name: capture.model_name.clone(),
            system_prompt: capture.system_prompt.clone(),
            user_message: capture.last_user_message.clone(),
            has_tools: tools_count > 0,
            tools_count,
            other_messages_count: capture.middle_messages.len(),
        }
    }
}

/* --- helper functions ----------------------------------------------------------------------- */

fn first_non_empty<'a, const N: usize>(candidates: [Option<&'a str>; N]) -> Option<&'a str> {
    candidates.into_iter().flatten().find(|value| !value.is_empty())
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    fn capture() -> ParsedCapture {
        ParsedCapture {
            middle_messages: vec![CanonicalMessage::user("hi")],
            tools: None,
            model_name: "stored-model".to_string(),
            model_settings: None,
            system_prompt: String::new(),
            last_user_message: "bye".to_string(),
        }
    }

    #[test]
    fn test_empty_override_falls_through() {
        let overrides = ReplayOverrides { model_name: Some(String::new()), ..Default::default() };
        let plan = ReplayPlan::resolve(&capture(), &overrides, &AgentDefaults::default()).unwrap();
        assert_eq!(plan.model_name, "stored-model");
    }

    #[test]
    fn test_agent_default_system_prompt() {
        let defaults = AgentDefaults { default_system_prompt: Some("agent".into()), ..Default::default() };
        let plan = ReplayPlan::resolve(&capture(), &ReplayOverrides::default(), &defaults).unwrap();
        assert_eq!(plan.system_prompt, "agent");
        assert_eq!(plan.messages().len(), 3);
    }

    #[test]
    fn test_missing_model_is_replay_error() {
        let mut stored = capture();
        stored.model_name.clear();
        let err = ReplayPlan::resolve(&stored, &ReplayOverrides::default(), &AgentDefaults::default()).unwrap_err();
        assert!(matches!(err, ReplayError::Replay(_)));
    }

    #[test]
    fn test_preview() {
        let preview = ExecutionPreview::from_capture(&capture());
        assert!(!preview.has_tools);
        assert_eq!(preview.tools_count, 0);
        assert_eq!(preview.other_messages_count, 1);
        assert_eq!(preview.user_message, "bye");
    }
}
