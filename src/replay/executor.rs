//!
//! Replay execution against an external model.
//!
//! The model itself is a capability behind `ModelInvoker`: given a model
//! identifier, messages, tools and settings it returns a `ModelResponse`.
//! The executor resolves the plan, builds the request, calls the invoker under
//! the configured timeout and records the outcome. A failed or timed-out call
//! is a `failed` record, not an error; only an unbuildable request is an error.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::capture::{CanonicalMessage, ModelSettings, ParsedCapture, ToolDefinition};
use crate::config::ReplayConfig;
use crate::error::{ReplayError, Result};
use crate::replay::plan::{AgentDefaults, ReplayOverrides, ReplayPlan};
use crate::replay::response::{ModelResponse, ResponseMetadata, format_response};
use crate::replay::tools::{ActiveToolParameters, activate_tools};

/* --- types ----------------------------------------------------------------------------------- */

///
/// Request handed to the model invocation capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundRequest {
    pub model_name: String,
    pub messages: Vec<CanonicalMessage>,
    pub tool_parameters: Option<ActiveToolParameters>,
    pub model_settings: Option<ModelSettings>,
}

///
/// Trait implemented by whatever actually calls a model.
#[async_trait]
pub trait ModelInvoker: Send + Sync {
    ///
    /// Send one request and return the model's response parts.
    async fn invoke(&self, request: &OutboundRequest) -> Result<ModelResponse>;
}

///
/// Outcome of a replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    Success,
    Failed,
}

///
/// Record of one replay, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub status: ExecutionStatus,
    /** resolved inputs */
    pub model_name: String,
    pub system_prompt: String,
    pub user_message: String,
    pub tools: Option<Vec<ToolDefinition>>,
    pub model_settings: Option<ModelSettings>,
    /** formatted response, set on success */
    pub llm_response: Option<String>,
    pub response_metadata: Option<ResponseMetadata>,
    /** failure description, set on failure */
    pub error_message: Option<String>,
    pub response_time_ms: u64,
    pub executed_at: DateTime<Utc>,
}

///
/// Replays stored captures through a model invoker.
pub struct ReplayExecutor {
    invoker: Arc<dyn ModelInvoker>,
    timeout: Duration,
    defaults: AgentDefaults,
}

/* --- start of code -------------------------------------------------------------------------- */

impl ReplayExecutor {
    ///
    /// Create an executor.
    ///
    /// # Arguments
    ///  * `invoker` - model invocation capability
    ///  * `config` - replay configuration (request timeout)
    pub fn new(invoker: Arc<dyn ModelInvoker>, config: &ReplayConfig) -> Self {
        Self {
            invoker,
            timeout: Duration::from_millis(config.request_timeout_ms),
            defaults: AgentDefaults::default(),
        }
    }

    /// Use the given owning-agent defaults.
    pub fn with_agent_defaults(mut self, defaults: AgentDefaults) -> Self {
        self.defaults = defaults;
        self
    }

    ///
    /// Build the outbound request for a capture without sending it.
    ///
    /// # Returns
    ///  * resolved plan and request
    ///  * `ReplayError::Replay` if no model resolves or there is nothing to send
    pub fn prepare(&self, capture: &ParsedCapture, overrides: &ReplayOverrides) -> Result<(ReplayPlan, OutboundRequest)> {
        let plan = ReplayPlan::resolve(capture, overrides, &self.defaults)?;

        let messages = plan.messages();
        if messages.is_empty() {
            return Err(ReplayError::Replay("No messages to send to model".to_string()));
        }

        let request = OutboundRequest {
            model_name: plan.model_name.clone(),
            messages,
            tool_parameters: activate_tools(plan.tools()),
            model_settings: plan.model_settings.clone(),
        };
        Ok((plan, request))
    }

    ///
    /// Replay a stored capture.
    ///
    /// # Arguments
    ///  * `capture` - stored split
    ///  * `overrides` - caller replacements
    ///
    /// # Returns
    ///  * execution record, `failed` when the model call failed or timed out
    ///  * `ReplayError::Replay` if the request cannot be built
    pub async fn execute(&self, capture: &ParsedCapture, overrides: &ReplayOverrides) -> Result<ExecutionRecord> {
        let (plan, request) = self.prepare(capture, overrides)?;
        tracing::info!("Replaying capture with model: {}", plan.model_name);
        tracing::debug!("Total replay messages: {}", request.messages.len());

        let started = Instant::now();
        let outcome = match tokio::time::timeout(self.timeout, self.invoker.invoke(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ReplayError::Invocation(format!(
                "model call timed out after {}ms",
                self.timeout.as_millis()
            ))),
        };
        let response_time_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);

        let mut record = ExecutionRecord {
            status: ExecutionStatus::Success,
            model_name: plan.model_name,
            system_prompt: plan.system_prompt,
            user_message: plan.user_message,
            tools: plan.tools,
            model_settings: plan.model_settings,
            llm_response: None,
            response_metadata: None,
            error_message: None,
            response_time_ms,
            executed_at: Utc::now(),
        };

        match outcome {
            Ok(response) => {
                let metadata = ResponseMetadata::from_response(&response);
                let tool_names = response.tool_names();
                tracing::info!(
                    "Replay completed - Text length: {}, Tool calls: {}",
                    metadata.content_length,
                    tool_names.len()
                );
                if !tool_names.is_empty() {
                    tracing::info!("Tools called: {}", tool_names.join(", "));
                }
                record.llm_response = Some(format_response(&response));
                record.response_metadata = Some(metadata);
            }
            Err(e) => {
                tracing::error!("Replay failed: {}", e);
                record.status = ExecutionStatus::Failed;
                record.error_message = Some(e.to_string());
            }
        }

        Ok(record)
    }
}

impl ExecutionRecord {
    /// Whether the model call succeeded.
    pub fn is_success(&self) -> bool {
        self.status == ExecutionStatus::Success
    }
}
