//!
//! Judging replayed responses against acceptance criteria.
//!
//! The judge itself is an external model behind the `Judge` trait. This module
//! builds the judge prompt, short-circuits responses that cannot be judged and
//! normalizes the verdict into an `EvaluationResult`.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::config::EvaluationConfig;
use crate::error::Result;

/* --- constants ------------------------------------------------------------------------------ */

/** system prompt for the judge model */
pub const JUDGE_SYSTEM_PROMPT: &str = "You are an impartial judge that evaluates whether an AI assistant's response satisfies
explicit acceptance criteria. Follow these principles:

1. The acceptance criteria (if provided) are the source of truth. Every critical requirement
   must be satisfied. Missing or contradicting information means failure.
2. The reference response is optional guidance for tone or structure. Do not require exact
   wording if the acceptance criteria are satisfied.
3. If no acceptance criteria exist, infer them from the reference response when reasonable
   and focus on factual accuracy and usefulness.
4. Respond succinctly, referencing concrete issues.";

const NO_CRITERIA: &str = "No explicit criteria were provided. Derive expectations from the reference response if available and ensure factual correctness.";
const NO_REFERENCE: &str = "Not provided. Focus on the acceptance criteria above.";
const INSTRUCTION: &str = "Determine if the actual response satisfies the acceptance criteria. \
If any critical requirement is missing or incorrect, mark it as failed. \
Respond concisely with your judgement.";

const MISSING_RESPONSE_FEEDBACK: &str = "No LLM response was produced to evaluate.";
const EMPTY_FEEDBACK: &str = "Evaluation completed without additional feedback.";

/* --- types ----------------------------------------------------------------------------------- */

///
/// Inputs of one evaluation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    pub test_case_name: Option<String>,
    /** acceptance criteria */
    pub expectation: Option<String>,
    pub reference_response: Option<String>,
    /** formatted response of the replay under evaluation */
    pub actual_response: Option<String>,
}

///
/// Structured verdict returned by the judge.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JudgeVerdict {
    pub passed: bool,
    pub feedback: String,
    #[serde(default)]
    pub satisfied_criteria: Vec<String>,
    #[serde(default)]
    pub missing_criteria: Vec<String>,
}

///
/// Normalized evaluation outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub passed: bool,
    pub feedback: String,
    /** judge model identifier */
    pub model_name: String,
    /** verdict payload, or the reason the judge was not consulted */
    pub metadata: Map<String, Value>,
}

///
/// Trait implemented by whatever runs the judge model.
#[async_trait]
pub trait Judge: Send + Sync {
    ///
    /// Ask the judge model for a verdict.
    async fn judge(&self, model_name: &str, system_prompt: &str, prompt: &str) -> Result<JudgeVerdict>;
}

///
/// Evaluation coordinator.
pub struct Evaluator {
    judge: Arc<dyn Judge>,
    model_name: String,
}

/* --- start of code -------------------------------------------------------------------------- */

impl EvaluationRequest {
    ///
    /// Build the judge prompt.
    ///
    /// Sections are joined by a blank line: test case name (when given),
    /// acceptance criteria or a derive-them notice, reference response or a
    /// not-provided notice, the actual response, and the closing instruction.
    pub fn build_prompt(&self) -> String {
        let mut sections = Vec::with_capacity(5);

        if let Some(name) = non_blank(&self.test_case_name) {
            sections.push(section("Test Case Name", name));
        }
        sections.push(section("Acceptance Criteria", non_blank(&self.expectation).unwrap_or(NO_CRITERIA)));
        sections.push(section(
            "Reference Response (if helpful)",
            non_blank(&self.reference_response).unwrap_or(NO_REFERENCE),
        ));
        sections.push(section("Actual Response to Evaluate", non_blank(&self.actual_response).unwrap_or_default()));
        sections.push(INSTRUCTION.to_string());

        sections.join("\n\n")
    }
}

impl Evaluator {
    ///
    /// Create an evaluator.
    ///
    /// # Arguments
    ///  * `judge` - judge model capability
    ///  * `config` - evaluation configuration (judge model)
    pub fn new(judge: Arc<dyn Judge>, config: &EvaluationConfig) -> Self {
        Self { judge, model_name: config.model_name.clone() }
    }

    ///
    /// Evaluate a replayed response.
    ///
    /// Never fails: a missing response or a judge error becomes a failed result.
    pub async fn evaluate(&self, request: &EvaluationRequest) -> EvaluationResult {
        if non_blank(&request.actual_response).is_none() {
            return self.result(false, MISSING_RESPONSE_FEEDBACK.to_string(), json!({"reason": "missing_response"}));
        }

        let prompt = request.build_prompt();
        match self.judge.judge(&self.model_name, JUDGE_SYSTEM_PROMPT, &prompt).await {
            Ok(verdict) => {
                let feedback = match verdict.feedback.trim() {
                    "" => EMPTY_FEEDBACK.to_string(),
                    trimmed => trimmed.to_string(),
                };
                let metadata = serde_json::to_value(&verdict).unwrap_or_else(|_| json!({}));
                self.result(verdict.passed, feedback, metadata)
            }
            Err(e) => {
                tracing::warn!("Evaluation judge failed: {}", e);
                self.result(false, format!("Evaluation failed due to error: {}", e), json!({"error": e.to_string()}))
            }
        }
    }

    fn result(&self, passed: bool, feedback: String, metadata: Value) -> EvaluationResult {
        let metadata = match metadata {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        EvaluationResult { passed, feedback, model_name: self.model_name.clone(), metadata }
    }
}

/* --- helper functions ----------------------------------------------------------------------- */

fn section(title: &str, body: &str) -> String {
    format!("{}:\n\n{}\n", title, body)
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
