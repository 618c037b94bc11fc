//! # TraceReplay - captured LLM request normalization and replay
//!
//! This crate ingests LLM requests recorded by tracing pipelines, reduces the
//! three known wire shapes (OpenAI request bodies, Gemini request bodies and
//! generation telemetry) to one canonical message form, and rebuilds replay
//! requests from that form with caller overrides applied.
//!
//! ## Library Usage
//!
//! ```rust
//! use serde_json::json;
//! use tracereplay::{build_replay_messages, parse_capture};
//!
//! let raw = json!({"attributes": {"http.request.body.text": {
//!     "model": "gpt-4o-mini",
//!     "messages": [
//!         {"role": "system", "content": "Be terse."},
//!         {"role": "user", "content": "Hi"}
//!     ]
//! }}});
//!
//! let capture = parse_capture(&raw).unwrap();
//! assert_eq!(capture.system_prompt, "Be terse.");
//!
//! let messages = build_replay_messages("Be kind.", &capture.middle_messages, "Hello again");
//! assert_eq!(messages.len(), 2);
//! ```
//!
//! ## Modules
//!
//! - [`capture`] - format detection, source adapters and the canonical parser
//! - [`converter`] - schema, tool and part-list converters
//! - [`replay`] - override resolution, message reconstruction, execution and response rendering
//! - [`evaluation`] - judge prompt construction and verdict normalization
//! - [`config`] - layered configuration management
//! - [`error`] - error types and handling
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

pub mod capture;
pub mod config;
pub mod converter;
pub mod error;
pub mod evaluation;
pub mod replay;

// Re-export commonly used types
pub use capture::{
    CanonicalMessage, CaptureParser, ModelSettings, ParsedCapture, Role, SourceFormat, ToolCallRef,
    ToolDefinition, parse_capture,
};
pub use config::{Config, LogLevel, ValidationIssue, ValidationSeverity};
pub use error::{ReplayError, Result};
pub use evaluation::{EvaluationRequest, EvaluationResult, Evaluator, Judge, JudgeVerdict};
pub use replay::{
    AgentDefaults, ExecutionPreview, ExecutionRecord, ModelInvoker, ModelResponse, ReplayExecutor,
    ReplayOverrides, ReplayPlan, ResponsePart, build_replay_messages, format_response,
};
