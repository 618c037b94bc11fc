//!
//! Configuration management for TraceReplay.
//!
//! This module provides the layered configuration used by the inspection binary
//! and by embedders that want the same defaults:
//! - Platform-native configuration directories (XDG on Linux, standard paths on macOS/Windows)
//! - TOML format for human-readable configuration files
//! - Multi-layered hierarchy (env vars > explicit file > user config > system config > defaults)
//!
//! Submodules:
//! - `loader.rs` - Configuration loading logic
//! - `paths.rs` - Platform-native path resolution
//! - `validation.rs` - Configuration validation
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- modules --------------------------------------------------------------------------------- */

pub mod loader;
pub mod paths;
pub mod validation;

/* --- uses ------------------------------------------------------------------------------------ */

use crate::capture::ModelSettings;
use crate::error::{ReplayError, Result};
use crate::replay::AgentDefaults;
use serde::{Deserialize, Serialize};

pub use validation::{ValidationIssue, ValidationSeverity};

/* --- types ----------------------------------------------------------------------------------- */

///
/// Main application configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Capture parser configuration
    #[serde(default)]
    pub parser: ParserConfig,
    /// Replay execution configuration
    #[serde(default)]
    pub replay: ReplayConfig,
    /// Owning-agent defaults used when neither an override nor the stored capture supplies a value
    #[serde(default)]
    pub agent: AgentConfig,
    /// Evaluation judge configuration
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

///
/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Application logging level
    #[serde(default = "default_log_level")]
    pub level: LogLevel,
}

///
/// Capture parser configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParserConfig {
    /// Model name used when a Gemini capture carries no model segment in its URL
    #[serde(default = "default_gemini_fallback_model")]
    pub gemini_fallback_model: String,
}

///
/// Replay execution configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Timeout for a single outbound model call (in milliseconds)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_ms: u64,
}

///
/// Owning-agent defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Model used when neither the request nor the capture names one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_name: Option<String>,
    /// System prompt used when neither the request nor the capture supplies one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_system_prompt: Option<String>,
    /// Generation settings used when neither the request nor the capture supplies them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_model_settings: Option<ModelSettings>,
}

///
/// Evaluation judge configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Model identifier handed to the judge
    #[serde(default = "default_evaluation_model")]
    pub model_name: String,
}

///
/// Logging level enumeration.
///
/// Defines available log levels compatible with tracing crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

/* --- defaults -------------------------------------------------------------------------------- */

/// Default logging level
fn default_log_level() -> LogLevel {
    LogLevel::Info
}

/// Default Gemini fallback model name
fn default_gemini_fallback_model() -> String {
    "gemini-unknown".to_string()
}

/// Default outbound request timeout (2 minutes)
fn default_request_timeout() -> u64 {
    120_000
}

/// Default evaluation model
fn default_evaluation_model() -> String {
    "openai:gpt-4o-mini".to_string()
}

/* --- implementations --------------------------------------------------------------------- */

impl Default for Config {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            parser: ParserConfig::default(),
            replay: ReplayConfig::default(),
            agent: AgentConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: default_log_level() }
    }
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self { gemini_fallback_model: default_gemini_fallback_model() }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self { request_timeout_ms: default_request_timeout() }
    }
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self { model_name: default_evaluation_model() }
    }
}

impl Config {
    /// Load configuration from the standard hierarchy:
    /// 1. Environment variables (highest priority)
    /// 2. User config file (~/.config/tracereplay/config.toml)
    /// 3. System config file (/etc/tracereplay/config.toml)
    /// 4. Built-in defaults (lowest priority)
    ///
    /// # Returns
    /// * `Ok(Config)` - Successfully loaded and validated configuration
    /// * `Err(ReplayError)` - Configuration loading or validation failed
    pub fn load() -> Result<Self> {
        loader::ConfigLoader::new()
            .with_defaults()
            .with_system_config()?
            .with_user_config()?
            .with_env_vars()?
            .build()
    }

    /// Validate the current configuration, failing on the first batch of errors.
    pub fn validate(&self) -> Result<()> {
        validation::ConfigValidator::new(self).validate()
    }

    /// Collect every validation issue without failing.
    pub fn issues(&self) -> Vec<ValidationIssue> {
        validation::ConfigValidator::new(self).issues()
    }

    /// Owning-agent defaults in the shape the replay planner expects.
    pub fn agent_defaults(&self) -> AgentDefaults {
        AgentDefaults {
            default_model_name: self.agent.default_model_name.clone(),
            default_system_prompt: self.agent.default_system_prompt.clone(),
            default_model_settings: self.agent.default_model_settings.clone(),
        }
    }

    /// Get configuration file example as TOML string
    pub fn example_toml() -> &'static str {
        r#"# TraceReplay Configuration
# This file should be placed at:
#   Linux/Unix: ~/.config/tracereplay/config.toml
#   macOS: ~/Library/Application Support/tracereplay/config.toml
#   Windows: %APPDATA%/tracereplay/config.toml

[logging]
# Logging level: trace, debug, info, warn, error (default: info)
level = "info"

[parser]
# Model name recorded for Gemini captures whose URL carries no model segment
gemini_fallback_model = "gemini-unknown"

[replay]
# Timeout for a single outbound model call in milliseconds (default: 120000)
request_timeout_ms = 120000

[agent]
# Defaults applied when neither the replay request nor the capture supplies a value
# default_model_name = "openai:gpt-4o-mini"
# default_system_prompt = "You are a helpful assistant."

# [agent.default_model_settings]
# temperature = 0.2
# max_tokens = 1024

[evaluation]
# Model identifier used by the evaluation judge
model_name = "openai:gpt-4o-mini"
"#
    }
}

impl LogLevel {
    /// Convert to tracing::Level for logging setup
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }

    /// Check if step-level converter logging is enabled
    pub fn is_trace_enabled(self) -> bool {
        matches!(self, LogLevel::Trace | LogLevel::Debug)
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(ReplayError::Config(format!(
                "Invalid log level '{}'. Valid levels are: trace, debug, info, warn, error",
                s
            ))),
        }
    }
}

impl Default for LogLevel {
    fn default() -> Self {
        default_log_level()
    }
}
