//!
//! Configuration validation for TraceReplay.
//!
//! Collects every problem with a configuration as a `ValidationIssue` so the
//! CLI can report all of them at once; `validate()` fails only on errors.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use crate::capture::is_valid_model_name;
use crate::config::{Config, LogLevel};
use crate::error::{ReplayError, Result};

/* --- constants ------------------------------------------------------------------------------ */

/** request timeouts above this many milliseconds earn a warning */
const LONG_TIMEOUT_MS: u64 = 10 * 60 * 1000;

/* --- types ----------------------------------------------------------------------------------- */

///
/// Configuration validation issue.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationIssue {
    /// Configuration field name
    pub field: String,
    /// Severity of the issue
    pub severity: ValidationSeverity,
    /// Description of the issue
    pub message: String,
    /// Optional suggestion for fixing the issue
    pub suggestion: Option<String>,
}

///
/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationSeverity {
    /// Error - configuration is invalid and will cause failures
    Error,
    /// Warning - configuration may work but has potential issues
    Warning,
    /// Info - informational note about configuration
    Info,
}

///
/// Configuration validator.
pub struct ConfigValidator<'a> {
    /// Configuration to validate
    config: &'a Config,
    /// Issues collected during validation
    issues: Vec<ValidationIssue>,
}

/* --- implementations --------------------------------------------------------------------- */

impl<'a> ConfigValidator<'a> {
    /// Create a new configuration validator
    pub fn new(config: &'a Config) -> Self {
        Self { config, issues: Vec::new() }
    }

    /// Run every check and return all issues found.
    pub fn issues(mut self) -> Vec<ValidationIssue> {
        self.run_checks();
        self.issues
    }

    /// Run every check and fail if any error-level issue was found.
    ///
    /// Warnings are logged and do not fail validation.
    pub fn validate(self) -> Result<()> {
        let issues = self.issues();

        for issue in issues.iter().filter(|i| i.severity == ValidationSeverity::Warning) {
            tracing::warn!("Configuration warning: {}: {}", issue.field, issue.message);
        }

        let errors: Vec<&ValidationIssue> =
            issues.iter().filter(|i| i.severity == ValidationSeverity::Error).collect();

        if !errors.is_empty() {
            let error_msg = format!(
                "Configuration validation failed with {} error(s):\n\n{}",
                errors.len(),
                errors
                    .iter()
                    .enumerate()
                    .map(|(i, e)| format!("{}. {}: {}", i + 1, e.field, e.message))
                    .collect::<Vec<_>>()
                    .join("\n")
            );
            return Err(ReplayError::Config(error_msg));
        }

        tracing::debug!("Configuration validation passed");
        Ok(())
    }

    /* --- private validation methods ------------------------------------------------------ */

    fn run_checks(&mut self) {
        self.validate_logging_config();
        self.validate_parser_config();
        self.validate_replay_config();
        self.validate_agent_config();
        self.validate_evaluation_config();
    }

    fn validate_logging_config(&mut self) {
        if self.config.logging.level == LogLevel::Trace {
            self.add(
                "logging.level",
                ValidationSeverity::Info,
                "Trace log level enabled: capture contents may appear in logs".to_string(),
                None,
            );
        }
    }

    fn validate_parser_config(&mut self) {
        if self.config.parser.gemini_fallback_model.trim().is_empty() {
            self.add(
                "parser.gemini_fallback_model",
                ValidationSeverity::Error,
                "Gemini fallback model name cannot be empty".to_string(),
                Some("Leave the key unset to use \"gemini-unknown\"".to_string()),
            );
        }
    }

    fn validate_replay_config(&mut self) {
        let timeout = self.config.replay.request_timeout_ms;

        if timeout == 0 {
            self.add(
                "replay.request_timeout_ms",
                ValidationSeverity::Error,
                "Request timeout cannot be zero".to_string(),
                Some("Use a value such as 120000 (two minutes)".to_string()),
            );
        } else if timeout > LONG_TIMEOUT_MS {
            self.add(
                "replay.request_timeout_ms",
                ValidationSeverity::Warning,
                format!("Long request timeout ({}ms) may stall replays", timeout),
                None,
            );
        }
    }

    fn validate_agent_config(&mut self) {
        if let Some(model) = &self.config.agent.default_model_name {
            if !is_valid_model_name(model) {
                self.add(
                    "agent.default_model_name",
                    ValidationSeverity::Error,
                    "Agent default model name is blank".to_string(),
                    Some("Remove the key or set a model such as \"openai:gpt-4o-mini\"".to_string()),
                );
            }
        }
    }

    fn validate_evaluation_config(&mut self) {
        if !is_valid_model_name(&self.config.evaluation.model_name) {
            self.add(
                "evaluation.model_name",
                ValidationSeverity::Warning,
                "Evaluation model name is blank; evaluations will fail".to_string(),
                None,
            );
        }
    }

    fn add(
        &mut self,
        field: &str,
        severity: ValidationSeverity,
        message: String,
        suggestion: Option<String>,
    ) {
        tracing::debug!("Validation {:?}: {}: {}", severity, field, message);
        self.issues.push(ValidationIssue { field: field.to_string(), severity, message, suggestion });
    }
}

/* --- tests ------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_passes_validation() {
        let config = Config::default();
        assert!(ConfigValidator::new(&config).validate().is_ok());
        assert!(ConfigValidator::new(&config).issues().is_empty());
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let mut config = Config::default();
        config.replay.request_timeout_ms = 0;

        let result = ConfigValidator::new(&config).validate();
        let error_msg = format!("{}", result.err().expect("zero timeout must fail"));
        assert!(error_msg.contains("Request timeout cannot be zero"));
    }

    #[test]
    fn test_long_timeout_is_warning_only() {
        let mut config = Config::default();
        config.replay.request_timeout_ms = LONG_TIMEOUT_MS + 1;

        let issues = ConfigValidator::new(&config).issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].severity, ValidationSeverity::Warning);
        assert!(ConfigValidator::new(&config).validate().is_ok());
    }

    #[test]
    fn test_blank_agent_model_fails_validation() {
        let mut config = Config::default();
        config.agent.default_model_name = Some("   ".to_string());

        let issues = ConfigValidator::new(&config).issues();
        assert!(issues.iter().any(|i| i.field == "agent.default_model_name"
            && i.severity == ValidationSeverity::Error));
    }

    #[test]
    fn test_empty_fallback_model_fails_validation() {
        let mut config = Config::default();
        config.parser.gemini_fallback_model = String::new();

        assert!(ConfigValidator::new(&config).validate().is_err());
    }
}
