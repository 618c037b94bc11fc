//! Configuration module tests
//!
//! Tests for configuration loading from files and environment variables, the
//! example file, and the mapping onto replay defaults.
//!
//! Uses temp-env to safely manage environment variables during tests, automatically
//! restoring them after each test completes.

use std::fs;

use tempfile::TempDir;
use temp_env::with_vars;
use tracereplay::capture::CaptureParser;
use tracereplay::config::loader::ConfigLoader;
use tracereplay::config::{Config, LogLevel};

/// Test that the example configuration parses and matches the defaults
#[test]
fn test_example_toml_matches_defaults() {
    let config: Config = toml::from_str(Config::example_toml()).expect("example config should parse");
    assert_eq!(config, Config::default());
    assert!(config.validate().is_ok());
}

/// Test that an empty file yields the defaults for every section
#[test]
fn test_empty_file_uses_defaults() {
    let config: Config = toml::from_str("").expect("empty config should parse");
    assert_eq!(config.parser.gemini_fallback_model, "gemini-unknown");
    assert_eq!(config.replay.request_timeout_ms, 120_000);
    assert_eq!(config.evaluation.model_name, "openai:gpt-4o-mini");
    assert_eq!(config.logging.level, LogLevel::Info);
}

/// Test that agent settings from a file become replay defaults
#[test]
fn test_agent_defaults_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("replay.toml");
    fs::write(
        &config_file,
        r#"
[agent]
default_model_name = "openai:gpt-4o"
default_system_prompt = "You are a replay agent."

[agent.default_model_settings]
temperature = 0.1
seed = 42
"#,
    )
    .unwrap();

    let config = ConfigLoader::new()
        .with_defaults()
        .with_config_file(&config_file)
        .expect("Should load config file")
        .build()
        .expect("Should build config");

    let defaults = config.agent_defaults();
    assert_eq!(defaults.default_model_name.as_deref(), Some("openai:gpt-4o"));
    assert_eq!(defaults.default_system_prompt.as_deref(), Some("You are a replay agent."));
    let settings = defaults.default_model_settings.expect("settings should be set");
    assert_eq!(settings.temperature, Some(0.1));
    assert_eq!(settings.seed, Some(42));
    assert_eq!(settings.max_tokens, None);
}

/// Test that a missing explicit file is an error
#[test]
fn test_missing_config_file() {
    let result = ConfigLoader::new().with_defaults().with_config_file("/nonexistent/tracereplay.toml");
    let error_msg = format!("{}", result.err().expect("missing file should fail"));
    assert!(error_msg.contains("does not exist"));
}

/// Test that environment variables override file values
#[test]
fn test_env_overrides_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("config.toml");
    fs::write(&config_file, "[parser]\ngemini_fallback_model = \"from-file\"\n").unwrap();

    with_vars(
        [
            ("TRACEREPLAY_PARSER_GEMINI_FALLBACK_MODEL", Some("from-env")),
            ("TRACEREPLAY_EVALUATION_MODEL", Some("openai:gpt-4o")),
            ("TRACEREPLAY_AGENT_DEFAULT_SYSTEM_PROMPT", Some("")),
        ],
        || {
            let config = ConfigLoader::new()
                .with_defaults()
                .with_config_file(&config_file)
                .expect("Should load config file")
                .with_env_vars()
                .expect("Should apply env vars")
                .build()
                .expect("Should build config");

            assert_eq!(config.parser.gemini_fallback_model, "from-env");
            assert_eq!(config.evaluation.model_name, "openai:gpt-4o");
            assert_eq!(config.agent.default_system_prompt, None);
        },
    );
}

/// Test that an invalid log level in the environment is rejected
#[test]
fn test_invalid_log_level_env() {
    with_vars([("TRACEREPLAY_LOG_LEVEL", Some("loud"))], || {
        let result = ConfigLoader::new().with_defaults().with_env_vars();
        let error_msg = format!("{}", result.err().expect("invalid level should fail"));
        assert!(error_msg.contains("Invalid log level 'loud'"));
    });
}

/// Test log level parsing
#[test]
fn test_log_level_from_str() {
    assert_eq!(LogLevel::from_str("TRACE").unwrap(), LogLevel::Trace);
    assert_eq!(LogLevel::from_str("warning").unwrap(), LogLevel::Warn);
    assert!(LogLevel::from_str("verbose").is_err());

    assert!(LogLevel::Debug.is_trace_enabled());
    assert!(!LogLevel::Info.is_trace_enabled());
    assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
}

/// Test that the parser picks up the configured fallback model
#[test]
fn test_parser_uses_configured_fallback() {
    let mut config = Config::default();
    config.parser.gemini_fallback_model = "gemini-pinned".to_string();

    let raw = serde_json::json!({"attributes": {"http.request.body.text": {
        "contents": [{"role": "user", "parts": [{"text": "Hi"}]}]
    }}});
    let capture = CaptureParser::new(&config.parser, config.logging.level).parse(&raw).unwrap();
    assert_eq!(capture.model_name, "gemini-pinned");
    assert_eq!(capture.last_user_message, "Hi");
    assert!(capture.middle_messages.is_empty());
}
