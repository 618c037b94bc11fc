//!
//! Configuration loading system for TraceReplay.
//!
//! Layers are applied lowest priority first:
//! 1. Built-in defaults
//! 2. System config file (/etc/tracereplay/config.toml)
//! 3. User config file (~/.config/tracereplay/config.toml)
//! 4. Explicit config file
//! 5. Environment variables (highest priority)
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use crate::config::paths;
use crate::config::{AgentConfig, Config, EvaluationConfig, LogLevel, ParserConfig, ReplayConfig};
use crate::error::{ReplayError, Result};

use std::collections::BTreeMap;
use std::env;
use std::path::Path;

/* --- constants ------------------------------------------------------------------------------ */

/** prefix shared by every recognised environment variable */
const ENV_PREFIX: &str = "TRACEREPLAY_";

/* --- types ----------------------------------------------------------------------------------- */

///
/// Configuration loader implementing the Builder pattern.
///
/// Each method returns self for chaining; `build()` validates the result.
pub struct ConfigLoader {
    /// Current configuration being built
    config: Config,
    /// Environment variable overrides collected
    env_overrides: BTreeMap<String, String>,
    /// Whether defaults have been applied
    defaults_applied: bool,
}

/* --- implementations --------------------------------------------------------------------- */

impl ConfigLoader {
    /// Create a new configuration loader
    ///
    /// # Examples
    /// ```rust,no_run
    /// use tracereplay::config::loader::ConfigLoader;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ConfigLoader::new()
    ///     .with_defaults()
    ///     .with_user_config()?
    ///     .with_env_vars()?
    ///     .build()?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new() -> Self {
        Self { config: Config::default(), env_overrides: BTreeMap::new(), defaults_applied: false }
    }

    /// Apply built-in default values. Must be called before `build()`.
    pub fn with_defaults(mut self) -> Self {
        self.config = Config::default();
        self.defaults_applied = true;
        self
    }

    /// Load the system-wide configuration file if it exists.
    ///
    /// # Returns
    /// * `Ok(Self)` - System config loaded or skipped (file not found)
    /// * `Err(ReplayError)` - System config exists but failed to load
    pub fn with_system_config(mut self) -> Result<Self> {
        let system_config_path = paths::system_config_file()?;

        if system_config_path.exists() {
            tracing::debug!("Loading system config from: {}", system_config_path.display());
            self.load_config_file(&system_config_path)?;
        } else {
            tracing::debug!("System config not found at: {}", system_config_path.display());
        }

        Ok(self)
    }

    /// Load the user configuration file if it exists.
    ///
    /// # Returns
    /// * `Ok(Self)` - User config loaded or skipped (file not found)
    /// * `Err(ReplayError)` - User config exists but failed to load
    pub fn with_user_config(mut self) -> Result<Self> {
        let user_config_path = paths::user_config_file()?;

        if user_config_path.exists() {
            tracing::debug!("Loading user config from: {}", user_config_path.display());
            self.load_config_file(&user_config_path)?;
        } else {
            tracing::debug!("User config not found at: {}", user_config_path.display());
        }

        Ok(self)
    }

    /// Load configuration from a specific file path.
    ///
    /// Supports `~` and `$VAR` expansion in the path.
    pub fn with_config_file<P: AsRef<Path>>(mut self, path: P) -> Result<Self> {
        let path = paths::expand_path(path)?;
        tracing::debug!("Loading custom config from: {}", path.display());
        self.load_config_file(&path)?;
        Ok(self)
    }

    /// Apply `TRACEREPLAY_*` environment variable overrides.
    ///
    /// Supported environment variables:
    /// - TRACEREPLAY_LOG_LEVEL
    /// - TRACEREPLAY_PARSER_GEMINI_FALLBACK_MODEL
    /// - TRACEREPLAY_REPLAY_REQUEST_TIMEOUT_MS
    /// - TRACEREPLAY_AGENT_DEFAULT_MODEL
    /// - TRACEREPLAY_AGENT_DEFAULT_SYSTEM_PROMPT
    /// - TRACEREPLAY_EVALUATION_MODEL
    pub fn with_env_vars(mut self) -> Result<Self> {
        tracing::debug!("Loading configuration from environment variables");

        for (key, value) in env::vars() {
            if key.starts_with(ENV_PREFIX) {
                self.env_overrides.insert(key, value);
            }
        }

        self.apply_env_overrides()?;

        Ok(self)
    }

    /// Build and validate the final configuration.
    pub fn build(self) -> Result<Config> {
        let config = self.build_base()?;
        config.validate()?;
        Ok(config)
    }

    /// Build the configuration without running validation.
    pub fn build_base(self) -> Result<Config> {
        if !self.defaults_applied {
            return Err(ReplayError::Config(
                "Configuration loader must call with_defaults() before build()".to_string(),
            ));
        }

        tracing::debug!(
            "Final config: logging.level={:?}, replay.request_timeout_ms={}, evaluation.model_name={}",
            self.config.logging.level,
            self.config.replay.request_timeout_ms,
            self.config.evaluation.model_name
        );

        Ok(self.config)
    }

    /* --- private methods ----------------------------------------------------------------- */

    /// Load and merge configuration from a TOML file
    fn load_config_file<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();

        paths::validate_config_file(path)?;

        let contents = std::fs::read_to_string(path).map_err(|e| {
            ReplayError::Config(format!(
                "Failed to read configuration file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let file_config: Config = toml::from_str(&contents).map_err(|e| {
            ReplayError::Config(format!(
                "Failed to parse TOML configuration file '{}': {}\n\
                 \n\
                 Please check the syntax of your configuration file.\n\
                 Run 'tracereplay validate' for more details.",
                path.display(),
                e
            ))
        })?;

        self.merge_config(file_config);

        tracing::debug!("Successfully loaded config from: {}", path.display());
        Ok(())
    }

    /// Merge another config into the current config
    fn merge_config(&mut self, other: Config) {
        // Enum-valued level cannot tell "explicitly set" from default, always merge
        self.config.logging.level = other.logging.level;

        self.merge_parser_config(other.parser);
        self.merge_replay_config(other.replay);
        self.merge_agent_config(other.agent);
        self.merge_evaluation_config(other.evaluation);
    }

    fn merge_parser_config(&mut self, other: ParserConfig) {
        if other.gemini_fallback_model != ParserConfig::default().gemini_fallback_model {
            self.config.parser.gemini_fallback_model = other.gemini_fallback_model;
        }
    }

    fn merge_replay_config(&mut self, other: ReplayConfig) {
        if other.request_timeout_ms != ReplayConfig::default().request_timeout_ms {
            self.config.replay.request_timeout_ms = other.request_timeout_ms;
        }
    }

    fn merge_agent_config(&mut self, other: AgentConfig) {
        if other.default_model_name.is_some() {
            self.config.agent.default_model_name = other.default_model_name;
        }
        if other.default_system_prompt.is_some() {
            self.config.agent.default_system_prompt = other.default_system_prompt;
        }
        if other.default_model_settings.is_some() {
            self.config.agent.default_model_settings = other.default_model_settings;
        }
    }

    fn merge_evaluation_config(&mut self, other: EvaluationConfig) {
        if other.model_name != EvaluationConfig::default().model_name {
            self.config.evaluation.model_name = other.model_name;
        }
    }

    /// Apply environment variable overrides to current configuration
    fn apply_env_overrides(&mut self) -> Result<()> {
        for (key, value) in &self.env_overrides {
            match key.as_str() {
                "TRACEREPLAY_LOG_LEVEL" => {
                    self.config.logging.level = LogLevel::from_str(value)?;
                }
                "TRACEREPLAY_PARSER_GEMINI_FALLBACK_MODEL" => {
                    self.config.parser.gemini_fallback_model = value.clone();
                }
                "TRACEREPLAY_REPLAY_REQUEST_TIMEOUT_MS" => {
                    self.config.replay.request_timeout_ms = value.parse().map_err(|e| {
                        ReplayError::Config(format!(
                            "Invalid TRACEREPLAY_REPLAY_REQUEST_TIMEOUT_MS value '{}': {}",
                            value, e
                        ))
                    })?;
                }
                "TRACEREPLAY_AGENT_DEFAULT_MODEL" => {
                    self.config.agent.default_model_name = non_empty(value);
                }
                "TRACEREPLAY_AGENT_DEFAULT_SYSTEM_PROMPT" => {
                    self.config.agent.default_system_prompt = non_empty(value);
                }
                "TRACEREPLAY_EVALUATION_MODEL" => {
                    self.config.evaluation.model_name = value.clone();
                }
                _ => {
                    tracing::debug!("Ignoring unknown environment variable: {}", key);
                }
            }
        }

        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/* --- utility functions ------------------------------------------------------------------- */

/// Treat an empty env value as unset
fn non_empty(value: &str) -> Option<String> {
    if value.is_empty() { None } else { Some(value.to_string()) }
}

/* --- tests ------------------------------------------------------------------------------- */
