//!
//! Error handling for the capture parser and replay engine.
//!
//! Defines all error types used throughout the crate using thiserror. Every
//! failure to turn a raw capture into a canonical split is reported as
//! `InvalidCapture`, so callers only ever need to catch a single kind.
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use thiserror::Error;

/* --- types ----------------------------------------------------------------------------------- */

///
/// Application error types.
///
/// `InvalidCapture` carries a descriptive message only; detection, validation,
/// conversion and empty-result failures are distinguished by text, not by variant.
#[derive(Error, Debug)]
pub enum ReplayError {
    #[error("Invalid capture data: {0}")]
    InvalidCapture(String),

    #[error("Replay error: {0}")]
    Replay(String),

    #[error("Model invocation error: {0}")]
    Invocation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/* --- start of code -------------------------------------------------------------------------- */

impl ReplayError {
    ///
    /// Build an `InvalidCapture` error for a detected format.
    ///
    /// # Arguments
    ///  * `format` - detected format name
    ///  * `detail` - first missing or invalid field found
    pub fn capture(format: impl std::fmt::Display, detail: impl std::fmt::Display) -> Self {
        ReplayError::InvalidCapture(format!("{}: {}", format, detail))
    }

    /// Whether this error means the capture itself is unusable.
    pub fn is_invalid_capture(&self) -> bool {
        matches!(self, ReplayError::InvalidCapture(_))
    }
}

/// Result type alias for cleaner error handling throughout the crate
pub type Result<T> = std::result::Result<T, ReplayError>;
