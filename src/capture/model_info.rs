//!
//! Model identifier helpers.
//!
//! Model names are either bare (`gpt-4o-mini`) or provider-qualified
//! (`openai:gpt-4o-mini`).
//!
//! Authors:
//!   Jaro <yarenty@gmail.com>
//!
//! Copyright (c) 2026 SkyCorp

/* --- uses ------------------------------------------------------------------------------------ */

use serde::{Deserialize, Serialize};

/* --- types ----------------------------------------------------------------------------------- */

///
/// A model identifier split into its parts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /** identifier as given */
    pub full_model_name: String,
    /** provider prefix, empty when unqualified */
    pub provider: String,
    /** identifier without the provider prefix */
    pub model_only: String,
}

/* --- start of code -------------------------------------------------------------------------- */

impl ModelInfo {
    /// Split `provider:model`; the first colon separates the provider.
    pub fn from_model_name(model_name: &str) -> Self {
        let (provider, model_only) = match model_name.split_once(':') {
            Some((provider, model)) => (provider, model),
            None => ("", model_name),
        };
        Self {
            full_model_name: model_name.to_string(),
            provider: provider.to_string(),
            model_only: model_only.to_string(),
        }
    }

    /// Whether the identifier names a provider.
    pub fn has_provider(&self) -> bool {
        !self.provider.is_empty()
    }
}

/// A model name is usable when it has at least one non-whitespace character.
pub fn is_valid_model_name(model_name: &str) -> bool {
    !model_name.trim().is_empty()
}

/* --- tests ----------------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_qualified_name() {
        let info = ModelInfo::from_model_name("openai:gpt-4o-mini");
        assert_eq!(info.provider, "openai");
        assert_eq!(info.model_only, "gpt-4o-mini");
        assert!(info.has_provider());
    }

    #[test]
    fn test_bare_and_multi_colon_names() {
        let bare = ModelInfo::from_model_name("gpt-4o");
        assert_eq!(bare.provider, "");
        assert_eq!(bare.model_only, "gpt-4o");

        let nested = ModelInfo::from_model_name("bedrock:anthropic:claude");
        assert_eq!(nested.provider, "bedrock");
        assert_eq!(nested.model_only, "anthropic:claude");
    }

    #[test]
    fn test_model_name_validity() {
        assert!(is_valid_model_name("gpt-4o"));
        assert!(!is_valid_model_name(""));
        assert!(!is_valid_model_name("  \t"));
    }
}
