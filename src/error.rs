//! Error types for the regex extraction engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ExtractError>;

/// Failure modes of a single extraction call.
///
/// "No match" and "group did not participate" are not errors: they are
/// reported as `Ok(None)` by the extractor. Every variant here aborts the
/// current evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    /// The pattern is not valid regex syntax.
    #[error("Invalid regex pattern '{pattern}': {reason}")]
    CompileError { pattern: String, reason: String },

    /// The requested group index does not exist in the pattern.
    #[error("Capture group {group} out of range: pattern declares {group_count} group(s)")]
    SelectorError { group: i64, group_count: usize },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Registration error: {0}")]
    RegistrationError(String),
}

impl ExtractError {
    pub(crate) fn compile(pattern: &str, err: &regex::Error) -> Self {
        ExtractError::CompileError {
            pattern: pattern.to_string(),
            reason: err.to_string(),
        }
    }

    /// Whether this error came from pattern compilation.
    pub fn is_compile_error(&self) -> bool {
        matches!(self, ExtractError::CompileError { .. })
    }

    /// Whether this error came from an out-of-range group selector.
    pub fn is_selector_error(&self) -> bool {
        matches!(self, ExtractError::SelectorError { .. })
    }
}

impl From<std::io::Error> for ExtractError {
    fn from(err: std::io::Error) -> Self {
        ExtractError::ConfigError(err.to_string())
    }
}

impl From<serde_yaml::Error> for ExtractError {
    fn from(err: serde_yaml::Error) -> Self {
        ExtractError::ConfigError(format!("YAML: {err}"))
    }
}

impl From<serde_json::Error> for ExtractError {
    fn from(err: serde_json::Error) -> Self {
        ExtractError::ConfigError(format!("JSON: {err}"))
    }
}
