//! Error types for condql

use thiserror::Error;

/// Result type alias for query-construction operations
pub type BuildResult<T> = Result<T, BuildError>;

/// Errors raised while turning conditions into SQL text.
///
/// All of these are local and deterministic: nothing here is retried, and none
/// of them originate from a database.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuildError {
    /// Structurally invalid condition input
    #[error("Malformed condition: {0}")]
    MalformedCondition(String),

    /// Operator or logical token outside the recognized set
    #[error("Unknown operator: '{0}'")]
    UnknownOperator(String),

    /// Identifier rejected before reaching SQL text
    #[error("Invalid identifier: {0}")]
    InvalidIdentifier(String),

    /// A raw fragment tried to bind a name already present in the session
    #[error("Duplicate parameter name: '{0}'")]
    DuplicateParameter(String),

    /// Builder state error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl BuildError {
    /// Create a malformed condition error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedCondition(message.into())
    }

    /// Create an unknown operator error
    pub fn unknown_operator(token: impl Into<String>) -> Self {
        Self::UnknownOperator(token.into())
    }

    /// Create an invalid identifier error
    pub fn invalid_identifier(message: impl Into<String>) -> Self {
        Self::InvalidIdentifier(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Check if this is a malformed condition error
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedCondition(_))
    }

    /// Check if this is an unknown operator error
    pub fn is_unknown_operator(&self) -> bool {
        matches!(self, Self::UnknownOperator(_))
    }

    /// Check if this is an identifier validation error
    pub fn is_invalid_identifier(&self) -> bool {
        matches!(self, Self::InvalidIdentifier(_))
    }
}
