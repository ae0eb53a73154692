//! Error types for Quarry.

use thiserror::Error;

use crate::marshal::ScalarType;

/// The main error type for Quarry operations.
///
/// Every variant is fatal for the call that produced it: the compiler never
/// returns partial SQL alongside an error.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// An AST construct the target dialect cannot express.
    #[error("Unsupported construct: {0}")]
    UnsupportedConstruct(String),

    /// An operator missing from the dialect's operator table.
    #[error("Unsupported operator: '{0}'")]
    UnsupportedOperator(String),

    /// A table, column or alias name outside the identifier grammar.
    #[error("Invalid identifier: '{0}'")]
    InvalidIdentifier(String),

    /// A value that cannot be coerced to or from its declared field type.
    #[error("Cannot marshal {field_type} value: {message}")]
    Marshalling {
        field_type: ScalarType,
        message: String,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl QuarryError {
    /// Create an unsupported-construct error.
    pub fn unsupported(construct: impl Into<String>) -> Self {
        Self::UnsupportedConstruct(construct.into())
    }

    /// Create a marshalling error for the given field type.
    pub fn marshalling(field_type: ScalarType, message: impl Into<String>) -> Self {
        Self::Marshalling {
            field_type,
            message: message.into(),
        }
    }
}

/// Result type alias for Quarry operations.
pub type QuarryResult<T> = Result<T, QuarryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = QuarryError::InvalidIdentifier("user-name".to_string());
        assert_eq!(err.to_string(), "Invalid identifier: 'user-name'");

        let err = QuarryError::marshalling(ScalarType::DateTime, "not a timestamp: 'soon'");
        assert_eq!(
            err.to_string(),
            "Cannot marshal dateTime value: not a timestamp: 'soon'"
        );
    }
}
