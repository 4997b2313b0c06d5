//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Model registry is empty")]
    EmptyRegistry,

    #[error("Unknown model: {0}")]
    UnknownModel(String),

    #[error("Duplicate model name in registry: {0}")]
    DuplicateModel(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("Invocation request has no user messages")]
    EmptyRequest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = DomainError::UnknownModel("gpt-99".to_string());
        assert_eq!(error.to_string(), "Unknown model: gpt-99");
    }
}
