//! Engine errors
//!
//! Everything here is a request failure: the request produced no result.
//! Recoverable problems travel as warnings inside `PaginationResult`.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("malformed message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    #[error("engine is not initialized; send an init message first")]
    NotInitialized,

    #[error("engine initialization failed: {message}")]
    InitFailed { message: String },

    #[error("internal error: {message}")]
    Internal { message: String },
}

impl EngineError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages() {
        let err = EngineError::invalid_input("duplicate element id \"e1\"");
        assert_eq!(err.to_string(), "invalid input: duplicate element id \"e1\"");

        let err: EngineError = serde_json::from_str::<u32>("nope").unwrap_err().into();
        assert!(err.to_string().starts_with("malformed message:"));
    }
}
