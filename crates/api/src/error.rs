//! Error types for backend calls

use forge_core::ForgeError;
use thiserror::Error;

/// Errors from talking to the project backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// The backend answered with a non-2xx status
    #[error("Server responded with {status}: {body}")]
    Status { status: u16, body: String },

    /// The request never completed
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The body was not the JSON we expected
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Bad base URL or timeout
    #[error("Invalid API configuration: {0}")]
    Config(String),

    /// The model refused the request before it was sent
    #[error(transparent)]
    Model(#[from] ForgeError),
}

impl ApiError {
    pub fn config(msg: impl Into<String>) -> Self {
        ApiError::Config(msg.into())
    }

    /// HTTP status, if the backend answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// 5xx responses and transport failures; worth trying again
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Status { status, .. } => *status >= 500,
            ApiError::Transport(_) => true,
            _ => false,
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// Result alias for backend calls
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_classification() {
        let missing = ApiError::Status {
            status: 404,
            body: "Project not found".to_string(),
        };
        assert!(missing.is_not_found());
        assert!(!missing.is_retryable());
        assert_eq!(missing.to_string(), "Server responded with 404: Project not found");

        let down = ApiError::Status {
            status: 503,
            body: String::new(),
        };
        assert!(down.is_retryable());
        assert_eq!(ApiError::config("x").status(), None);
    }

    #[test]
    fn test_model_errors_pass_through() {
        let err: ApiError = ForgeError::validation("Project 'x' has no id").into();
        assert_eq!(err.to_string(), "Validation error: Project 'x' has no id");
    }
}
