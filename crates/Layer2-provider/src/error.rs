//! Provider-specific error types
//!
//! ProviderError는 Ollama 관련 세부 에러를 관리합니다.
//! webui_foundation::Error와의 변환을 지원합니다.

use thiserror::Error;
use webui_foundation::Error as FoundationError;

/// Errors that can occur while talking to the model runtime
#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    /// Server answered with a non-success status
    #[error("Server error: {0}")]
    ServerError(String),

    /// No answer within the request timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Network error (connection refused, DNS, etc.)
    #[error("Network error: {0}")]
    Network(String),

    /// Invalid response from API
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The `ollama` command could not be started
    #[error("Ollama command not found: {0}")]
    CommandNotFound(String),

    /// `ollama pull` exited with an error
    #[error("Failed to pull Ollama model {model}: {message}")]
    PullFailed { model: String, message: String },

    /// `ollama pull` ran past its deadline
    #[error("Timeout while pulling Ollama model {0}")]
    PullTimeout(String),

    /// Model still absent after a successful pull
    #[error("Model not found: {0}")]
    ModelNotFound(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Timeout(err.to_string())
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Network(err.to_string())
        }
    }
}

// ============================================================================
// webui_foundation::Error 변환
// ============================================================================

impl From<ProviderError> for FoundationError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::ServerError(msg) => FoundationError::Http(msg),
            ProviderError::Network(msg) => FoundationError::Http(format!("Network: {}", msg)),
            ProviderError::Timeout(msg) => FoundationError::Timeout(msg),
            ProviderError::InvalidResponse(msg) => {
                FoundationError::Http(format!("Invalid response: {}", msg))
            }
            // Pull/verify failures already carry a user-facing message
            other => FoundationError::Installer(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pull_errors_become_installer_errors() {
        let err: FoundationError = ProviderError::PullTimeout("llama2".into()).into();
        assert!(matches!(err, FoundationError::Installer(_)));
        assert_eq!(err.to_string(), "Timeout while pulling Ollama model llama2");
    }

    #[test]
    fn test_timeout_maps_to_timeout() {
        let err: FoundationError = ProviderError::Timeout("10s".into()).into();
        assert!(matches!(err, FoundationError::Timeout(_)));
    }
}
