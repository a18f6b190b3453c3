//! Engine-specific error types
//!
//! EngineError는 Docker/Podman API 세부 에러를 관리합니다.
//! webui_foundation::Error와의 변환을 지원합니다.

use thiserror::Error;
use webui_foundation::Error as FoundationError;

/// Errors from the container engine
#[derive(Error, Debug, Clone)]
pub enum EngineError {
    /// Container, image or volume does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Could not connect to the engine at all
    #[error("Engine unavailable: {0}")]
    Unavailable(String),

    /// Engine answered with an error status
    #[error("Engine API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Request took longer than the client timeout
    #[error("Engine request timed out: {0}")]
    Timeout(String),

    /// Launch script could not be rendered or written
    #[error("Launch script error: {0}")]
    Script(String),

    #[error("{0}")]
    Other(String),
}

impl EngineError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, EngineError::NotFound(_))
    }
}

impl From<bollard::errors::Error> for EngineError {
    fn from(err: bollard::errors::Error) -> Self {
        use bollard::errors::Error as BollardError;

        match err {
            BollardError::DockerResponseServerError {
                status_code: 404,
                message,
            } => EngineError::NotFound(message),
            BollardError::DockerResponseServerError {
                status_code,
                message,
            } => EngineError::Api {
                status: status_code,
                message,
            },
            BollardError::RequestTimeoutError => {
                EngineError::Timeout("no response from engine".to_string())
            }
            BollardError::SocketNotFoundError(path) => {
                EngineError::Unavailable(format!("socket not found: {}", path))
            }
            BollardError::IOError { err } => EngineError::Unavailable(err.to_string()),
            other => EngineError::Other(other.to_string()),
        }
    }
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::Script(err.to_string())
    }
}

// ============================================================================
// webui_foundation::Error 변환
// ============================================================================

impl From<EngineError> for FoundationError {
    fn from(err: EngineError) -> Self {
        match err {
            EngineError::Timeout(msg) => FoundationError::Timeout(msg),
            EngineError::Script(msg) => FoundationError::Installer(msg),
            other => FoundationError::Container(other.to_string()),
        }
    }
}
