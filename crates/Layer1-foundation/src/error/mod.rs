//! Error types for the Open WebUI installer
//!
//! 모든 에러를 중앙에서 관리

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// Installer 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 사용자 노출 에러
    // ========================================================================
    /// The host is not suitable: OS, engine version, engine or LLM unreachable
    #[error("{0}")]
    SystemRequirements(String),

    /// Everything else a lifecycle operation can fail with
    #[error("{0}")]
    Installer(String),

    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 실행 관련
    // ========================================================================
    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Download failed: {0}")]
    Download(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(String),

    /// Container engine (Docker/Podman API) failure
    #[error("Container engine error: {0}")]
    Container(String),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// 시스템 요구사항 에러 생성 헬퍼
    pub fn requirements(message: impl Into<String>) -> Self {
        Error::SystemRequirements(message.into())
    }

    /// Installer 에러 생성 헬퍼
    pub fn installer(message: impl Into<String>) -> Self {
        Error::Installer(message.into())
    }

    /// Re-wrap any error at an operation boundary as `Installer`
    pub fn wrap(self, context: &str) -> Self {
        Error::Installer(format!("{}: {}", context, self))
    }

    /// Like `wrap`, but an `Installer` error already carries its own message
    pub fn into_installer(self, context: &str) -> Self {
        match self {
            Error::Installer(_) => self,
            other => other.wrap(context),
        }
    }

    /// 사용자에게 보여줄 수 있는 에러인지 확인
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::SystemRequirements(_) | Error::Installer(_))
    }

    pub fn is_system_requirements(&self) -> bool {
        matches!(self, Error::SystemRequirements(_))
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Error::Timeout(e.to_string())
        } else {
            Error::Http(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_keeps_requirements_message() {
        let err = Error::requirements("Docker is not running or not installed");
        let wrapped = err.wrap("Installation failed");
        assert!(matches!(wrapped, Error::Installer(_)));
        assert_eq!(
            wrapped.to_string(),
            "Installation failed: Docker is not running or not installed"
        );
    }

    #[test]
    fn test_wrap_turns_infrastructure_errors_into_installer() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let wrapped = Error::from(io).wrap("Uninstallation failed");
        assert!(matches!(wrapped, Error::Installer(_)));
        assert!(wrapped.to_string().starts_with("Uninstallation failed: IO error"));
    }

    #[test]
    fn test_into_installer_keeps_installer_messages() {
        let err = Error::installer("Open WebUI is not installed").into_installer("Start failed");
        assert_eq!(err.to_string(), "Open WebUI is not installed");

        let err = Error::Config("bad json".into()).into_installer("Start failed");
        assert!(matches!(err, Error::Installer(_)));
        assert_eq!(err.to_string(), "Start failed: Configuration error: bad json");
    }
}
