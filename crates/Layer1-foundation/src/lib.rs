//! # webui-foundation
//!
//! Foundation layer for the Open WebUI installer:
//! - Error: 사용자 노출 에러 (SystemRequirements / Installer) + 인프라 에러
//! - Config: InstallationConfig, 설치 경로, 기본값
//! - Storage: JsonStore (원자적 저장)
//! - Secrets: 환경변수 / `/run/secrets` 로더
//! - Env: 호스트 OS / 도구 감지
//! - Logging: stderr + 회전 로그 파일
//! - Download: 체크섬 검증 다운로드

pub mod config;
pub mod download;
pub mod env_detect;
pub mod error;
pub mod logging;
pub mod secrets;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    ContainerRuntime, InstallPaths, InstallationConfig, DEFAULT_IMAGE, DEFAULT_MODEL,
    DEFAULT_PORT, INSTALL_CONFIG_FILE, LAUNCH_SCRIPT_FILE, LOG_DIR_NAME,
};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, INSTALLER_DIR_NAME};

// ============================================================================
// Secrets / Environment / Logging / Download
// ============================================================================
pub use download::Downloader;
pub use env_detect::{HostInfo, OsType};
pub use logging::LogConfig;
pub use secrets::{SecretLoader, DEFAULT_SECRETS_DIR, SECRET_ENV_VARS};
