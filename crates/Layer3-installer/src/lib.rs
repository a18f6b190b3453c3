//! # webui-installer
//!
//! Open WebUI lifecycle management:
//! - RequirementsValidator: OS / 엔진 버전 / 엔진 / Ollama 검사
//! - Installer: install, uninstall, start, stop, restart, update, status, logs
//! - Status: 설정 파일과 컨테이너 상태를 합친 결과
//! - OperationLock: 동시 실행 방지
//! - AutostartManager: macOS launchd 에이전트

pub mod autostart;
pub mod installer;
pub mod lock;
pub mod requirements;
pub mod status;

pub use autostart::{AutostartManager, Launchctl, ServiceManager, AGENT_LABEL};
pub use installer::{
    InstallOptions, Installer, CONTAINER_NAME, CONTAINER_PORT, DATA_DIR, VOLUME_NAME,
};
pub use lock::OperationLock;
pub use requirements::{RequirementsValidator, MIN_ENGINE_API};
pub use status::{InstallState, Status};
