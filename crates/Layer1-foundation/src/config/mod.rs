//! Config - 설치 설정 관리
//!
//! - `install.rs` - InstallationConfig, 경로, 기본값

mod install;

pub use install::{
    ContainerRuntime, InstallPaths, InstallationConfig, DEFAULT_IMAGE, DEFAULT_MODEL,
    DEFAULT_PORT, INSTALL_CONFIG_FILE, LAUNCH_SCRIPT_FILE, LOG_DIR_NAME,
};
