//! Storage module for the installer
//!
//! - `json`: JSON - 설정 파일 저장/로드

mod json;

// JSON Storage (범용)
pub use json::{JsonStore, INSTALLER_DIR_NAME};
