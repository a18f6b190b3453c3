//! Installation Config - 설치 상태 저장
//!
//! `~/.openwebui/config.json` 하나가 "설치됨" 여부의 유일한 기준

use crate::storage::JsonStore;
use crate::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// 설정 파일명
pub const INSTALL_CONFIG_FILE: &str = "config.json";

/// Launch script file name inside the config dir
pub const LAUNCH_SCRIPT_FILE: &str = "launch-openwebui.sh";

/// Log directory name inside the config dir
pub const LOG_DIR_NAME: &str = "logs";

/// Default Open WebUI image
pub const DEFAULT_IMAGE: &str = "ghcr.io/open-webui/open-webui:main";

/// Default Ollama model pulled on install
pub const DEFAULT_MODEL: &str = "llama2";

/// Default host port mapped to the container's 8080
pub const DEFAULT_PORT: u16 = 3000;

// ============================================================================
// Container Runtime
// ============================================================================

/// Container runtime type
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerRuntime {
    #[default]
    Docker,
    Podman,
}

impl ContainerRuntime {
    /// Get the CLI command for this runtime
    pub fn command(&self) -> &'static str {
        match self {
            Self::Docker => "docker",
            Self::Podman => "podman",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Docker => "Docker",
            Self::Podman => "Podman",
        }
    }
}

impl std::fmt::Display for ContainerRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.command())
    }
}

impl std::str::FromStr for ContainerRuntime {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "docker" => Ok(Self::Docker),
            "podman" => Ok(Self::Podman),
            other => Err(format!("unknown container runtime: {}", other)),
        }
    }
}

// ============================================================================
// Installation Config
// ============================================================================

/// Persisted installation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InstallationConfig {
    /// Installer version that wrote this file
    #[serde(default = "default_version")]
    pub version: String,

    /// Open WebUI image the container runs
    #[serde(default = "default_image")]
    pub image: String,

    /// Host port mapped to 8080/tcp
    #[serde(default = "default_port")]
    pub port: u16,

    /// Ollama model pulled at install time
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub runtime: ContainerRuntime,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub installed_at: Option<DateTime<Utc>>,
}

impl InstallationConfig {
    pub fn new(image: impl Into<String>, port: u16, model: impl Into<String>) -> Self {
        Self {
            version: default_version(),
            image: image.into(),
            port,
            model: model.into(),
            runtime: ContainerRuntime::default(),
            installed_at: Some(Utc::now()),
        }
    }

    pub fn with_runtime(mut self, runtime: ContainerRuntime) -> Self {
        self.runtime = runtime;
        self
    }
}

// ============================================================================
// Install Paths
// ============================================================================

/// Files owned by the installer, all under one config dir
#[derive(Debug, Clone)]
pub struct InstallPaths {
    store: JsonStore,
}

impl InstallPaths {
    pub fn new(config_dir: impl Into<PathBuf>) -> Self {
        Self {
            store: JsonStore::new(config_dir),
        }
    }

    /// ~/.openwebui
    pub fn global() -> Result<Self> {
        Ok(Self {
            store: JsonStore::global()?,
        })
    }

    pub fn config_dir(&self) -> &Path {
        self.store.base_dir()
    }

    pub fn config_file(&self) -> PathBuf {
        self.store.file_path(INSTALL_CONFIG_FILE)
    }

    pub fn launch_script(&self) -> PathBuf {
        self.store.file_path(LAUNCH_SCRIPT_FILE)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.store.file_path(LOG_DIR_NAME)
    }

    // ========================================================================
    // Load / Save
    // ========================================================================

    /// The sole "installed" predicate
    pub fn is_installed(&self) -> bool {
        self.store.exists(INSTALL_CONFIG_FILE)
    }

    pub fn ensure_dir(&self) -> Result<()> {
        self.store.ensure_dir()
    }

    pub fn load_config(&self) -> Result<Option<InstallationConfig>> {
        self.store.load_optional(INSTALL_CONFIG_FILE)
    }

    pub fn save_config(&self, config: &InstallationConfig) -> Result<()> {
        self.store.save(INSTALL_CONFIG_FILE, config)
    }

    /// 설정 디렉토리 전체 삭제
    pub fn remove_all(&self) -> Result<()> {
        self.store.remove_all()
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_image() -> String {
    DEFAULT_IMAGE.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
