//! Installation status
//!
//! The config file says whether Open WebUI is installed; the engine says
//! whether its container runs. The two can drift, so both are reported.

use serde::Serialize;
use webui_engine::ContainerStatus;
use webui_foundation::{ContainerRuntime, InstallationConfig};

/// Reconciled installation state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum InstallState {
    NotInstalled,
    /// Config present, container stopped or missing
    InstalledStopped,
    InstalledRunning,
    /// Config present but the engine could not be asked
    InstalledUnknown(String),
}

impl InstallState {
    /// Combine config presence with the container lookup result
    pub fn reconcile<E: std::fmt::Display>(
        installed: bool,
        container: Result<Option<&ContainerStatus>, E>,
    ) -> Self {
        if !installed {
            return Self::NotInstalled;
        }
        match container {
            Ok(Some(status)) if status.running => Self::InstalledRunning,
            Ok(_) => Self::InstalledStopped,
            Err(e) => Self::InstalledUnknown(e.to_string()),
        }
    }

    pub fn is_installed(&self) -> bool {
        !matches!(self, Self::NotInstalled)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::InstalledRunning)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::NotInstalled => "not installed",
            Self::InstalledStopped => "stopped",
            Self::InstalledRunning => "running",
            Self::InstalledUnknown(_) => "unknown",
        }
    }
}

/// Snapshot returned by `get_status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub installed: bool,
    pub running: bool,
    pub version: Option<String>,
    pub port: Option<u16>,
    pub model: Option<String>,
    pub image: Option<String>,
    pub runtime: Option<ContainerRuntime>,
    /// Engine's own state string when the container exists
    pub container_state: Option<String>,
    pub state: InstallState,
}

impl Status {
    pub fn not_installed() -> Self {
        Self {
            installed: false,
            running: false,
            version: None,
            port: None,
            model: None,
            image: None,
            runtime: None,
            container_state: None,
            state: InstallState::NotInstalled,
        }
    }

    pub fn new(
        config: Option<&InstallationConfig>,
        container_state: Option<String>,
        state: InstallState,
    ) -> Self {
        Self {
            installed: state.is_installed(),
            running: state.is_running(),
            version: config.map(|c| c.version.clone()),
            port: config.map(|c| c.port),
            model: config.map(|c| c.model.clone()),
            image: config.map(|c| c.image.clone()),
            runtime: config.map(|c| c.runtime),
            container_state,
            state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn container(running: bool) -> ContainerStatus {
        ContainerStatus {
            id: "abc".into(),
            name: "open-webui".into(),
            state: if running { "running" } else { "exited" }.into(),
            running,
            image: None,
        }
    }

    #[test]
    fn test_reconcile() {
        let running = container(true);
        let exited = container(false);

        assert_eq!(
            InstallState::reconcile::<String>(false, Ok(Some(&running))),
            InstallState::NotInstalled
        );
        assert_eq!(
            InstallState::reconcile::<String>(true, Ok(Some(&running))),
            InstallState::InstalledRunning
        );
        assert_eq!(
            InstallState::reconcile::<String>(true, Ok(Some(&exited))),
            InstallState::InstalledStopped
        );
        assert_eq!(
            InstallState::reconcile::<String>(true, Ok(None)),
            InstallState::InstalledStopped
        );
        assert_eq!(
            InstallState::reconcile(true, Err("socket closed")),
            InstallState::InstalledUnknown("socket closed".into())
        );
    }

    #[test]
    fn test_running_flag_derives_from_state() {
        let config = InstallationConfig::new("img", 3000, "llama2");
        let status = Status::new(
            Some(&config),
            None,
            InstallState::InstalledUnknown("down".into()),
        );
        assert!(status.installed);
        assert!(!status.running);
        assert_eq!(status.port, Some(3000));
        assert_eq!(status.model.as_deref(), Some("llama2"));
    }
}
