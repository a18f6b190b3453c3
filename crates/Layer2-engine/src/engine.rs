//! Container engine trait
//!
//! 설치 관리자가 사용하는 Docker/Podman 공통 인터페이스.
//! The bollard backend implements it for real engines; tests use in-memory fakes.

use crate::error::EngineError;
use crate::spec::ContainerSpec;
use async_trait::async_trait;
use std::time::Duration;
use webui_foundation::ContainerRuntime;

/// Default grace period before a stop escalates to kill
pub const DEFAULT_STOP_TIMEOUT: Duration = Duration::from_secs(10);

/// Callback receiving decoded log text as it arrives, newlines included
pub type LogSink<'a> = &'a mut (dyn FnMut(&str) + Send);

/// Engine version information
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EngineVersion {
    /// Product version, e.g. `27.3.1`
    pub version: Option<String>,
    /// Remote API version, e.g. `1.47`
    pub api_version: Option<String>,
}

impl EngineVersion {
    /// `major.minor` of the API version, `None` when absent or unparsable
    pub fn api(&self) -> Option<(u32, u32)> {
        parse_major_minor(self.api_version.as_deref()?)
    }
}

fn parse_major_minor(raw: &str) -> Option<(u32, u32)> {
    let mut parts = raw.trim().split('.');
    let major = parts.next()?.parse().ok()?;
    let minor = parts.next()?.parse().ok()?;
    Some((major, minor))
}

/// Live state of a container
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerStatus {
    pub id: String,
    pub name: String,
    /// Engine state string: `running`, `exited`, `created`, ...
    pub state: String,
    pub running: bool,
    pub image: Option<String>,
}

/// Container engine trait
#[async_trait]
pub trait ContainerEngine: Send + Sync {
    /// Which runtime this engine talks to
    fn runtime(&self) -> ContainerRuntime;

    /// Check the daemon answers
    async fn ping(&self) -> Result<(), EngineError>;

    async fn version(&self) -> Result<EngineVersion, EngineError>;

    /// Pull an image
    async fn pull_image(&self, image: &str) -> Result<(), EngineError>;

    /// Inspect a container; `Ok(None)` when it does not exist
    async fn inspect_container(&self, name: &str)
        -> Result<Option<ContainerStatus>, EngineError>;

    /// Create and start a container, returning its id
    async fn run_container(&self, spec: &ContainerSpec) -> Result<String, EngineError>;

    async fn start_container(&self, name: &str) -> Result<(), EngineError>;

    /// Stop a container
    async fn stop_container(&self, name: &str, timeout: Duration) -> Result<(), EngineError>;

    async fn restart_container(&self, name: &str, timeout: Duration)
        -> Result<(), EngineError>;

    /// Remove a container
    async fn remove_container(&self, name: &str, force: bool) -> Result<(), EngineError>;

    async fn remove_volume(&self, name: &str) -> Result<(), EngineError>;

    /// Last `tail` lines of stdout and stderr
    async fn logs(&self, name: &str, tail: usize) -> Result<String, EngineError>;

    /// Stream logs into `sink` until the container stops
    async fn follow_logs(
        &self,
        name: &str,
        tail: usize,
        sink: LogSink<'_>,
    ) -> Result<(), EngineError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_version_parse() {
        let v = EngineVersion {
            version: Some("27.3.1".into()),
            api_version: Some("1.47".into()),
        };
        assert_eq!(v.api(), Some((1, 47)));
    }

    #[test]
    fn test_api_version_unparsable() {
        let v = EngineVersion {
            version: None,
            api_version: Some("dev".into()),
        };
        assert_eq!(v.api(), None);
        assert_eq!(EngineVersion::default().api(), None);
    }

    #[test]
    fn test_api_version_ordering() {
        assert!(parse_major_minor("1.40").unwrap() < (1, 41));
        assert!(parse_major_minor("1.41").unwrap() >= (1, 41));
        assert!(parse_major_minor("2.0").unwrap() > (1, 41));
    }
}
