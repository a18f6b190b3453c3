//! Container Spec
//!
//! One description of the container to run, used by both the engine API
//! backend and the launch script generator so the two never disagree.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use webui_foundation::ContainerRuntime;

/// Host port -> container port (tcp)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortMapping {
    pub host: u16,
    pub container: u16,
}

impl PortMapping {
    pub fn new(host: u16, container: u16) -> Self {
        Self { host, container }
    }

    /// Engine API port key, e.g. `8080/tcp`
    pub fn container_key(&self) -> String {
        format!("{}/tcp", self.container)
    }
}

impl std::fmt::Display for PortMapping {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.host, self.container)
    }
}

/// Volume mount configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolumeMount {
    /// Named volume or host path
    pub source: String,
    /// Container path
    pub target: String,
    /// Read-only mount
    pub read_only: bool,
}

impl VolumeMount {
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// `source:target[:ro]`, the form both `-v` and API binds take
    pub fn bind(&self) -> String {
        let ro = if self.read_only { ":ro" } else { "" };
        format!("{}:{}{}", self.source, self.target, ro)
    }
}

/// Restart policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RestartPolicy {
    #[default]
    No,
    Always,
    UnlessStopped,
    OnFailure,
}

impl RestartPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Always => "always",
            Self::UnlessStopped => "unless-stopped",
            Self::OnFailure => "on-failure",
        }
    }
}

/// Container configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContainerSpec {
    /// Container name
    pub name: String,
    /// Container image
    pub image: String,
    /// Published ports
    pub ports: Vec<PortMapping>,
    /// Volume mounts
    pub volumes: Vec<VolumeMount>,
    /// Environment variables (ordered so rendered output is stable)
    pub env: BTreeMap<String, String>,
    /// `host:ip` entries added to /etc/hosts
    pub extra_hosts: Vec<String>,
    pub restart: RestartPolicy,
}

impl ContainerSpec {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            ports: vec![],
            volumes: vec![],
            env: BTreeMap::new(),
            extra_hosts: vec![],
            restart: RestartPolicy::default(),
        }
    }

    pub fn with_port(mut self, host: u16, container: u16) -> Self {
        self.ports.push(PortMapping::new(host, container));
        self
    }

    pub fn with_volume(mut self, mount: VolumeMount) -> Self {
        self.volumes.push(mount);
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_extra_host(mut self, entry: impl Into<String>) -> Self {
        self.extra_hosts.push(entry.into());
        self
    }

    pub fn with_restart(mut self, restart: RestartPolicy) -> Self {
        self.restart = restart;
        self
    }

    /// `KEY=VALUE` list as the engine API expects
    pub fn env_list(&self) -> Vec<String> {
        self.env
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect()
    }

    /// Build `<runtime> run` arguments (detached), runtime command first
    pub fn build_args(&self, runtime: ContainerRuntime) -> Vec<String> {
        let mut args = vec![
            runtime.command().to_string(),
            "run".to_string(),
            "-d".to_string(),
            "--name".to_string(),
            self.name.clone(),
        ];

        // Ports
        for port in &self.ports {
            args.push("-p".to_string());
            args.push(port.to_string());
        }

        // Volumes
        for vol in &self.volumes {
            args.push("-v".to_string());
            args.push(vol.bind());
        }

        // Environment
        for pair in self.env_list() {
            args.push("-e".to_string());
            args.push(pair);
        }

        // Hosts
        for host in &self.extra_hosts {
            args.push("--add-host".to_string());
            args.push(host.clone());
        }

        if self.restart != RestartPolicy::No {
            args.push("--restart".to_string());
            args.push(self.restart.as_str().to_string());
        }

        // Image
        args.push(self.image.clone());

        args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContainerSpec {
        ContainerSpec::new("open-webui", "ghcr.io/open-webui/open-webui:main")
            .with_port(3000, 8080)
            .with_volume(VolumeMount::new("open-webui", "/app/backend/data"))
            .with_env("OLLAMA_API_BASE_URL", "http://host.docker.internal:11434/api")
            .with_extra_host("host.docker.internal:host-gateway")
            .with_restart(RestartPolicy::UnlessStopped)
    }

    #[test]
    fn test_build_args_order() {
        let args = sample().build_args(ContainerRuntime::Docker);
        assert_eq!(
            args,
            vec![
                "docker",
                "run",
                "-d",
                "--name",
                "open-webui",
                "-p",
                "3000:8080",
                "-v",
                "open-webui:/app/backend/data",
                "-e",
                "OLLAMA_API_BASE_URL=http://host.docker.internal:11434/api",
                "--add-host",
                "host.docker.internal:host-gateway",
                "--restart",
                "unless-stopped",
                "ghcr.io/open-webui/open-webui:main",
            ]
        );
    }

    #[test]
    fn test_podman_command() {
        let args = sample().build_args(ContainerRuntime::Podman);
        assert_eq!(args[0], "podman");
    }

    #[test]
    fn test_env_is_sorted() {
        let spec = ContainerSpec::new("c", "i")
            .with_env("WEBUI_SECRET_KEY", "s")
            .with_env("ANTHROPIC_API_KEY", "a");
        assert_eq!(
            spec.env_list(),
            vec!["ANTHROPIC_API_KEY=a", "WEBUI_SECRET_KEY=s"]
        );
    }

    #[test]
    fn test_no_restart_flag_by_default() {
        let args = ContainerSpec::new("c", "i").build_args(ContainerRuntime::Docker);
        assert!(!args.contains(&"--restart".to_string()));
    }

    #[test]
    fn test_read_only_bind() {
        let vol = VolumeMount::new("/host", "/data").read_only();
        assert_eq!(vol.bind(), "/host:/data:ro");
    }
}
