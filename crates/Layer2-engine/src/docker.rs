//! Bollard backend - Docker Engine API (also served by Podman's socket)

use crate::engine::{ContainerEngine, ContainerStatus, EngineVersion, LogSink};
use crate::error::EngineError;
use crate::spec::{ContainerSpec, RestartPolicy};
use async_trait::async_trait;
use bollard::container::{
    Config, CreateContainerOptions, InspectContainerOptions, LogOutput, LogsOptions,
    RemoveContainerOptions, RestartContainerOptions, StartContainerOptions,
    StopContainerOptions,
};
use bollard::image::CreateImageOptions;
use bollard::models::{HostConfig, PortBinding, RestartPolicyNameEnum};
use bollard::Docker;
use futures::StreamExt;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info};
use webui_foundation::ContainerRuntime;

/// Client-side timeout for a single API call; image pulls can be slow
pub const API_TIMEOUT: Duration = Duration::from_secs(600);

/// Engine API client
pub struct BollardEngine {
    docker: Docker,
    runtime: ContainerRuntime,
}

impl BollardEngine {
    pub fn new(docker: Docker, runtime: ContainerRuntime) -> Self {
        Self {
            docker: docker.with_timeout(API_TIMEOUT),
            runtime,
        }
    }

    /// `DOCKER_HOST` or the platform default socket
    pub fn docker() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker, ContainerRuntime::Docker))
    }

    /// Podman's Docker-compatible API on a unix socket
    #[cfg(unix)]
    pub fn podman_socket(path: &std::path::Path) -> Result<Self, EngineError> {
        let docker = Docker::connect_with_unix(
            &path.to_string_lossy(),
            API_TIMEOUT.as_secs(),
            bollard::API_DEFAULT_VERSION,
        )?;
        Ok(Self::new(docker, ContainerRuntime::Podman))
    }

    /// Podman reached through `DOCKER_HOST`
    pub fn podman_from_env() -> Result<Self, EngineError> {
        let docker = Docker::connect_with_local_defaults()?;
        Ok(Self::new(docker, ContainerRuntime::Podman))
    }

    fn create_options(spec: &ContainerSpec) -> Config<String> {
        let mut exposed_ports = HashMap::new();
        let mut port_bindings = HashMap::new();
        for port in &spec.ports {
            exposed_ports.insert(port.container_key(), HashMap::new());
            port_bindings.insert(
                port.container_key(),
                Some(vec![PortBinding {
                    host_ip: None,
                    host_port: Some(port.host.to_string()),
                }]),
            );
        }

        let host_config = HostConfig {
            port_bindings: Some(port_bindings),
            binds: Some(spec.volumes.iter().map(|v| v.bind()).collect()),
            extra_hosts: Some(spec.extra_hosts.clone()),
            restart_policy: Some(bollard::models::RestartPolicy {
                name: Some(restart_policy_name(spec.restart)),
                maximum_retry_count: None,
            }),
            ..Default::default()
        };

        Config {
            image: Some(spec.image.clone()),
            env: Some(spec.env_list()),
            exposed_ports: Some(exposed_ports),
            host_config: Some(host_config),
            ..Default::default()
        }
    }
}

fn restart_policy_name(policy: RestartPolicy) -> RestartPolicyNameEnum {
    match policy {
        RestartPolicy::No => RestartPolicyNameEnum::NO,
        RestartPolicy::Always => RestartPolicyNameEnum::ALWAYS,
        RestartPolicy::UnlessStopped => RestartPolicyNameEnum::UNLESS_STOPPED,
        RestartPolicy::OnFailure => RestartPolicyNameEnum::ON_FAILURE,
    }
}

/// Split `repo[:tag]` for the create-image call.
///
/// An empty tag would pull every tag of the repository, so `latest` is
/// filled in. A port in the registry host (`host:5000/img`) is not a tag.
pub fn split_image_ref(image: &str) -> (&str, &str) {
    if image.contains('@') {
        return (image, "");
    }
    let name_start = image.rfind('/').map(|i| i + 1).unwrap_or(0);
    match image[name_start..].rfind(':') {
        Some(i) => (&image[..name_start + i], &image[name_start + i + 1..]),
        None => (image, "latest"),
    }
}

fn log_text(output: LogOutput) -> String {
    match output {
        LogOutput::StdOut { message }
        | LogOutput::StdErr { message }
        | LogOutput::Console { message }
        | LogOutput::StdIn { message } => String::from_utf8_lossy(&message).into_owned(),
    }
}

#[async_trait]
impl ContainerEngine for BollardEngine {
    fn runtime(&self) -> ContainerRuntime {
        self.runtime
    }

    async fn ping(&self) -> Result<(), EngineError> {
        self.docker.ping().await?;
        Ok(())
    }

    async fn version(&self) -> Result<EngineVersion, EngineError> {
        let version = self.docker.version().await?;
        Ok(EngineVersion {
            version: version.version,
            api_version: version.api_version,
        })
    }

    async fn pull_image(&self, image: &str) -> Result<(), EngineError> {
        let (repo, tag) = split_image_ref(image);
        info!("Pulling image {}", image);

        let options = CreateImageOptions {
            from_image: repo,
            tag,
            ..Default::default()
        };
        let mut stream = Box::pin(self.docker.create_image(Some(options), None, None));
        while let Some(progress) = stream.next().await {
            let progress = progress?;
            if let Some(status) = progress.status {
                debug!("pull {}: {}", image, status);
            }
        }
        Ok(())
    }

    async fn inspect_container(
        &self,
        name: &str,
    ) -> Result<Option<ContainerStatus>, EngineError> {
        let details = match self
            .docker
            .inspect_container(name, None::<InspectContainerOptions>)
            .await
        {
            Ok(details) => details,
            Err(e) => {
                let err = EngineError::from(e);
                if err.is_not_found() {
                    return Ok(None);
                }
                return Err(err);
            }
        };

        let state = details.state.unwrap_or_default();
        Ok(Some(ContainerStatus {
            id: details.id.unwrap_or_default(),
            name: name.to_string(),
            state: state
                .status
                .map(|s| s.to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            running: state.running.unwrap_or(false),
            image: details.config.and_then(|c| c.image),
        }))
    }

    async fn run_container(&self, spec: &ContainerSpec) -> Result<String, EngineError> {
        let options = CreateContainerOptions {
            name: spec.name.clone(),
            ..Default::default()
        };
        let created = self
            .docker
            .create_container(Some(options), Self::create_options(spec))
            .await?;
        for warning in &created.warnings {
            debug!("create {}: {}", spec.name, warning);
        }

        self.start_container(&spec.name).await?;
        info!("Started container {} ({})", spec.name, spec.image);
        Ok(created.id)
    }

    async fn start_container(&self, name: &str) -> Result<(), EngineError> {
        self.docker
            .start_container(name, None::<StartContainerOptions<String>>)
            .await?;
        Ok(())
    }

    async fn stop_container(&self, name: &str, timeout: Duration) -> Result<(), EngineError> {
        let options = StopContainerOptions {
            t: timeout.as_secs() as i64,
        };
        match self.docker.stop_container(name, Some(options)).await {
            Ok(()) => Ok(()),
            // 304: already stopped
            Err(bollard::errors::Error::DockerResponseServerError {
                status_code: 304, ..
            }) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn restart_container(
        &self,
        name: &str,
        timeout: Duration,
    ) -> Result<(), EngineError> {
        let options = RestartContainerOptions {
            t: timeout.as_secs() as isize,
        };
        self.docker.restart_container(name, Some(options)).await?;
        Ok(())
    }

    async fn remove_container(&self, name: &str, force: bool) -> Result<(), EngineError> {
        let options = RemoveContainerOptions {
            force,
            ..Default::default()
        };
        self.docker.remove_container(name, Some(options)).await?;
        Ok(())
    }

    async fn remove_volume(&self, name: &str) -> Result<(), EngineError> {
        self.docker.remove_volume(name, None).await?;
        Ok(())
    }

    async fn logs(&self, name: &str, tail: usize) -> Result<String, EngineError> {
        let options = LogsOptions::<String> {
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let mut text = String::new();
        let mut stream = Box::pin(self.docker.logs(name, Some(options)));
        while let Some(chunk) = stream.next().await {
            text.push_str(&log_text(chunk?));
        }
        Ok(text)
    }

    async fn follow_logs(
        &self,
        name: &str,
        tail: usize,
        sink: LogSink<'_>,
    ) -> Result<(), EngineError> {
        let options = LogsOptions::<String> {
            follow: true,
            stdout: true,
            stderr: true,
            tail: tail.to_string(),
            ..Default::default()
        };

        let mut stream = Box::pin(self.docker.logs(name, Some(options)));
        while let Some(chunk) = stream.next().await {
            sink(&log_text(chunk?));
        }
        Ok(())
    }
}
