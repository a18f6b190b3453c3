//! Runtime selection - resolved once at startup
//!
//! Docker is tried first unless Podman was asked for. When Docker does not
//! answer and Podman is installed, the Podman socket is tried instead.

use crate::docker::BollardEngine;
use crate::engine::ContainerEngine;
use crate::error::EngineError;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};
use webui_foundation::{ContainerRuntime, HostInfo};

/// Podman API socket.
///
/// `$XDG_RUNTIME_DIR/podman/podman.sock`, else the per-uid default under
/// `/run/user`.
pub fn podman_socket_path() -> PathBuf {
    match std::env::var_os("XDG_RUNTIME_DIR") {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir).join("podman").join("podman.sock"),
        _ => PathBuf::from(format!(
            "/run/user/{}/podman/podman.sock",
            users::get_current_uid()
        )),
    }
}

/// Decide which runtime to use from what was probed
pub fn resolve_runtime(
    preference: ContainerRuntime,
    docker_reachable: bool,
    podman_installed: bool,
) -> ContainerRuntime {
    match preference {
        ContainerRuntime::Podman => ContainerRuntime::Podman,
        ContainerRuntime::Docker if !docker_reachable && podman_installed => {
            ContainerRuntime::Podman
        }
        ContainerRuntime::Docker => ContainerRuntime::Docker,
    }
}

/// Connect to the preferred runtime, falling back to Podman.
///
/// An unreachable engine is still returned so requirement checks can report
/// it; only a client that cannot be built at all is an error.
pub async fn connect(
    preference: ContainerRuntime,
    host: &HostInfo,
) -> Result<Arc<dyn ContainerEngine>, EngineError> {
    if preference == ContainerRuntime::Podman {
        return Ok(Arc::new(podman_engine()?));
    }

    let docker = BollardEngine::docker();
    let docker_reachable = match &docker {
        Ok(engine) => engine.ping().await.is_ok(),
        Err(e) => {
            debug!("Docker client unavailable: {}", e);
            false
        }
    };

    match resolve_runtime(preference, docker_reachable, host.has_podman) {
        ContainerRuntime::Docker => Ok(Arc::new(docker?)),
        ContainerRuntime::Podman => {
            if let Ok(podman) = podman_engine() {
                if podman.ping().await.is_ok() {
                    info!("Docker is not reachable, using Podman");
                    return Ok(Arc::new(podman));
                }
            }
            warn!("Docker is not reachable and Podman did not answer");
            Ok(Arc::new(docker?))
        }
    }
}

fn podman_engine() -> Result<BollardEngine, EngineError> {
    if std::env::var_os("DOCKER_HOST").is_some() {
        return BollardEngine::podman_from_env();
    }
    podman_at_socket()
}

#[cfg(unix)]
fn podman_at_socket() -> Result<BollardEngine, EngineError> {
    let path = podman_socket_path();
    debug!("Podman socket: {}", path.display());
    BollardEngine::podman_socket(&path)
}

#[cfg(not(unix))]
fn podman_at_socket() -> Result<BollardEngine, EngineError> {
    BollardEngine::podman_from_env()
}

// Helper module for getting user ID
#[cfg(unix)]
mod users {
    pub fn get_current_uid() -> u32 {
        unsafe { libc::getuid() }
    }
}

#[cfg(not(unix))]
mod users {
    pub fn get_current_uid() -> u32 {
        1000
    }
}
