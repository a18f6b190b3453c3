//! System requirements validation
//!
//! Single pass, fail-fast, no retries. Checks run in this order:
//! host OS, engine API version, engine reachability, Ollama health.

use tracing::{debug, info, warn};
use webui_engine::ContainerEngine;
use webui_foundation::{ContainerRuntime, Error, HostInfo, Result};
use webui_provider::{ModelRuntime, ProviderError};

/// Oldest engine API version the installer talks to
pub const MIN_ENGINE_API: (u32, u32) = (1, 41);

pub const UNSUPPORTED_OS: &str = "This installer only supports macOS and Linux";

pub struct RequirementsValidator<'a> {
    host: &'a HostInfo,
    engine: &'a dyn ContainerEngine,
    models: &'a dyn ModelRuntime,
}

impl<'a> RequirementsValidator<'a> {
    pub fn new(
        host: &'a HostInfo,
        engine: &'a dyn ContainerEngine,
        models: &'a dyn ModelRuntime,
    ) -> Self {
        Self {
            host,
            engine,
            models,
        }
    }

    /// Run every check, stopping at the first failure
    pub async fn validate(&self) -> Result<()> {
        debug!("Checking system requirements on {}", self.host.summary());

        self.check_os()?;
        self.check_engine_version().await?;
        self.check_engine().await?;
        self.check_models().await?;

        info!("System requirements satisfied");
        Ok(())
    }

    fn check_os(&self) -> Result<()> {
        if !self.host.os.is_supported() {
            return Err(Error::requirements(UNSUPPORTED_OS));
        }
        Ok(())
    }

    /// An engine that does not report a usable version is left to the ping
    async fn check_engine_version(&self) -> Result<()> {
        let name = self.engine.runtime().display_name();
        let version = match self.engine.version().await {
            Ok(version) => version,
            Err(e) => {
                debug!("{} version unavailable: {}", name, e);
                return Ok(());
            }
        };

        match version.api() {
            Some(api) if api < MIN_ENGINE_API => Err(Error::requirements(format!(
                "{} API version {}.{} is too old ({}.{} or newer is required)",
                name, api.0, api.1, MIN_ENGINE_API.0, MIN_ENGINE_API.1
            ))),
            Some(_) => Ok(()),
            None => {
                warn!(
                    "Could not parse {} API version {:?}, continuing",
                    name, version.api_version
                );
                Ok(())
            }
        }
    }

    async fn check_engine(&self) -> Result<()> {
        if let Err(e) = self.engine.ping().await {
            debug!("{} ping failed: {}", self.engine.runtime().display_name(), e);
            return Err(Error::requirements(self.engine_unreachable_message()));
        }
        Ok(())
    }

    fn engine_unreachable_message(&self) -> &'static str {
        match self.engine.runtime() {
            ContainerRuntime::Podman => "Podman is not running or not installed",
            ContainerRuntime::Docker if self.host.has_podman => {
                "Docker is not running or not installed. Podman detected; use --runtime podman"
            }
            ContainerRuntime::Docker => "Docker is not running or not installed",
        }
    }

    async fn check_models(&self) -> Result<()> {
        match self.models.health().await {
            Ok(()) => Ok(()),
            Err(ProviderError::ServerError(msg)) => {
                debug!("{} health check failed: {}", self.models.name(), msg);
                Err(Error::requirements("Ollama is not running"))
            }
            Err(ProviderError::Timeout(_)) => Err(Error::requirements(
                "Timeout connecting to Ollama - check if it's running",
            )),
            Err(e) => {
                debug!("{} health check failed: {}", self.models.name(), e);
                Err(Error::requirements("Ollama is not installed or not running"))
            }
        }
    }
}
