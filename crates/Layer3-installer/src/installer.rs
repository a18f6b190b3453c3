//! Container lifecycle manager
//!
//! install / uninstall / start / stop / restart / update / status / logs for
//! the single `open-webui` container. Mutating operations hold the operation
//! lock for their whole duration.

use crate::lock::OperationLock;
use crate::requirements::RequirementsValidator;
use crate::status::{InstallState, Status};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use webui_engine::{
    ContainerEngine, ContainerSpec, EngineError, LaunchScript, LogSink, RestartPolicy,
    VolumeMount, DEFAULT_STOP_TIMEOUT,
};
use webui_foundation::{
    Error, HostInfo, InstallPaths, InstallationConfig, Result, SecretLoader, DEFAULT_IMAGE,
    DEFAULT_MODEL, DEFAULT_PORT,
};
use webui_provider::ModelRuntime;

// ============================================================================
// 컨테이너 상수
// ============================================================================

pub const CONTAINER_NAME: &str = "open-webui";
pub const VOLUME_NAME: &str = "open-webui";
pub const DATA_DIR: &str = "/app/backend/data";
pub const CONTAINER_PORT: u16 = 8080;
pub const HOST_GATEWAY: &str = "host.docker.internal:host-gateway";
pub const OLLAMA_URL_ENV: &str = "OLLAMA_API_BASE_URL";

// ============================================================================
// 사용자 노출 메시지
// ============================================================================

pub const ALREADY_INSTALLED: &str = "Open WebUI is already installed. Use --force to reinstall.";
pub const NOT_INSTALLED: &str = "Open WebUI is not installed";
pub const CONTAINER_NOT_RUNNING: &str = "Open WebUI container is not running";

/// Parameters for `install`
#[derive(Debug, Clone)]
pub struct InstallOptions {
    pub model: String,
    pub port: u16,
    pub force: bool,
    /// `None` uses the default image
    pub image: Option<String>,
}

impl Default for InstallOptions {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            port: DEFAULT_PORT,
            force: false,
            image: None,
        }
    }
}

pub struct Installer {
    paths: InstallPaths,
    engine: Arc<dyn ContainerEngine>,
    models: Arc<dyn ModelRuntime>,
    host: HostInfo,
    secrets: SecretLoader,
    ollama_api_url: String,
}

impl Installer {
    pub fn new(
        paths: InstallPaths,
        engine: Arc<dyn ContainerEngine>,
        models: Arc<dyn ModelRuntime>,
        host: HostInfo,
    ) -> Self {
        Self {
            paths,
            engine,
            models,
            host,
            secrets: SecretLoader::default(),
            ollama_api_url: webui_provider::container_api_url(),
        }
    }

    pub fn with_secrets(mut self, secrets: SecretLoader) -> Self {
        self.secrets = secrets;
        self
    }

    /// URL the container uses to reach Ollama
    pub fn with_ollama_api_url(mut self, url: impl Into<String>) -> Self {
        self.ollama_api_url = url.into();
        self
    }

    pub fn paths(&self) -> &InstallPaths {
        &self.paths
    }

    pub fn engine(&self) -> &dyn ContainerEngine {
        self.engine.as_ref()
    }

    pub fn validator(&self) -> RequirementsValidator<'_> {
        RequirementsValidator::new(&self.host, self.engine.as_ref(), self.models.as_ref())
    }

    // ========================================================================
    // Install / Uninstall
    // ========================================================================

    pub async fn install(&self, options: &InstallOptions) -> Result<InstallationConfig> {
        info!("Starting installation");
        if !options.force && self.paths.is_installed() {
            warn!("Installation aborted: already installed");
            return Err(Error::installer(ALREADY_INSTALLED));
        }

        match self.run_install(options).await {
            Ok(config) => {
                info!("Installation complete");
                Ok(config)
            }
            Err(e) => {
                error!("Installation failed: {}", e);
                Err(e.wrap("Installation failed"))
            }
        }
    }

    async fn run_install(&self, options: &InstallOptions) -> Result<InstallationConfig> {
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        self.validator().validate().await?;
        self.paths.ensure_dir()?;

        let image = options.image.as_deref().unwrap_or(DEFAULT_IMAGE);
        self.pull_image(image).await?;

        info!("Pulling Ollama model {}", options.model);
        self.models.ensure_model(&options.model).await?;

        let config = InstallationConfig::new(image, options.port, &options.model)
            .with_runtime(self.engine.runtime());
        let spec = self.write_launch_script(&config)?;
        self.paths.save_config(&config)?;

        self.replace_container(&spec).await?;
        Ok(config)
    }

    /// Remove container, volume and config dir; safe to repeat
    pub async fn uninstall(&self) -> Result<()> {
        info!("Starting uninstallation");
        match self.run_uninstall().await {
            Ok(()) => {
                info!("Uninstallation complete");
                Ok(())
            }
            Err(e) => {
                error!("Uninstallation failed: {}", e);
                Err(e.wrap("Uninstallation failed"))
            }
        }
    }

    async fn run_uninstall(&self) -> Result<()> {
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        self.remove_container_if_present().await?;

        match self.engine.remove_volume(VOLUME_NAME).await {
            Ok(()) => info!("Removed volume {}", VOLUME_NAME),
            Err(e) if e.is_not_found() => debug!("Volume {} not found", VOLUME_NAME),
            Err(e) => return Err(e.into()),
        }

        self.paths.remove_all()?;
        Ok(())
    }

    // ========================================================================
    // Start / Stop / Restart
    // ========================================================================

    /// Start the container, recreating it from the stored config if it is gone
    pub async fn start(&self) -> Result<()> {
        match self.run_start().await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!("Start failed: {}", e);
                Err(e.into_installer("Start failed"))
            }
        }
    }

    async fn run_start(&self) -> Result<()> {
        let config = self.require_config()?;
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        let result = match self.engine.inspect_container(CONTAINER_NAME).await {
            Ok(Some(status)) if status.running => {
                info!("Open WebUI is already running");
                Ok(())
            }
            Ok(Some(_)) => self.engine.start_container(CONTAINER_NAME).await,
            Ok(None) => {
                info!("Container missing, recreating from {}", config.image);
                self.engine
                    .run_container(&self.container_spec(&config))
                    .await
                    .map(|_| ())
            }
            Err(e) => Err(e),
        };

        result.map_err(|e| Error::installer(format!("Failed to start Open WebUI container: {}", e)))
    }

    pub async fn stop(&self) -> Result<()> {
        match self.run_stop().await {
            Ok(()) => {
                info!("Open WebUI stopped");
                Ok(())
            }
            Err(e) => {
                error!("Stop failed: {}", e);
                Err(e.into_installer("Stop failed"))
            }
        }
    }

    async fn run_stop(&self) -> Result<()> {
        self.require_container().await?;
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        self.engine
            .stop_container(CONTAINER_NAME, DEFAULT_STOP_TIMEOUT)
            .await
            .map_err(|e| Error::installer(format!("Failed to stop Open WebUI container: {}", e)))
    }

    pub async fn restart(&self) -> Result<()> {
        match self.run_restart().await {
            Ok(()) => {
                info!("Open WebUI restarted");
                Ok(())
            }
            Err(e) => {
                error!("Restart failed: {}", e);
                Err(e.into_installer("Restart failed"))
            }
        }
    }

    async fn run_restart(&self) -> Result<()> {
        self.require_container().await?;
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        self.engine
            .restart_container(CONTAINER_NAME, DEFAULT_STOP_TIMEOUT)
            .await
            .map_err(|e| {
                Error::installer(format!("Failed to restart Open WebUI container: {}", e))
            })
    }

    // ========================================================================
    // Update
    // ========================================================================

    /// Pull `image` (or the default), then recreate the container on it
    pub async fn update(&self, image: Option<&str>) -> Result<InstallationConfig> {
        let mut config = self
            .require_config()
            .map_err(|e| e.into_installer("Update failed"))?;
        info!("Starting update");

        match self.run_update(&mut config, image).await {
            Ok(()) => {
                info!("Update complete");
                Ok(config)
            }
            Err(e) => {
                error!("Update failed: {}", e);
                Err(e.wrap("Update failed"))
            }
        }
    }

    async fn run_update(&self, config: &mut InstallationConfig, image: Option<&str>) -> Result<()> {
        let _lock = OperationLock::acquire(self.paths.config_dir())?;

        let image = image.unwrap_or(DEFAULT_IMAGE);
        self.pull_image(image).await?;

        config.image = image.to_string();
        config.version = env!("CARGO_PKG_VERSION").to_string();
        config.runtime = self.engine.runtime();
        let spec = self.write_launch_script(config)?;
        self.paths.save_config(config)?;

        self.replace_container(&spec).await
    }

    // ========================================================================
    // Status / Logs
    // ========================================================================

    /// Read-only snapshot; engine failures show up as `InstalledUnknown`
    pub async fn get_status(&self) -> Status {
        if !self.paths.is_installed() {
            return Status::not_installed();
        }

        let config = match self.paths.load_config() {
            Ok(config) => config,
            Err(e) => {
                warn!("Could not read {}: {}", self.paths.config_file().display(), e);
                return Status::new(
                    None,
                    None,
                    InstallState::InstalledUnknown(format!("unreadable config: {}", e)),
                );
            }
        };

        let container = self.engine.inspect_container(CONTAINER_NAME).await;
        let container_state = match &container {
            Ok(Some(status)) => Some(status.state.clone()),
            _ => None,
        };
        let state = InstallState::reconcile(true, container.as_ref().map(|c| c.as_ref()));
        Status::new(config.as_ref(), container_state, state)
    }

    /// Last `tail` log lines as text
    pub async fn logs(&self, tail: usize) -> Result<String> {
        self.require_container().await?;
        self.engine
            .logs(CONTAINER_NAME, tail)
            .await
            .map_err(|e| Error::installer(format!("Failed to read logs: {}", e)))
    }

    /// Stream logs into `sink` until the container stops
    pub async fn follow_logs(&self, tail: usize, sink: LogSink<'_>) -> Result<()> {
        self.require_container().await?;
        self.engine
            .follow_logs(CONTAINER_NAME, tail, sink)
            .await
            .map_err(|e| Error::installer(format!("Failed to read logs: {}", e)))
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Run spec for the stored config: port, volume, Ollama URL and secrets
    pub fn container_spec(&self, config: &InstallationConfig) -> ContainerSpec {
        let mut spec = ContainerSpec::new(CONTAINER_NAME, &config.image)
            .with_port(config.port, CONTAINER_PORT)
            .with_volume(VolumeMount::new(VOLUME_NAME, DATA_DIR))
            .with_env(OLLAMA_URL_ENV, &self.ollama_api_url)
            .with_extra_host(HOST_GATEWAY)
            .with_restart(RestartPolicy::UnlessStopped);

        for (name, value) in self.secrets.load_all() {
            debug!("Passing secret {} to the container", name);
            spec = spec.with_env(name, value);
        }
        spec
    }

    fn write_launch_script(&self, config: &InstallationConfig) -> Result<ContainerSpec> {
        let spec = self.container_spec(config);
        let has_secrets = spec.env.keys().any(|k| k != OLLAMA_URL_ENV);

        let script = LaunchScript::new(self.engine.runtime(), &spec);
        let script = if has_secrets { script.private() } else { script };
        script.write(&self.paths.launch_script())?;
        Ok(spec)
    }

    async fn pull_image(&self, image: &str) -> Result<()> {
        info!("Pulling Open WebUI image {}", image);
        self.engine
            .pull_image(image)
            .await
            .map_err(|e| Error::installer(format!("Failed to pull Open WebUI image: {}", e)))
    }

    /// Stop and remove whatever holds the name, then run `spec`
    async fn replace_container(&self, spec: &ContainerSpec) -> Result<()> {
        self.remove_container_if_present()
            .await
            .map_err(|e| Error::installer(format!("Failed to stop existing container: {}", e)))?;

        self.engine.run_container(spec).await.map_err(|e| {
            Error::installer(format!("Failed to start Open WebUI container: {}", e))
        })?;
        Ok(())
    }

    async fn remove_container_if_present(&self) -> std::result::Result<(), EngineError> {
        let Some(status) = self.engine.inspect_container(CONTAINER_NAME).await? else {
            return Ok(());
        };

        if status.running {
            if let Err(e) = self
                .engine
                .stop_container(CONTAINER_NAME, DEFAULT_STOP_TIMEOUT)
                .await
            {
                if !e.is_not_found() {
                    return Err(e);
                }
            }
        }

        match self.engine.remove_container(CONTAINER_NAME, true).await {
            Ok(()) => {
                info!("Removed container {}", CONTAINER_NAME);
                Ok(())
            }
            Err(e) if e.is_not_found() => Ok(()),
            Err(e) => Err(e),
        }
    }

    fn require_config(&self) -> Result<InstallationConfig> {
        self.paths
            .load_config()?
            .ok_or_else(|| Error::installer(NOT_INSTALLED))
    }

    async fn require_container(&self) -> Result<()> {
        match self.engine.inspect_container(CONTAINER_NAME).await {
            Ok(Some(_)) => Ok(()),
            Ok(None) => Err(Error::installer(CONTAINER_NOT_RUNNING)),
            Err(e) => Err(Error::installer(format!(
                "Failed to inspect Open WebUI container: {}",
                e
            ))),
        }
    }
}
