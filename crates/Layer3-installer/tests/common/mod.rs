//! In-memory fakes shared by the installer tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tempfile::TempDir;
use webui_engine::{
    ContainerEngine, ContainerSpec, ContainerStatus, EngineError, EngineVersion, LogSink,
};
use webui_foundation::{ContainerRuntime, HostInfo, InstallPaths, OsType, Result, SecretLoader};
use webui_installer::{Installer, ServiceManager};
use webui_provider::{ModelRuntime, ProviderError, DEFAULT_CONTAINER_API_URL};

// ============================================================================
// Container engine
// ============================================================================

#[derive(Debug)]
pub struct EngineState {
    pub reachable: bool,
    pub api_version: Option<String>,
    pub fail_inspect: bool,
    /// Current container and whether it runs
    pub container: Option<(ContainerSpec, bool)>,
    pub volume: bool,
    pub pulled: Vec<String>,
    pub runs: Vec<ContainerSpec>,
    pub starts: usize,
    pub stops: usize,
    pub restarts: usize,
    pub removals: usize,
    pub volume_removals: usize,
    pub log_lines: Vec<String>,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            reachable: true,
            api_version: Some("1.45".to_string()),
            fail_inspect: false,
            container: None,
            volume: false,
            pulled: vec![],
            runs: vec![],
            starts: 0,
            stops: 0,
            restarts: 0,
            removals: 0,
            volume_removals: 0,
            log_lines: vec![],
        }
    }
}

pub struct FakeEngine {
    runtime: ContainerRuntime,
    state: Mutex<EngineState>,
}

impl FakeEngine {
    pub fn new(runtime: ContainerRuntime) -> Self {
        Self {
            runtime,
            state: Mutex::new(EngineState::default()),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, EngineState> {
        self.state.lock().unwrap()
    }

    fn missing(name: &str) -> EngineError {
        EngineError::NotFound(format!("No such container: {}", name))
    }
}

#[async_trait]
impl ContainerEngine for FakeEngine {
    fn runtime(&self) -> ContainerRuntime {
        self.runtime
    }

    async fn ping(&self) -> std::result::Result<(), EngineError> {
        if self.state().reachable {
            Ok(())
        } else {
            Err(EngineError::Unavailable("connection refused".into()))
        }
    }

    async fn version(&self) -> std::result::Result<EngineVersion, EngineError> {
        let state = self.state();
        if !state.reachable {
            return Err(EngineError::Unavailable("connection refused".into()));
        }
        Ok(EngineVersion {
            version: Some("27.0.0".into()),
            api_version: state.api_version.clone(),
        })
    }

    async fn pull_image(&self, image: &str) -> std::result::Result<(), EngineError> {
        self.state().pulled.push(image.to_string());
        Ok(())
    }

    async fn inspect_container(
        &self,
        name: &str,
    ) -> std::result::Result<Option<ContainerStatus>, EngineError> {
        let state = self.state();
        if state.fail_inspect {
            return Err(EngineError::Unavailable("engine went away".into()));
        }
        Ok(state.container.as_ref().map(|(spec, running)| ContainerStatus {
            id: "c0ffee".into(),
            name: name.to_string(),
            state: if *running { "running" } else { "exited" }.into(),
            running: *running,
            image: Some(spec.image.clone()),
        }))
    }

    async fn run_container(&self, spec: &ContainerSpec) -> std::result::Result<String, EngineError> {
        let mut state = self.state();
        if state.container.is_some() {
            return Err(EngineError::Api {
                status: 409,
                message: format!("name {} already in use", spec.name),
            });
        }
        state.container = Some((spec.clone(), true));
        state.volume = true;
        state.runs.push(spec.clone());
        Ok("c0ffee".into())
    }

    async fn start_container(&self, name: &str) -> std::result::Result<(), EngineError> {
        let mut state = self.state();
        let (_, running) = state.container.as_mut().ok_or_else(|| Self::missing(name))?;
        *running = true;
        state.starts += 1;
        Ok(())
    }

    async fn stop_container(
        &self,
        name: &str,
        _timeout: Duration,
    ) -> std::result::Result<(), EngineError> {
        let mut state = self.state();
        let (_, running) = state.container.as_mut().ok_or_else(|| Self::missing(name))?;
        *running = false;
        state.stops += 1;
        Ok(())
    }

    async fn restart_container(
        &self,
        name: &str,
        _timeout: Duration,
    ) -> std::result::Result<(), EngineError> {
        let mut state = self.state();
        let (_, running) = state.container.as_mut().ok_or_else(|| Self::missing(name))?;
        *running = true;
        state.restarts += 1;
        Ok(())
    }

    async fn remove_container(
        &self,
        name: &str,
        _force: bool,
    ) -> std::result::Result<(), EngineError> {
        let mut state = self.state();
        if state.container.take().is_none() {
            return Err(Self::missing(name));
        }
        state.removals += 1;
        Ok(())
    }

    async fn remove_volume(&self, name: &str) -> std::result::Result<(), EngineError> {
        let mut state = self.state();
        if !state.volume {
            return Err(EngineError::NotFound(format!("No such volume: {}", name)));
        }
        state.volume = false;
        state.volume_removals += 1;
        Ok(())
    }

    async fn logs(&self, _name: &str, tail: usize) -> std::result::Result<String, EngineError> {
        let state = self.state();
        let skip = state.log_lines.len().saturating_sub(tail);
        Ok(state
            .log_lines
            .iter()
            .skip(skip)
            .map(|line| format!("{}\n", line))
            .collect())
    }

    async fn follow_logs(
        &self,
        name: &str,
        tail: usize,
        sink: LogSink<'_>,
    ) -> std::result::Result<(), EngineError> {
        // one frame per line, newline kept, like the engine's stream
        let text = self.logs(name, tail).await?;
        for frame in text.split_inclusive('\n') {
            sink(frame);
        }
        Ok(())
    }
}

// ============================================================================
// Model runtime
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    Up,
    ServerError,
    Timeout,
    Refused,
}

#[derive(Debug)]
pub struct ModelState {
    pub health: Health,
    pub pulled: Vec<String>,
    pub available: Vec<String>,
    /// Pull "succeeds" without the model appearing
    pub pull_is_noop: bool,
}

pub struct FakeModels {
    state: Mutex<ModelState>,
}

impl FakeModels {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(ModelState {
                health: Health::Up,
                pulled: vec![],
                available: vec![],
                pull_is_noop: false,
            }),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, ModelState> {
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl ModelRuntime for FakeModels {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn health(&self) -> std::result::Result<(), ProviderError> {
        match self.state().health {
            Health::Up => Ok(()),
            Health::ServerError => Err(ProviderError::ServerError("503".into())),
            Health::Timeout => Err(ProviderError::Timeout("10s".into())),
            Health::Refused => Err(ProviderError::Network("connection refused".into())),
        }
    }

    async fn list_models(&self) -> std::result::Result<Vec<String>, ProviderError> {
        Ok(self.state().available.clone())
    }

    async fn pull_model(&self, model: &str) -> std::result::Result<(), ProviderError> {
        let mut state = self.state();
        state.pulled.push(model.to_string());
        if !state.pull_is_noop {
            let listed = if model.contains(':') {
                model.to_string()
            } else {
                format!("{}:latest", model)
            };
            state.available.push(listed);
        }
        Ok(())
    }
}

// ============================================================================
// Service manager
// ============================================================================

#[derive(Default)]
pub struct FakeLaunchctl {
    pub loaded: Mutex<Vec<PathBuf>>,
    pub unloaded: Mutex<Vec<PathBuf>>,
}

#[async_trait]
impl ServiceManager for FakeLaunchctl {
    async fn load(&self, plist: &Path) -> Result<()> {
        self.loaded.lock().unwrap().push(plist.to_path_buf());
        Ok(())
    }

    async fn unload(&self, plist: &Path) -> Result<()> {
        self.unloaded.lock().unwrap().push(plist.to_path_buf());
        Ok(())
    }
}

// ============================================================================
// Fixture
// ============================================================================

pub const TEST_SECRET: &str = "WEBUI_INSTALLER_FIXTURE_TOKEN";

pub struct Fixture {
    pub dir: TempDir,
    pub engine: Arc<FakeEngine>,
    pub models: Arc<FakeModels>,
    pub host: HostInfo,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_runtime(ContainerRuntime::Docker)
    }

    pub fn with_runtime(runtime: ContainerRuntime) -> Self {
        Self {
            dir: tempfile::tempdir().unwrap(),
            engine: Arc::new(FakeEngine::new(runtime)),
            models: Arc::new(FakeModels::new()),
            host: HostInfo::bare(OsType::Linux),
        }
    }

    pub fn config_dir(&self) -> PathBuf {
        self.dir.path().join(".openwebui")
    }

    pub fn secrets_dir(&self) -> PathBuf {
        self.dir.path().join("secrets")
    }

    pub fn paths(&self) -> InstallPaths {
        InstallPaths::new(self.config_dir())
    }

    pub fn installer(&self) -> Installer {
        let engine: Arc<dyn ContainerEngine> = self.engine.clone();
        let models: Arc<dyn ModelRuntime> = self.models.clone();
        Installer::new(self.paths(), engine, models, self.host.clone())
            .with_secrets(SecretLoader::new(self.secrets_dir()).with_names([TEST_SECRET]))
            .with_ollama_api_url(DEFAULT_CONTAINER_API_URL)
    }
}
