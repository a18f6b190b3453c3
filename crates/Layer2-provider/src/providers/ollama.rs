//! Ollama (local) runtime client
//!
//! Health and model listing go through the HTTP API; pulls shell out to the
//! `ollama` CLI so progress and registry auth behave as they do for users.

use crate::error::ProviderError;
use crate::model::ModelRuntime;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

/// Host-side API base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// URL the Open WebUI container uses to reach Ollama on the host
pub const DEFAULT_CONTAINER_API_URL: &str = "http://host.docker.internal:11434/api";

/// Overrides [`DEFAULT_BASE_URL`]
pub const BASE_URL_ENV: &str = "OLLAMA_BASE_URL";

/// Overrides [`DEFAULT_CONTAINER_API_URL`]
pub const CONTAINER_API_URL_ENV: &str = "OLLAMA_API_BASE_URL";

const HEALTH_TIMEOUT: Duration = Duration::from_secs(10);
const PULL_TIMEOUT: Duration = Duration::from_secs(300);

/// Host-side base URL, honoring `OLLAMA_BASE_URL`
pub fn base_url_from_env() -> String {
    env_or(BASE_URL_ENV, DEFAULT_BASE_URL)
}

/// Container-side API URL, honoring `OLLAMA_API_BASE_URL`
pub fn container_api_url() -> String {
    env_or(CONTAINER_API_URL_ENV, DEFAULT_CONTAINER_API_URL)
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().trim_end_matches('/').to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

/// Ollama client
pub struct OllamaClient {
    client: Client,
    base_url: String,
    command: String,
    pull_timeout: Duration,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(HEALTH_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            command: "ollama".to_string(),
            pull_timeout: PULL_TIMEOUT,
        })
    }

    /// Client for [`base_url_from_env`]
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::new(base_url_from_env())
    }

    /// Use another executable for `pull`
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    pub fn with_pull_timeout(mut self, timeout: Duration) -> Self {
        self.pull_timeout = timeout;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn tags_url(&self) -> String {
        format!("{}/api/tags", self.base_url)
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelEntry>,
}

#[derive(Deserialize)]
struct ModelEntry {
    name: String,
}

#[async_trait]
impl ModelRuntime for OllamaClient {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn health(&self) -> Result<(), ProviderError> {
        let response = self.client.get(self.tags_url()).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::ServerError(format!(
                "{} returned {}",
                self.tags_url(),
                response.status()
            )));
        }
        Ok(())
    }

    async fn list_models(&self) -> Result<Vec<String>, ProviderError> {
        let response = self.client.get(self.tags_url()).send().await?;
        if !response.status().is_success() {
            return Err(ProviderError::ServerError(format!(
                "Failed to list models: {}",
                response.status()
            )));
        }

        let tags: TagsResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn pull_model(&self, model: &str) -> Result<(), ProviderError> {
        info!("Pulling Ollama model {}", model);

        let child = Command::new(&self.command)
            .args(["pull", model])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| ProviderError::CommandNotFound(format!("{}: {}", self.command, e)))?;

        let output = tokio::time::timeout(self.pull_timeout, child.wait_with_output())
            .await
            .map_err(|_| ProviderError::PullTimeout(model.to_string()))?
            .map_err(|e| ProviderError::PullFailed {
                model: model.to_string(),
                message: e.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let message = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ProviderError::PullFailed {
                model: model.to_string(),
                message,
            });
        }

        debug!("ollama pull {} finished", model);
        Ok(())
    }
}
