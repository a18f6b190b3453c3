//! # webui-provider
//!
//! Local LLM runtime client for the Open WebUI installer.
//!
//! ## Features
//! - Health check against `/api/tags` (10s timeout)
//! - Model listing and post-pull verification
//! - Model pull via the `ollama` CLI (300s timeout)
//! - `OLLAMA_BASE_URL` / `OLLAMA_API_BASE_URL` overrides

pub mod error;
pub mod model;
pub mod providers;

// Core trait
pub use model::{model_matches, ModelRuntime};

// Error
pub use error::ProviderError;

// Implementations
pub use providers::ollama::{
    base_url_from_env, container_api_url, OllamaClient, DEFAULT_BASE_URL,
    DEFAULT_CONTAINER_API_URL,
};
