//! Model runtime trait
//!
//! The installer only needs three things from the local LLM runtime:
//! is it up, which models does it have, and pull one more.

use crate::error::ProviderError;
use async_trait::async_trait;

#[async_trait]
pub trait ModelRuntime: Send + Sync {
    /// Human-readable runtime name for messages
    fn name(&self) -> &str;

    /// Succeeds when the runtime's API answers with a success status
    async fn health(&self) -> Result<(), ProviderError>;

    /// Names of locally available models
    async fn list_models(&self) -> Result<Vec<String>, ProviderError>;

    /// Pull a model
    async fn pull_model(&self, model: &str) -> Result<(), ProviderError>;

    /// Whether `model` is available locally
    async fn has_model(&self, model: &str) -> Result<bool, ProviderError> {
        let models = self.list_models().await?;
        Ok(models.iter().any(|name| model_matches(name, model)))
    }

    /// Pull, then confirm the model shows up
    async fn ensure_model(&self, model: &str) -> Result<(), ProviderError> {
        self.pull_model(model).await?;
        if self.has_model(model).await? {
            Ok(())
        } else {
            Err(ProviderError::ModelNotFound(model.to_string()))
        }
    }
}

/// `llama2` matches `llama2:latest`; an explicit tag must match exactly
pub fn model_matches(listed: &str, requested: &str) -> bool {
    if listed == requested {
        return true;
    }
    !requested.contains(':') && listed == format!("{}:latest", requested)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_matches() {
        assert!(model_matches("llama2:latest", "llama2"));
        assert!(model_matches("llama2:7b", "llama2:7b"));
        assert!(!model_matches("llama2:7b", "llama2"));
        assert!(!model_matches("llama2:latest", "llama2:7b"));
        assert!(!model_matches("llama3:latest", "llama2"));
    }
}
