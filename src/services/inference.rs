use thiserror::Error;

use crate::models::PromptBundle;

/// Provider-side failure, split by how the caller should react.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Capacity exhaustion on the provider side. Retrying the same model
    /// after a short delay may succeed.
    #[error("model overloaded: {0}")]
    Overloaded(String),
    /// Everything else: auth, malformed request, quota, transport. Not
    /// worth retrying against the same model.
    #[error("provider error: {0}")]
    Api(String),
}

impl ProviderError {
    pub fn is_transient(&self) -> bool {
        matches!(self, ProviderError::Overloaded(_))
    }
}

/// Trait for structured-output inference providers (Gemini, mocks).
#[async_trait::async_trait]
pub trait InferenceProvider: Send + Sync {
    /// Requests a schema-constrained analysis from a single model and
    /// returns the raw JSON text the model produced.
    async fn generate(&self, model_id: &str, bundle: &PromptBundle)
        -> Result<String, ProviderError>;
}
