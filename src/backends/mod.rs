//! Backend adapters
//!
//! One adapter per backend kind, behind a single capability
//! trait. Everything past this boundary speaks the
//! GenerationError taxonomy; no backend-specific failure
//! leaks through.

pub mod hugging_face;
pub mod ollama;

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Uniform capability over one concrete generation backend
#[async_trait]
pub trait GenerationBackend: Send + Sync
{   /// Acquire or validate whatever the backend needs to
    /// serve. Bounded by the configured request timeout.
    async fn load(&self) -> Result<(), crate::error::GenerationError>;

    /// Perform one generation call
    async fn generate(&self, prompt: &str)
      -> Result<String, crate::error::GenerationError>;

    /// Release resources. No-op for stateless adapters.
    async fn unload(&self) {}
}

/// Build the adapter for a spec
pub fn build_adapter(
  spec: &crate::BackendSpec
, timeout: Duration
) -> Arc<dyn GenerationBackend>
{   match spec.kind
    {   crate::BackendKind::HuggingFace => {
          Arc::new(hugging_face::HuggingFaceBackend::new(
            spec.endpoint.clone()
          , spec.model.clone()
          , spec.credential.clone()
          , timeout
          ))
        }
      , crate::BackendKind::Ollama => {
          Arc::new(ollama::OllamaBackend::new(
            spec.endpoint.clone()
          , spec.model.clone()
          , timeout
          ))
        }
    }
}
