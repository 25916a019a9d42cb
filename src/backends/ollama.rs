use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use std::time::Duration;

use crate::error::GenerationError;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest
{   pub model: String
  , pub prompt: String
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaGenerateResponse
{   pub response: String
}

// ===== Adapter =====

/// Local Ollama server backend. Needs no credential; load is
/// a reachability check against the running server.
pub struct OllamaBackend
{   api_base: String
  , model: String
  , timeout: Duration
  , http_client: reqwest::Client
}

impl OllamaBackend
{   pub fn new(
      api_base: String
    , model: String
    , timeout: Duration
    ) -> Self
    {   debug!("Creating OllamaBackend for: {}", model);
        OllamaBackend
        {   api_base
          , model
          , timeout
          , http_client: reqwest::Client::new()
        }
    }
}

#[async_trait::async_trait]
impl crate::backends::GenerationBackend for OllamaBackend
{   async fn load(&self) -> Result<(), GenerationError>
    {   debug!("Checking Ollama server at: {}", self.api_base);

        let response = self.http_client
          .get(format!("{}/api/tags", self.api_base))
          .timeout(self.timeout)
          .send()
          .await
          .map_err(|e| {
            error!("Ollama unreachable: {}", e);
            GenerationError::from_transport(e)
          })?;

        let status = response.status();
        trace!("Ollama tags response: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Ollama server error: {}", error_text);
            return Err(GenerationError::from_status(
              status.as_u16(), error_text
            ));
        }

        debug!("Ollama server reachable");
        Ok(())
    }

    async fn generate(&self, prompt: &str)
      -> Result<String, GenerationError>
    {   debug!("Generating via Ollama: {}", self.model);

        let request = OllamaGenerateRequest
        {   model: self.model.clone()
          , prompt: prompt.to_string()
          , stream: false
        };

        trace!("Ollama request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/api/generate", self.api_base))
          .header("Content-Type", "application/json")
          .timeout(self.timeout)
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("HTTP error: {}", e);
            GenerationError::from_transport(e)
          })?;

        let status = response.status();
        trace!("Ollama response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Ollama API error: {}", error_text);
            return Err(GenerationError::from_status(
              status.as_u16(), error_text
            ));
        }

        let generated: OllamaGenerateResponse
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            GenerationError::Unknown(e.to_string())
          })?;

        Ok(generated.response)
    }
}
