use serde::{Deserialize, Serialize};
use log::{debug, trace, error};
use std::time::Duration;

use crate::error::GenerationError;

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct HfGenerateRequest
{   pub inputs: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<HfParameters>
}

#[derive(Debug, Clone, Serialize)]
pub struct HfParameters
{   pub max_new_tokens: usize
}

#[derive(Debug, Clone, Deserialize)]
pub struct HfGenerated
{   pub generated_text: String
}

// ===== Adapter =====

/// Remote Hugging Face Inference API backend
pub struct HuggingFaceBackend
{   api_base: String
  , model: String
  , credential: Option<String>
  , timeout: Duration
  , http_client: reqwest::Client
}

impl HuggingFaceBackend
{   pub fn new(
      api_base: String
    , model: String
    , credential: Option<String>
    , timeout: Duration
    ) -> Self
    {   debug!("Creating HuggingFaceBackend for: {}", model);
        HuggingFaceBackend
        {   api_base
          , model
          , credential
          , timeout
          , http_client: reqwest::Client::new()
        }
    }

    fn bearer(&self) -> Result<String, GenerationError>
    {   match &self.credential
        {   Some(token) => Ok(format!("Bearer {}", token))
          , None => {
              error!("No credential for model: {}", self.model);
              Err(GenerationError::ConfigurationMissing(
                format!("HuggingFace:{}", self.model)
              ))
            }
        }
    }

    fn classify(status: u16, body: String) -> GenerationError
    {   if body.to_lowercase().contains("out of memory")
        {   GenerationError::ResourceExhausted(body)
        } else
        {   GenerationError::from_status(status, body)
        }
    }
}

#[async_trait::async_trait]
impl crate::backends::GenerationBackend for HuggingFaceBackend
{   /// Probe the model status endpoint to validate the
    /// credential and reachability before going Ready.
    async fn load(&self) -> Result<(), GenerationError>
    {   debug!("Loading Hugging Face model: {}", self.model);
        let bearer = self.bearer()?;

        let response = self.http_client
          .get(format!(
            "{}/status/{}", self.api_base, self.model
          ))
          .header("Authorization", bearer)
          .timeout(self.timeout)
          .send()
          .await
          .map_err(|e| {
            error!("Status probe failed: {}", e);
            GenerationError::from_transport(e)
          })?;

        let status = response.status();
        trace!("Status probe response: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Status probe rejected: {}", error_text);
            return Err(Self::classify(
              status.as_u16(), error_text
            ));
        }

        debug!("Hugging Face model reachable: {}", self.model);
        Ok(())
    }

    async fn generate(&self, prompt: &str)
      -> Result<String, GenerationError>
    {   debug!("Generating via Hugging Face: {}", self.model);
        let bearer = self.bearer()?;

        let request = HfGenerateRequest
        {   inputs: prompt.to_string()
          , parameters: Some(HfParameters
            {   max_new_tokens: 100
            })
        };

        trace!("HF request: {:?}", request);

        let response = self.http_client
          .post(format!(
            "{}/models/{}", self.api_base, self.model
          ))
          .header("Authorization", bearer)
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
        trace!("HF response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("HF API error: {}", error_text);
            return Err(Self::classify(
              status.as_u16(), error_text
            ));
        }

        let generated: Vec<HfGenerated>
          = response.json().await.map_err(|e| {
            error!("Parse error: {}", e);
            GenerationError::Unknown(e.to_string())
          })?;

        generated.first()
          .map(|g| g.generated_text.clone())
          .ok_or_else(|| {
            error!("No generations in response");
            GenerationError::Unknown(
              "API response contained no generations"
                .to_string()
            )
          })
    }
}
