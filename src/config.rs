//! Configuration for the serving facade and backend chain

use serde::{Deserialize, Serialize};

const DEFAULT_PORT: u16 = 5000;
const DEFAULT_RETRY_INTERVAL_SECS: u64 = 15;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const DEFAULT_HF_API_BASE: &str
  = "https://api-inference.huggingface.co";
const DEFAULT_HF_MODEL: &str = "microsoft/DialoGPT-medium";
const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "phi3";

/// Gate configuration, read once at startup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GateConfig
{   /// Port to listen on
    pub listen_port: u16
  , /// Delay between lifecycle load attempts, in seconds
    pub retry_interval_secs: u64
  , /// Per-call timeout for load/generate, in seconds
    pub request_timeout_secs: u64
  , /// Fallback chain, highest priority first
    pub backends: Vec<crate::BackendSpec>
}

impl Default for GateConfig
{   fn default() -> Self
    {   GateConfig
        {   listen_port: DEFAULT_PORT
          , retry_interval_secs: DEFAULT_RETRY_INTERVAL_SECS
          , request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS
          , backends: vec![]
        }
    }
}

impl GateConfig
{   /// Build the configuration from the process environment.
    /// The chain is always [hugging-face, ollama]; a spec
    /// whose credential is absent is skipped permanently by
    /// the lifecycle task rather than dropped here.
    pub fn from_env() -> Self
    {   let listen_port = env_parsed("PORT", DEFAULT_PORT);
        let retry_interval_secs = env_parsed(
          "RETRY_INTERVAL_SECS"
        , DEFAULT_RETRY_INTERVAL_SECS
        );
        let request_timeout_secs = env_parsed(
          "REQUEST_TIMEOUT_SECS"
        , DEFAULT_REQUEST_TIMEOUT_SECS
        );

        let hugging_face = crate::BackendSpec
        {   name: "hugging-face".to_string()
          , kind: crate::BackendKind::HuggingFace
          , endpoint: env_or("HF_API_BASE", DEFAULT_HF_API_BASE)
          , model: env_or("HF_MODEL", DEFAULT_HF_MODEL)
          , credential: std::env::var("HF_TOKEN").ok()
        };

        let ollama = crate::BackendSpec
        {   name: "ollama".to_string()
          , kind: crate::BackendKind::Ollama
          , endpoint: env_or("OLLAMA_URL", DEFAULT_OLLAMA_URL)
          , model: env_or("OLLAMA_MODEL", DEFAULT_OLLAMA_MODEL)
          , credential: None
        };

        GateConfig
        {   listen_port
          , retry_interval_secs
          , request_timeout_secs
          , backends: vec![hugging_face, ollama]
        }
    }

    /// Retry interval as a Duration
    pub fn retry_interval(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(
          self.retry_interval_secs
        )
    }

    /// Per-call timeout as a Duration
    pub fn request_timeout(&self) -> std::time::Duration
    {   std::time::Duration::from_secs(
          self.request_timeout_secs
        )
    }
}

fn env_or(var: &str, default: &str) -> String
{   std::env::var(var)
      .unwrap_or_else(|_| default.to_string())
}

fn env_parsed<T: std::str::FromStr>(
  var: &str
, default: T
) -> T
{   std::env::var(var)
      .ok()
      .and_then(|v| v.parse().ok())
      .unwrap_or(default)
}
