pub mod error;
pub mod config;
pub mod backends;
pub mod request;
pub mod state;
pub mod lifecycle;
pub mod handler;
pub mod server;
use serde::{Deserialize, Serialize};

/*

chatgate: a small chat-serving facade in front of a
text-generation backend. One background task (lifecycle.rs)
works through the configured backend chain until one loads,
publishing serving-state snapshots; the request path
(handler.rs, server.rs) reads those snapshots and only talks
to a backend once one is Ready.

chatgate/
├── Cargo.toml
├── static/index.html   # embedded chat page
├── src/
│   ├── lib.rs          # re-exports and shared core types
│   ├── error.rs        # generation error taxonomy
│   ├── config.rs       # env-driven configuration
│   ├── request.rs      # wire types for /chat
│   ├── state.rs        # serving-state snapshots
│   ├── lifecycle.rs    # backend lifecycle task
│   ├── handler.rs      # request path: gate + generate
│   ├── server.rs       # axum routes
│   ├── main.rs         # binary entry point
│   └── backends/       # one adapter per backend kind
│       ├── mod.rs      # capability trait + factory
│       ├── hugging_face.rs
│       └── ollama.rs
└── tests/

*/

/// CHATGATE STRUCTURES:

/// Enum representing the supported generation backend kinds.
/// Each variant corresponds to one adapter implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Hash)]
pub enum BackendKind
{   /// Hugging Face Inference API (remote, bearer token)
    HuggingFace
  , /// Ollama server (local, no credential)
    Ollama
}

impl BackendKind
{   /// Whether this backend kind cannot work without a credential
    pub fn requires_credential(&self) -> bool
    {   match self
        {   BackendKind::HuggingFace => true
          , BackendKind::Ollama => false
        }
    }
}

/// One entry in the fallback chain. Fixed at startup; the
/// position in the configured chain is the priority rank.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct BackendSpec
{   /// Human-readable backend name (used in logs)
    pub name: String
  , /// Which adapter implementation serves this spec
    pub kind: BackendKind
  , /// API base URL
    pub endpoint: String
  , /// Model identifier to request from the backend
    pub model: String
  , /// Credential for the backend, if one is configured
    pub credential: Option<String>
}

impl BackendSpec
{   /// Whether the spec can be attempted at all. A missing
    /// required credential is a permanent per-spec failure.
    pub fn credential_satisfied(&self) -> bool
    {   !self.kind.requires_credential()
          || self.credential.is_some()
    }
}
