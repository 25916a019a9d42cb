//! Wire types for the /chat endpoint

use serde::{Deserialize, Serialize};

/// Incoming chat request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest
{   /// The user's message
    pub message: String
}

/// Outgoing chat response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse
{   /// The reply shown to the user
    pub reply: String
}
