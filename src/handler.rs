//! Request path: validate input, check the readiness gate,
//! drive the active adapter, classify the outcome

use log::{debug, error};

use crate::error::GenerationError;
use crate::state::StateReceiver;

/// Fixed reply for empty or whitespace-only input
pub const EMPTY_INPUT_REPLY: &str = "Please enter a message.";

/// Fixed reply while no backend is Ready
pub const UNAVAILABLE_REPLY: &str
  = "The assistant is still starting up. Please try again shortly.";

/// Classification of one chat request, used to pick the
/// outward status and reply text
#[derive(Debug, Clone)]
pub enum ChatOutcome
{   /// The backend produced a reply
    Reply(String)
  , /// Input was empty after trimming; no backend call made
    EmptyInput
  , /// No backend is Ready; no backend call made
    Unavailable
  , /// The backend call failed
    Failed(GenerationError)
}

impl ChatOutcome
{   /// Outward HTTP status for this outcome
    pub fn http_status(&self) -> u16
    {   match self
        {   ChatOutcome::Reply(_) => 200
          , ChatOutcome::EmptyInput => 200
          , ChatOutcome::Unavailable => 503
          , ChatOutcome::Failed(err) => err.http_status()
        }
    }

    /// Reply text for this outcome. Failures map to their
    /// fixed per-kind message, never the raw diagnostics.
    pub fn reply_text(&self) -> String
    {   match self
        {   ChatOutcome::Reply(text) => text.clone()
          , ChatOutcome::EmptyInput => {
              EMPTY_INPUT_REPLY.to_string()
            }
          , ChatOutcome::Unavailable => {
              UNAVAILABLE_REPLY.to_string()
            }
          , ChatOutcome::Failed(err) => {
              err.user_message().to_string()
            }
        }
    }
}

/// Handle one chat message against the current serving state
pub async fn handle_chat(
  state_rx: &StateReceiver
, message: &str
) -> ChatOutcome
{   if message.trim().is_empty()
    {   debug!("Rejecting empty message");
        return ChatOutcome::EmptyInput;
    }

    // One consistent snapshot: status and adapter together
    let snapshot = state_rx.borrow().clone();
    if !snapshot.is_ready()
    {   debug!(
          "Readiness gate closed (status: {:?})",
          snapshot.status
        );
        return ChatOutcome::Unavailable;
    }
    let active = match snapshot.active
    {   Some(active) => active
      , None => return ChatOutcome::Unavailable
    };

    debug!("Forwarding message to: {}", active.spec.name);
    match active.adapter.generate(message).await
    {   Ok(text) => ChatOutcome::Reply(text)
      , Err(e) => {
          error!(
            "Generation failed on {}: {}",
            active.spec.name, e
          );
          ChatOutcome::Failed(e)
        }
    }
}
