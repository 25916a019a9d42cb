use std::fmt;

/// Custom error type for generation outcomes
/// Implements Clone for publishing inside state snapshots
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenerationError
{   /// Credential absent for a backend; permanent for that backend
    ConfigurationMissing(String)
  , /// Backend rejected the request as malformed
    InvalidArgument(String)
  , /// Backend refused the credential
    AccessDenied(String)
  , /// Backend rate limit hit
    RateLimited(String)
  , /// Backend unreachable, timed out, or returned a 5xx
    UpstreamUnavailable(String)
  , /// Backend ran out of memory or another resource
    ResourceExhausted(String)
  , /// Anything unclassified
    Unknown(String)
}

impl GenerationError
{   /// Fixed user-facing reply per kind. Raw backend
    /// diagnostics stay server-side; only these strings are
    /// ever returned to a client.
    pub fn user_message(&self) -> &'static str
    {   match self
        {   GenerationError::ConfigurationMissing(_) => {
              "The assistant is not configured correctly."
            }
          , GenerationError::InvalidArgument(_) => {
              "The message could not be processed."
            }
          , GenerationError::AccessDenied(_) => {
              "The assistant is not authorized to answer right now."
            }
          , GenerationError::RateLimited(_) => {
              "The assistant is receiving too many requests. Please try again in a moment."
            }
          , GenerationError::UpstreamUnavailable(_) => {
              "The assistant could not be reached. Please try again shortly."
            }
          , GenerationError::ResourceExhausted(_) => {
              "The assistant ran out of capacity for this request."
            }
          , GenerationError::Unknown(_) => {
              "Something went wrong on the server."
            }
        }
    }

    /// Outward HTTP status per kind
    pub fn http_status(&self) -> u16
    {   match self
        {   GenerationError::InvalidArgument(_) => 400
          , GenerationError::AccessDenied(_) => 403
          , GenerationError::RateLimited(_) => 429
          , GenerationError::UpstreamUnavailable(_) => 502
          , GenerationError::ConfigurationMissing(_) => 500
          , GenerationError::ResourceExhausted(_) => 500
          , GenerationError::Unknown(_) => 500
        }
    }

    /// Classify a non-success upstream HTTP status
    pub fn from_status(status: u16, body: String) -> Self
    {   match status
        {   401 | 403 => GenerationError::AccessDenied(body)
          , 429 => GenerationError::RateLimited(body)
          , 400..=499 => GenerationError::InvalidArgument(body)
          , 500..=599 => GenerationError::UpstreamUnavailable(body)
          , _ => GenerationError::Unknown(body)
        }
    }

    /// Classify a transport-level reqwest failure
    pub fn from_transport(err: reqwest::Error) -> Self
    {   if err.is_timeout() || err.is_connect()
        {   GenerationError::UpstreamUnavailable(err.to_string())
        } else
        {   GenerationError::Unknown(err.to_string())
        }
    }
}

impl fmt::Display for GenerationError
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   GenerationError::ConfigurationMissing(msg) => {
              write!(f, "Missing configuration: {}", msg)
            }
          , GenerationError::InvalidArgument(msg) => {
              write!(f, "Invalid argument: {}", msg)
            }
          , GenerationError::AccessDenied(msg) => {
              write!(f, "Access denied: {}", msg)
            }
          , GenerationError::RateLimited(msg) => {
              write!(f, "Rate limited: {}", msg)
            }
          , GenerationError::UpstreamUnavailable(msg) => {
              write!(f, "Upstream unavailable: {}", msg)
            }
          , GenerationError::ResourceExhausted(msg) => {
              write!(f, "Resource exhausted: {}", msg)
            }
          , GenerationError::Unknown(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for GenerationError {}

impl From<String> for GenerationError
{   fn from(s: String) -> Self
    {   GenerationError::Unknown(s)
    }
}

impl From<&str> for GenerationError
{   fn from(s: &str) -> Self
    {   GenerationError::Unknown(s.to_string())
    }
}
