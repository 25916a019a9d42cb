//! Serving-state snapshots shared between the lifecycle task
//! and the request path

use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;

/// Lifecycle status of the serving facade
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status
{   /// No load has been attempted yet
    Unloaded
  , /// A load attempt is in progress
    Loading
  , /// A backend loaded successfully and is serving
    Ready
  , /// Every spec in the chain failed this cycle
    Failed
}

/// The backend currently serving requests
#[derive(Clone)]
pub struct ActiveBackend
{   pub spec: crate::BackendSpec
  , pub adapter: Arc<dyn crate::backends::GenerationBackend>
}

impl fmt::Debug for ActiveBackend
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   f.debug_struct("ActiveBackend")
          .field("spec", &self.spec)
          .finish()
    }
}

/// One immutable snapshot of the serving state. Status and
/// active backend always change together in one snapshot, so
/// a reader can never observe Ready without an adapter.
#[derive(Debug, Clone)]
pub struct StateSnapshot
{   pub status: Status
  , pub active: Option<ActiveBackend>
  , pub last_error: Option<crate::error::GenerationError>
}

impl StateSnapshot
{   /// Initial state, before any load attempt
    pub fn unloaded() -> Self
    {   StateSnapshot
        {   status: Status::Unloaded
          , active: None
          , last_error: None
        }
    }

    /// A load attempt is running
    pub fn loading() -> Self
    {   StateSnapshot
        {   status: Status::Loading
          , active: None
          , last_error: None
        }
    }

    /// A backend completed a successful load
    pub fn ready(active: ActiveBackend) -> Self
    {   StateSnapshot
        {   status: Status::Ready
          , active: Some(active)
          , last_error: None
        }
    }

    /// The whole chain failed this cycle
    pub fn failed(err: crate::error::GenerationError) -> Self
    {   StateSnapshot
        {   status: Status::Failed
          , active: None
          , last_error: Some(err)
        }
    }

    /// Whether requests may be forwarded to a backend
    pub fn is_ready(&self) -> bool
    {   self.status == Status::Ready
    }
}

/// Writer half, owned by the lifecycle task
pub type StateSender = watch::Sender<StateSnapshot>;
/// Reader half, cloned into every request handler
pub type StateReceiver = watch::Receiver<StateSnapshot>;

/// Create the single state channel, starting at Unloaded
pub fn state_channel() -> (StateSender, StateReceiver)
{   watch::channel(StateSnapshot::unloaded())
}
