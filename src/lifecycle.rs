//! Backend lifecycle task
//!
//! One background task owns the serving-state writer. It
//! walks the fallback chain from the top until a backend
//! loads, publishes Ready, and otherwise retries the whole
//! chain on a fixed interval. The request path never loads
//! anything; it only reads the snapshots published here.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use log::{debug, info, warn, error};

use crate::error::GenerationError;
use crate::state::{ActiveBackend, StateReceiver, StateSender, StateSnapshot};

/// One prioritized entry in the chain: the spec plus its
/// adapter, built once at startup
pub type ChainEntry
  = (crate::BackendSpec, Arc<dyn crate::backends::GenerationBackend>);

/// Public handle to the lifecycle task - owns the task
pub struct LifecycleHandle
{   state_rx: StateReceiver
  , shutdown_tx: mpsc::UnboundedSender<()>
  , task_handle: tokio::task::JoinHandle<()>
}

impl LifecycleHandle
{   /// A fresh reader of the serving state
    pub fn state(&self) -> StateReceiver
    {   self.state_rx.clone()
    }

    /// Signal the loop to stop at its next sleep boundary
    /// and wait for it to finish
    pub async fn shutdown(self)
    {   debug!("Shutting down lifecycle task");
        let _ = self.shutdown_tx.send(());
        let _ = self.task_handle.await;
    }
}

/// Backend lifecycle state machine
pub struct LifecycleManager
{   chain: Vec<ChainEntry>
  , retry_interval: Duration
  , state_tx: StateSender
  , /// Specs skipped permanently (credential missing),
    /// each logged exactly once
    skipped: HashSet<String>
}

impl LifecycleManager
{   /// Build adapters for the configured chain and spawn the
    /// lifecycle task. Returns immediately.
    pub fn spawn(config: &crate::config::GateConfig)
      -> LifecycleHandle
    {   let chain = config.backends
          .iter()
          .map(|spec| {
            (   spec.clone()
            ,   crate::backends::build_adapter(
                  spec
                , config.request_timeout()
                )
            )
          })
          .collect();
        Self::spawn_with_chain(chain, config.retry_interval())
    }

    /// Spawn the lifecycle task over an explicit chain
    pub fn spawn_with_chain(
      chain: Vec<ChainEntry>
    , retry_interval: Duration
    ) -> LifecycleHandle
    {   debug!(
          "Spawning lifecycle task with {} backends",
          chain.len()
        );
        let (state_tx, state_rx)
          = crate::state::state_channel();
        let (shutdown_tx, shutdown_rx)
          = mpsc::unbounded_channel();

        let manager = LifecycleManager
        {   chain
          , retry_interval
          , state_tx
          , skipped: HashSet::new()
        };

        let task_handle = tokio::spawn(async move {
          manager.run(shutdown_rx).await
        });

        LifecycleHandle
        {   state_rx
          , shutdown_tx
          , task_handle
        }
    }

    /// Main lifecycle loop. Ends only on shutdown.
    async fn run(
      mut self
    , mut shutdown_rx: mpsc::UnboundedReceiver<()>
    )
    {   debug!("Starting lifecycle loop");
        loop
        {   if self.state_tx.borrow().is_ready()
            {   // Readiness is sticky: nothing to do until
                // shutdown. Generate-time failures are
                // surfaced per request, not here.
                if self.sleep_or_shutdown(&mut shutdown_rx).await
                {   break;
                }
                continue;
            }

            self.attempt_chain().await;

            if !self.state_tx.borrow().is_ready()
            {   if self.sleep_or_shutdown(&mut shutdown_rx).await
                {   break;
                }
            }
        }

        let active = self.state_tx.borrow().active.clone();
        if let Some(active) = active
        {   debug!("Unloading backend: {}", active.spec.name);
            active.adapter.unload().await;
        }
        info!("Lifecycle task stopped");
    }

    /// Walk the chain from the top, publishing Loading first
    /// and Ready or Failed at the end
    async fn attempt_chain(&mut self)
    {   let _ = self.state_tx.send(StateSnapshot::loading());
        let mut last_error: Option<GenerationError> = None;

        for (spec, adapter) in &self.chain
        {   if !spec.credential_satisfied()
            {   if self.skipped.insert(spec.name.clone())
                {   warn!(
                      "Skipping backend {} permanently: credential not configured",
                      spec.name
                    );
                }
                last_error = Some(
                  GenerationError::ConfigurationMissing(
                    spec.name.clone()
                  )
                );
                continue;
            }

            debug!("Attempting to load backend: {}", spec.name);
            match adapter.load().await
            {   Ok(()) => {
                  info!("Backend {} is ready", spec.name);
                  let _ = self.state_tx.send(
                    StateSnapshot::ready(ActiveBackend
                    {   spec: spec.clone()
                      , adapter: adapter.clone()
                    })
                  );
                  return;
                }
              , Err(e) => {
                  warn!(
                    "Backend {} failed to load: {}",
                    spec.name, e
                  );
                  last_error = Some(e);
                }
            }
        }

        error!("No backend in the chain could be loaded");
        let _ = self.state_tx.send(StateSnapshot::failed(
          last_error.unwrap_or_else(|| {
            GenerationError::ConfigurationMissing(
              "no usable backend configured".to_string()
            )
          })
        ));
    }

    /// Sleep one retry interval. Returns true when shutdown
    /// was requested instead.
    async fn sleep_or_shutdown(
      &self
    , shutdown_rx: &mut mpsc::UnboundedReceiver<()>
    ) -> bool
    {   tokio::select!
        {   _ = tokio::time::sleep(self.retry_interval) => {
              false
            }
          , _ = shutdown_rx.recv() => {
              info!("Lifecycle loop received shutdown");
              true
            }
        }
    }
}
