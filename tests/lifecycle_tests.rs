use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

use chatgate::backends::GenerationBackend;
use chatgate::error::GenerationError;
use chatgate::lifecycle::LifecycleManager;
use chatgate::state::{StateReceiver, Status};
use chatgate::{BackendKind, BackendSpec};

/// Stub backend whose load fails a fixed number of times
/// before succeeding. usize::MAX means it never succeeds.
struct FlakyBackend
{   load_calls: AtomicUsize
  , unload_calls: AtomicUsize
  , failures_before_success: usize
}

impl FlakyBackend
{   fn new(failures_before_success: usize) -> Arc<Self>
    {   Arc::new(FlakyBackend
        {   load_calls: AtomicUsize::new(0)
          , unload_calls: AtomicUsize::new(0)
          , failures_before_success
        })
    }

    fn load_calls(&self) -> usize
    {   self.load_calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl GenerationBackend for FlakyBackend
{   async fn load(&self) -> Result<(), GenerationError>
    {   let attempt
          = self.load_calls.fetch_add(1, Ordering::SeqCst);
        if attempt < self.failures_before_success
        {   Err(GenerationError::UpstreamUnavailable(
              "stub load failure".to_string()
            ))
        } else
        {   Ok(())
        }
    }

    async fn generate(&self, _prompt: &str)
      -> Result<String, GenerationError>
    {   Ok("stub reply".to_string())
    }

    async fn unload(&self)
    {   self.unload_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Pair a spec with its stub adapter as a chain entry
fn entry(
  spec: BackendSpec
, adapter: Arc<FlakyBackend>
) -> chatgate::lifecycle::ChainEntry
{   let adapter: Arc<dyn GenerationBackend> = adapter;
    (spec, adapter)
}

fn stub_spec(name: &str) -> BackendSpec
{   BackendSpec
    {   name: name.to_string()
      , kind: BackendKind::Ollama
      , endpoint: "http://stub".to_string()
      , model: "stub".to_string()
      , credential: None
    }
}

fn credentialed_spec_without_credential(name: &str)
  -> BackendSpec
{   BackendSpec
    {   name: name.to_string()
      , kind: BackendKind::HuggingFace
      , endpoint: "http://stub".to_string()
      , model: "stub".to_string()
      , credential: None
    }
}

/// Wait until the state goes Ready, or give up
async fn wait_for_ready(
  rx: &mut StateReceiver
, wait: Duration
) -> bool
{   let observed = tokio::time::timeout(wait, async {
      loop
      {   if rx.borrow_and_update().is_ready()
          {   return;
          }
          if rx.changed().await.is_err()
          {   return;
          }
      }
    }).await;
    observed.is_ok() && rx.borrow().is_ready()
}

#[tokio::test]
async fn test_active_backend_unset_until_ready()
{   let stub = FlakyBackend::new(usize::MAX);
    let handle = LifecycleManager::spawn_with_chain(
      vec![entry(stub_spec("only"), stub)]
    , Duration::from_secs(60)
    );

    let snapshot = handle.state().borrow().clone();
    // The loop may have advanced past Unloaded already, but
    // active must be unset in every non-Ready state
    assert_ne!(snapshot.status, Status::Ready);
    assert!(snapshot.active.is_none());

    handle.shutdown().await;
}

#[tokio::test]
async fn test_retries_until_load_succeeds()
{   let interval = Duration::from_millis(20);
    let stub = FlakyBackend::new(3);
    let started = Instant::now();

    let handle = LifecycleManager::spawn_with_chain(
      vec![entry(stub_spec("flaky"), stub.clone())]
    , interval
    );

    let mut rx = handle.state();
    assert!(
      wait_for_ready(&mut rx, Duration::from_secs(5)).await,
      "backend never became ready"
    );

    // Three failed cycles, one interval between each
    assert!(
      started.elapsed() >= interval * 3,
      "became ready before three retry intervals elapsed"
    );
    assert_eq!(stub.load_calls(), 4);

    let snapshot = rx.borrow().clone();
    assert_eq!(snapshot.status, Status::Ready);
    let active = snapshot.active.expect(
      "Ready snapshot must carry an active backend"
    );
    assert_eq!(active.spec.name, "flaky");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_fallback_retries_primary_first()
{   let interval = Duration::from_millis(20);
    let primary = FlakyBackend::new(usize::MAX);
    let secondary = FlakyBackend::new(1);

    let handle = LifecycleManager::spawn_with_chain(
      vec![
        entry(stub_spec("primary"), primary.clone())
      , entry(stub_spec("secondary"), secondary.clone())
      ]
    , interval
    );

    let mut rx = handle.state();
    assert!(
      wait_for_ready(&mut rx, Duration::from_secs(5)).await
    );

    let snapshot = rx.borrow().clone();
    let active = snapshot.active.expect("active backend");
    assert_eq!(active.spec.name, "secondary");

    // Two retry cycles ran; the primary was attempted at the
    // start of both before falling back
    assert_eq!(primary.load_calls(), 2);
    assert_eq!(secondary.load_calls(), 2);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_fallback_after_one_cycle()
{   let primary = FlakyBackend::new(usize::MAX);
    let secondary = FlakyBackend::new(0);

    let handle = LifecycleManager::spawn_with_chain(
      vec![
        entry(stub_spec("primary"), primary.clone())
      , entry(stub_spec("secondary"), secondary.clone())
      ]
    , Duration::from_millis(20)
    );

    let mut rx = handle.state();
    assert!(
      wait_for_ready(&mut rx, Duration::from_secs(5)).await
    );

    let snapshot = rx.borrow().clone();
    assert_eq!(
      snapshot.active.expect("active backend").spec.name,
      "secondary"
    );
    assert_eq!(primary.load_calls(), 1);
    assert_eq!(secondary.load_calls(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_missing_credential_is_never_attempted()
{   let interval = Duration::from_millis(10);
    let unconfigured = FlakyBackend::new(0);
    let failing = FlakyBackend::new(usize::MAX);

    let handle = LifecycleManager::spawn_with_chain(
      vec![
        entry(
          credentialed_spec_without_credential("no-token")
        , unconfigured.clone()
        )
      , entry(stub_spec("failing"), failing.clone())
      ]
    , interval
    );

    // Let several retry cycles run
    tokio::time::sleep(interval * 8).await;

    // The spec without a credential is skipped permanently,
    // even though its adapter would load fine
    assert_eq!(unconfigured.load_calls(), 0);
    assert!(failing.load_calls() >= 2);

    // Poll rather than assert once: the loop may be mid
    // Loading when we look
    let mut rx = handle.state();
    let failed = tokio::time::timeout(
      Duration::from_secs(1)
    , async {
        loop
        {   let snapshot = rx.borrow_and_update().clone();
            if snapshot.status == Status::Failed
            {   assert!(snapshot.active.is_none());
                assert!(snapshot.last_error.is_some());
                return;
            }
            if rx.changed().await.is_err()
            {   return;
            }
        }
      }
    ).await;
    assert!(failed.is_ok(), "chain never reported Failed");

    handle.shutdown().await;
}

#[tokio::test]
async fn test_ready_is_sticky_and_load_is_not_repeated()
{   let interval = Duration::from_millis(10);
    let stub = FlakyBackend::new(0);

    let handle = LifecycleManager::spawn_with_chain(
      vec![entry(stub_spec("stable"), stub.clone())]
    , interval
    );

    let mut rx = handle.state();
    assert!(
      wait_for_ready(&mut rx, Duration::from_secs(5)).await
    );

    // Several intervals pass without another load attempt
    tokio::time::sleep(interval * 6).await;
    assert_eq!(stub.load_calls(), 1);
    assert_eq!(rx.borrow().status, Status::Ready);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_shutdown_unloads_active_backend()
{   let stub = FlakyBackend::new(0);

    let handle = LifecycleManager::spawn_with_chain(
      vec![entry(stub_spec("stable"), stub.clone())]
    , Duration::from_millis(10)
    );

    let mut rx = handle.state();
    assert!(
      wait_for_ready(&mut rx, Duration::from_secs(5)).await
    );

    handle.shutdown().await;
    assert_eq!(stub.unload_calls.load(Ordering::SeqCst), 1);
}
