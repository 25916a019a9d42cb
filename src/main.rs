use log::{info, error};

use chatgate::config::GateConfig;
use chatgate::lifecycle::LifecycleManager;

#[tokio::main]
async fn main() -> std::io::Result<()>
{   env_logger::init();

    let config = GateConfig::from_env();
    info!(
      "Starting chatgate with {} backends, retry interval {}s",
      config.backends.len(),
      config.retry_interval_secs
    );

    let lifecycle = LifecycleManager::spawn(&config);
    let state_rx = lifecycle.state();

    let addr = format!("0.0.0.0:{}", config.listen_port);
    let listener = tokio::net::TcpListener::bind(&addr)
      .await
      .map_err(|e| {
        error!("Failed to bind {}: {}", addr, e);
        e
      })?;

    info!("Listening on {}", addr);
    if let Err(e)
      = chatgate::server::serve(listener, state_rx).await
    {   error!("Server error: {}", e);
    }

    lifecycle.shutdown().await;
    info!("chatgate stopped");
    Ok(())
}
