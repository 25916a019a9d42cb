//! HTTP surface: the static page, the chat endpoint, and a
//! liveness probe that is independent of backend readiness

use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Html;
use axum::routing::{get, post};
use axum::Json;
use log::{debug, info};
use tower_http::cors::CorsLayer;

use crate::handler;
use crate::request::{ChatRequest, ChatResponse};
use crate::state::StateReceiver;

/// Shared state for the request handlers: just a reader of
/// the serving state
#[derive(Clone)]
pub struct AppState
{   pub state_rx: StateReceiver
}

/// Build the application router
pub fn router(state_rx: StateReceiver) -> Router
{   Router::new()
      .route("/", get(index_handler))
      .route("/health", get(health_handler))
      .route("/chat", post(chat_handler))
      .layer(CorsLayer::permissive())
      .with_state(AppState { state_rx })
}

/// Serve until a termination signal arrives. In-flight
/// requests complete; the listener stops accepting new ones.
pub async fn serve(
  listener: tokio::net::TcpListener
, state_rx: StateReceiver
) -> std::io::Result<()>
{   let app = router(state_rx);
    axum::serve(listener, app)
      .with_graceful_shutdown(shutdown_signal())
      .await
}

async fn shutdown_signal()
{   let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}

async fn index_handler() -> Html<&'static str>
{   Html(include_str!("../static/index.html"))
}

async fn health_handler() -> &'static str
{   "ok"
}

async fn chat_handler(
  State(app): State<AppState>
, Json(payload): Json<ChatRequest>
) -> (StatusCode, Json<ChatResponse>)
{   debug!("Received /chat request");
    let outcome = handler::handle_chat(
      &app.state_rx
    , &payload.message
    ).await;

    let status = StatusCode::from_u16(outcome.http_status())
      .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    (   status
    ,   Json(ChatResponse
        {   reply: outcome.reply_text()
        })
    )
}
