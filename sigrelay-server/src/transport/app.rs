use crate::config::RelayConfig;
use crate::events::EventSink;
use crate::registry::{RegistryHandle, RegistryStats};
use crate::router::MessageRouter;
use crate::transport::ws_handler;
use anyhow::Context;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Everything a connection task needs, cloned into each one.
#[derive(Clone)]
pub struct AppState {
    pub registry: RegistryHandle,
    pub router: MessageRouter,
    pub config: Arc<RelayConfig>,
    pub events: Arc<dyn EventSink>,
}

impl AppState {
    /// Spawns the registry task, so it must run inside a Tokio runtime.
    pub fn new(config: RelayConfig, events: Arc<dyn EventSink>) -> Self {
        let registry = RegistryHandle::spawn(
            config.max_connections,
            config.registry_channel_capacity,
            events.clone(),
        );
        let router = MessageRouter::new(registry.clone());

        Self {
            registry,
            router,
            config: Arc::new(config),
            events,
        }
    }
}

#[derive(Debug, Serialize)]
struct HealthReport {
    status: &'static str,
    #[serde(flatten)]
    stats: RegistryStats,
}

async fn health(State(state): State<AppState>) -> Result<Json<HealthReport>, StatusCode> {
    match state.registry.stats().await {
        Ok(stats) => Ok(Json(HealthReport { status: "ok", stats })),
        Err(e) => {
            error!("Health check failed: {}", e);
            Err(StatusCode::SERVICE_UNAVAILABLE)
        }
    }
}

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/ws", get(ws_handler))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serves the relay on `listener` until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener
        .local_addr()
        .context("listener has no local address")?;
    info!("Signaling relay listening on ws://{}/ws", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown)
        .await
        .context("relay server failed")
}
