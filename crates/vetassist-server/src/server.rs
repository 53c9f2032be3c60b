//! HTTP server for the front-desk API

use crate::config::ServerConfig;
use crate::retell::{CallProvider, RetellClient};
use crate::routes;
use crate::sessions::SessionRegistry;
use anyhow::{Context, Result};
use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use triage::TriageEngine;

/// Application state shared across handlers
pub struct AppState {
    pub provider: Arc<dyn CallProvider>,
    pub engine: TriageEngine,
    pub sessions: Arc<SessionRegistry>,
    /// Used when create-web-call does not name an agent
    pub default_agent_id: Option<String>,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        provider: Arc<dyn CallProvider>,
        engine: TriageEngine,
        default_agent_id: Option<String>,
    ) -> Self {
        Self {
            provider,
            engine,
            sessions: Arc::new(SessionRegistry::new()),
            default_agent_id,
            start_time: Instant::now(),
        }
    }

    pub fn with_sessions(mut self, sessions: SessionRegistry) -> Self {
        self.sessions = Arc::new(sessions);
        self
    }
}

/// Build the full router. CORS is wide open: the dashboard may be served
/// from any origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::health_routes())
        .merge(routes::retell_routes())
        .merge(routes::triage_routes())
        .with_state(Arc::new(state))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(config: ServerConfig) -> Result<()> {
    let engine = config
        .triage
        .build_engine()
        .context("Failed to build triage engine")?;
    let provider = RetellClient::new(config.retell.clone()).context("Failed to build HTTP client")?;
    if !config.retell.is_configured() {
        tracing::warn!("RETELL_API_KEY is not set; web calls cannot be started");
    }

    let state = AppState::new(Arc::new(provider), engine, config.retell.default_agent_id)
        .with_sessions(SessionRegistry::with_ttl(config.session_ttl));
    let reaper = Arc::clone(&state.sessions).spawn_reaper();
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    info!("VetAssist server listening on http://{}", config.bind);
    info!("  Health check: http://{}/api/health", config.bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    reaper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
    }
}
