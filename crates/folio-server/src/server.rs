//! Axum server wiring: state, router, listener.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::extract::ws::WebSocketUpgrade;
use axum::extract::State;
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::get;
use axum::Router;
use tower_http::cors::CorsLayer;
use tracing::{debug, info};

use folio_sources::{Fetcher, SourceRegistry};

use crate::config::ServerConfig;
use crate::health::{self, HealthResponse};
use crate::host::HostService;
use crate::routes::DebugRoute;
use crate::shutdown::ShutdownCoordinator;
use crate::websocket::registry::SessionRegistry;
use crate::websocket::session;

/// Shared state for Axum handlers and sessions.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    pub registry: Arc<SourceRegistry>,
    pub fetcher: Arc<Fetcher>,
    pub sessions: Arc<SessionRegistry>,
    pub host: Arc<HostService>,
    pub shutdown: Arc<ShutdownCoordinator>,
    pub start_time: Instant,
}

/// The debug WebSocket server.
pub struct DebugServer {
    state: AppState,
}

impl DebugServer {
    pub fn new(config: ServerConfig, registry: Arc<SourceRegistry>, fetcher: Arc<Fetcher>) -> Self {
        let shutdown = Arc::new(ShutdownCoordinator::new());
        let sessions = Arc::new(SessionRegistry::new());
        let host = Arc::new(HostService::new(sessions.clone(), shutdown.token()));
        Self {
            state: AppState {
                config: Arc::new(config),
                registry,
                fetcher,
                sessions,
                host,
                shutdown,
                start_time: Instant::now(),
            },
        }
    }

    /// Build the router: `/health` plus the upgrade dispatcher for
    /// everything else.
    pub fn router(&self) -> Router {
        build_router(self.state.clone())
    }

    /// Bind and serve. Returns the bound address and the serve task.
    pub async fn listen(&self) -> std::io::Result<(SocketAddr, tokio::task::JoinHandle<()>)> {
        let addr = format!("{}:{}", self.state.config.host, self.state.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let local_addr = listener.local_addr()?;

        let router = self.router();
        let token = self.state.shutdown.token();
        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, router)
                .with_graceful_shutdown(token.cancelled_owned())
                .await;
        });

        info!(addr = %local_addr, "debug server listening");
        Ok((local_addr, handle))
    }

    pub fn host(&self) -> &Arc<HostService> {
        &self.state.host
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.state.sessions
    }

    pub fn shutdown(&self) -> &Arc<ShutdownCoordinator> {
        &self.state.shutdown
    }

    pub fn config(&self) -> &ServerConfig {
        &self.state.config
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .fallback(ws_dispatch)
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// GET /health
async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(health::health_check(
        state.start_time,
        state.sessions.count(),
        state.host.is_running(),
    ))
}

/// Every upgrade attempt lands here. The host service is activated before
/// the path is validated; that ordering matches the original app, where the
/// companion service was started even for upgrades that were then refused.
async fn ws_dispatch(State(state): State<AppState>, uri: Uri, ws: WebSocketUpgrade) -> Response {
    state.host.ensure_running();

    match DebugRoute::from_path(uri.path()) {
        None => {
            debug!(path = %uri.path(), "refusing upgrade on unknown path");
            StatusCode::NOT_FOUND.into_response()
        }
        Some(route) => ws
            .max_message_size(state.config.max_message_size)
            .on_upgrade(move |socket| session::run_session(socket, route, state))
            .into_response(),
    }
}
