//! `TeleportServer` builder, router and serve loop.
//!
//! This is the entry point for running a Teleport server. It ties the
//! layers together: HTTP/WebSocket → coordinator → lobby → protocol.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use teleport_lobby::{IdGenerator, LobbyConfig, RandomIdGenerator};
use teleport_protocol::JsonCodec;
use teleport_session::Coordinator;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::{http, ws, TeleportError};

/// Shared server state passed to every handler.
///
/// Wrapped in `Arc` so it can be cheaply cloned across tasks. The
/// coordinator does its own locking.
pub(crate) struct AppState {
    pub(crate) coordinator: Arc<Coordinator>,
    pub(crate) codec: JsonCodec,
}

/// Builds the complete router around an existing coordinator.
///
/// - `GET /healthz`
/// - `POST /api/sessions`
/// - `GET /api/sessions/{id}`
/// - `POST /api/sessions/{id}/join`
/// - `POST /api/sessions/{id}/advance`
/// - `POST /api/sessions/{id}/leave`
/// - `GET /api/ws?session={id}&token={token}`
///
/// CORS allows any origin.
pub fn build_router(coordinator: Arc<Coordinator>) -> Router {
    let state = Arc::new(AppState {
        coordinator,
        codec: JsonCodec,
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/healthz", get(http::healthz))
        .route("/api/sessions", post(http::create_session))
        .route("/api/sessions/{id}", get(http::get_session))
        .route("/api/sessions/{id}/join", post(http::join_session))
        .route("/api/sessions/{id}/advance", post(http::advance_step))
        .route("/api/sessions/{id}/leave", post(http::leave_session))
        .route("/api/ws", get(ws::ws_connect))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builder for configuring and starting a Teleport server.
///
/// # Example
///
/// ```rust,no_run
/// use teleport::prelude::*;
///
/// # async fn run() -> Result<(), TeleportError> {
/// let server = TeleportServer::builder()
///     .bind("0.0.0.0:8080")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct TeleportServerBuilder {
    bind_addr: String,
    lobby_config: LobbyConfig,
    ids: Arc<dyn IdGenerator>,
}

impl TeleportServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            lobby_config: LobbyConfig::default(),
            ids: Arc::new(RandomIdGenerator),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the reservation settings every new session gets.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Replaces the generator for session ids and tokens.
    pub fn id_generator(mut self, ids: Arc<dyn IdGenerator>) -> Self {
        self.ids = ids;
        self
    }

    /// Binds the listen socket and creates the coordinator.
    pub async fn build(self) -> Result<TeleportServer, TeleportError> {
        let listener = TcpListener::bind(&self.bind_addr)
            .await
            .map_err(TeleportError::Bind)?;
        let coordinator = Arc::new(Coordinator::with_id_generator(self.lobby_config, self.ids));

        Ok(TeleportServer {
            listener,
            coordinator,
        })
    }
}

impl Default for TeleportServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Teleport server.
///
/// Call [`run()`](Self::run) to start serving.
pub struct TeleportServer {
    listener: TcpListener,
    coordinator: Arc<Coordinator>,
}

impl TeleportServer {
    /// Creates a new builder.
    pub fn builder() -> TeleportServerBuilder {
        TeleportServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// The coordinator behind this server.
    pub fn coordinator(&self) -> Arc<Coordinator> {
        Arc::clone(&self.coordinator)
    }

    /// Serves requests until the process is terminated.
    pub async fn run(self) -> Result<(), TeleportError> {
        self.run_until(std::future::pending()).await
    }

    /// Serves requests until `shutdown` completes, then lets in-flight
    /// requests finish.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), TeleportError>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.local_addr().map_err(TeleportError::Serve)?;
        tracing::info!(%addr, "teleport server running");

        let router = build_router(self.coordinator);
        axum::serve(self.listener, router)
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(TeleportError::Serve)
    }
}
