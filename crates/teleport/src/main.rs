//! `teleport-server`: runs the Teleport HTTP/WebSocket server.
//!
//! Environment:
//! - `PORT`: listen port, default 8080
//! - `TELEPORT_RESERVATION_TTL_SECS`: how long an idle, disconnected
//!   reservation is protected, default 60
//! - `RUST_LOG`: tracing filter, default `info`

use std::time::Duration;

use teleport::prelude::*;
use tracing_subscriber::EnvFilter;

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> Result<(), TeleportError> {
    tracing_subscriber::fmt()
        .json()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    let port = env_or("PORT", DEFAULT_PORT);
    let ttl_secs = env_or(
        "TELEPORT_RESERVATION_TTL_SECS",
        LobbyConfig::default().reservation_ttl.as_secs(),
    );
    let lobby_config = LobbyConfig {
        reservation_ttl: Duration::from_secs(ttl_secs),
    };

    let server = TeleportServer::builder()
        .bind(&format!("0.0.0.0:{port}"))
        .lobby_config(lobby_config)
        .build()
        .await?;

    server
        .run_until(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("shutdown requested");
        })
        .await
}

/// Reads and parses `key`, falling back to `default` when it is unset or
/// unparsable.
fn env_or<T: std::str::FromStr + std::fmt::Display + Copy>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(%key, %raw, %default, "ignoring unparsable value");
            default
        }),
        Err(_) => default,
    }
}
