//! # Teleport
//!
//! Session server for a three-role quantum teleportation walkthrough.
//!
//! Alice, Bob and Charlie each reserve a role over HTTP, then attach a
//! WebSocket to receive every change to the shared session. Only the role
//! named by the current step may advance it.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use teleport::prelude::*;
//!
//! # async fn run() -> Result<(), TeleportError> {
//! let server = TeleportServer::builder()
//!     .bind("0.0.0.0:8080")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod http;
mod server;
mod ws;

pub use error::TeleportError;
pub use server::{build_router, TeleportServer, TeleportServerBuilder};

/// Common imports for running and testing a Teleport server.
pub mod prelude {
    pub use crate::{build_router, TeleportError, TeleportServer, TeleportServerBuilder};
    pub use teleport_lobby::{IdGenerator, LobbyConfig, LobbyError};
    pub use teleport_protocol::{
        JoinRequest, JoinResponse, LocalView, Role, ServerMessage, SessionId, SessionSnapshot,
        StepKey, TokenRequest,
    };
    pub use teleport_session::{Coordinator, SessionError};
}
