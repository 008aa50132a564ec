//! REST handlers.
//!
//! Each handler pulls its inputs out of the request, makes exactly one
//! coordinator call and turns the result into JSON. Errors become
//! [`TeleportError`] responses.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;
use teleport_protocol::{JoinRequest, JoinResponse, SessionId, SessionSnapshot, TokenRequest};

use crate::server::AppState;
use crate::TeleportError;

type ApiResult<T> = Result<Json<T>, TeleportError>;

/// `GET /healthz`
pub(crate) async fn healthz() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// `POST /api/sessions`
pub(crate) async fn create_session(State(state): State<Arc<AppState>>) -> ApiResult<SessionSnapshot> {
    Ok(Json(state.coordinator.create_session().await?))
}

/// `GET /api/sessions/{id}`
pub(crate) async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionSnapshot> {
    Ok(Json(state.coordinator.get_session(&SessionId::from(id)).await?))
}

/// `POST /api/sessions/{id}/join` with `{ "role": "...", "token": "..." }`.
pub(crate) async fn join_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<JoinRequest>, JsonRejection>,
) -> ApiResult<JoinResponse> {
    let Json(req) = body.map_err(bad_body)?;
    let reservation = state
        .coordinator
        .join_session(&SessionId::from(id), &req.role, req.token.as_deref())
        .await?;

    Ok(Json(JoinResponse {
        token: reservation.token,
        role: reservation.role,
    }))
}

/// `POST /api/sessions/{id}/advance` with `{ "token": "..." }`.
pub(crate) async fn advance_step(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<SessionSnapshot> {
    let token = required_token(body)?;
    Ok(Json(
        state
            .coordinator
            .advance_step(&SessionId::from(id), &token)
            .await?,
    ))
}

/// `POST /api/sessions/{id}/leave` with `{ "token": "..." }`.
pub(crate) async fn leave_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Result<Json<TokenRequest>, JsonRejection>,
) -> ApiResult<SessionSnapshot> {
    let token = required_token(body)?;
    Ok(Json(
        state
            .coordinator
            .leave_session(&SessionId::from(id), &token)
            .await?,
    ))
}

fn bad_body(rejection: JsonRejection) -> TeleportError {
    TeleportError::BadRequest(rejection.body_text())
}

fn required_token(body: Result<Json<TokenRequest>, JsonRejection>) -> Result<String, TeleportError> {
    let Json(req) = body.map_err(bad_body)?;
    if req.token.is_empty() {
        return Err(TeleportError::BadRequest("token is required".into()));
    }
    Ok(req.token)
}
