//! Integration tests for the Teleport server: the REST API through the
//! router, and WebSocket listeners against a live server.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use serde_json::{json, Value};
use teleport::prelude::*;
use tokio_tungstenite::tungstenite::Message;
use tower::ServiceExt;

// =========================================================================
// Helpers
// =========================================================================

type ClientWs = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

fn app() -> Router {
    build_router(Arc::new(Coordinator::new(LobbyConfig::default())))
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create(app: &Router) -> String {
    let (status, body) = call(app, "POST", "/api/sessions", None).await;
    assert_eq!(status, StatusCode::OK);
    body["id"].as_str().unwrap().to_string()
}

async fn join(app: &Router, id: &str, role: &str) -> String {
    let (status, body) = call(
        app,
        "POST",
        &format!("/api/sessions/{id}/join"),
        Some(json!({ "role": role })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "join {role}: {body}");
    body["token"].as_str().unwrap().to_string()
}

async fn advance(app: &Router, id: &str, token: &str) -> (StatusCode, Value) {
    call(
        app,
        "POST",
        &format!("/api/sessions/{id}/advance"),
        Some(json!({ "token": token })),
    )
    .await
}

/// Starts a server on a random port and returns its address and coordinator.
async fn start_server() -> (String, Arc<Coordinator>) {
    let server = TeleportServer::builder()
        .bind("127.0.0.1:0")
        .build()
        .await
        .expect("server should build");

    let addr = server.local_addr().expect("should have local addr").to_string();
    let coordinator = server.coordinator();

    tokio::spawn(async move {
        let _ = server.run().await;
    });

    // Give the accept loop a moment to start.
    tokio::time::sleep(Duration::from_millis(10)).await;
    (addr, coordinator)
}

async fn connect(addr: &str, session: &SessionId, token: &str) -> ClientWs {
    let url = format!("ws://{addr}/api/ws?session={session}&token={token}");
    let (ws, _) = tokio_tungstenite::connect_async(url)
        .await
        .expect("should connect");
    ws
}

async fn next_frame(ws: &mut ClientWs) -> Message {
    tokio::time::timeout(Duration::from_secs(2), ws.next())
        .await
        .expect("frame should arrive")
        .expect("stream should be open")
        .expect("frame should be valid")
}

async fn next_message(ws: &mut ClientWs) -> ServerMessage {
    let frame = next_frame(ws).await;
    serde_json::from_slice(&frame.into_data()).expect("decode server message")
}

// =========================================================================
// REST
// =========================================================================

#[tokio::test]
async fn test_healthz() {
    let (status, body) = call(&app(), "GET", "/healthz", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn test_create_and_fetch_session() {
    let app = app();
    let id = create(&app).await;

    let (status, body) = call(&app, "GET", &format!("/api/sessions/{id}"), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["stepIndex"], 0);
    assert_eq!(body["steps"].as_array().unwrap().len(), 6);
    assert_eq!(body["qubits"][1]["state"], "clean state");
    assert_eq!(body["participants"]["alice"]["taken"], false);
    assert!(!body.to_string().contains("token"));
}

#[tokio::test]
async fn test_unknown_session_is_404() {
    let app = app();

    let (status, body) = call(&app, "GET", "/api/sessions/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
    assert!(body["error"].as_str().unwrap().contains("nope"));
}

#[tokio::test]
async fn test_end_to_end_over_http() {
    let app = app();
    let id = create(&app).await;
    let a = join(&app, &id, "alice").await;
    let b = join(&app, &id, "bob").await;
    let c = join(&app, &id, "charlie").await;

    let (status, body) = advance(&app, &id, &c).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stepIndex"], 1);

    let (_, body) = advance(&app, &id, &a).await;
    assert_eq!(body["stepIndex"], 2);
    assert_eq!(body["qubits"][0]["state"], "measured");

    advance(&app, &id, &a).await;
    advance(&app, &id, &b).await;
    let (status, body) = advance(&app, &id, &b).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stepIndex"], 5);
    assert_eq!(body["qubits"][1]["state"], "state restored");
}

#[tokio::test]
async fn test_error_statuses() {
    let app = app();
    let id = create(&app).await;
    let a = join(&app, &id, "alice").await;

    // Wrong role for the step.
    let (status, body) = advance(&app, &id, &a).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["status"], 403);

    // Unknown token.
    let (status, _) = advance(&app, &id, "bogus").await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // Active role.
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/sessions/{id}/join"),
        Some(json!({ "role": "alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Unsupported role.
    let (status, _) = call(
        &app,
        "POST",
        &format!("/api/sessions/{id}/join"),
        Some(json!({ "role": "eve" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_bad_payloads_are_400() {
    let app = app();
    let id = create(&app).await;

    let (status, _) = advance(&app, &id, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "POST", &format!("/api/sessions/{id}/leave"), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let req = Request::builder()
        .method("POST")
        .uri(format!("/api/sessions/{id}/join"))
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let resp = app.clone().oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rejoin_returns_same_token() {
    let app = app();
    let id = create(&app).await;
    let token = join(&app, &id, "bob").await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/sessions/{id}/join"),
        Some(json!({ "role": "bob", "token": token })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"], token.as_str());
    assert_eq!(body["role"], "bob");
}

#[tokio::test]
async fn test_leave_frees_role() {
    let app = app();
    let id = create(&app).await;
    let token = join(&app, &id, "charlie").await;

    let (status, body) = call(
        &app,
        "POST",
        &format!("/api/sessions/{id}/leave"),
        Some(json!({ "token": token })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["participants"]["charlie"]["taken"], false);
    join(&app, &id, "charlie").await;
}

#[tokio::test]
async fn test_ws_missing_params_is_400() {
    let app = app();

    let (status, _) = call(&app, "GET", "/api/ws?session=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = call(&app, "GET", "/api/ws?token=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// =========================================================================
// WebSocket
// =========================================================================

#[tokio::test]
async fn test_ws_joined_then_state_updates() {
    let (addr, coordinator) = start_server().await;
    let id = coordinator.create_session().await.unwrap().id;
    let charlie = coordinator.join_session(&id, "charlie", None).await.unwrap().token;

    let mut ws = connect(&addr, &id, &charlie).await;

    match next_message(&mut ws).await {
        ServerMessage::Joined { global, local } => {
            assert_eq!(local.role, Role::Charlie);
            assert_eq!(local.state, "entangled pair");
            assert!(global.participants[&Role::Charlie].connected);
        }
        other => panic!("expected joined, got {other:?}"),
    }
    assert!(matches!(next_message(&mut ws).await, ServerMessage::StateUpdate { .. }));

    coordinator.advance_step(&id, &charlie).await.unwrap();

    match next_message(&mut ws).await {
        ServerMessage::StateUpdate { global, local } => {
            assert_eq!(global.step_index, 1);
            assert_eq!(local.role, Role::Charlie);
        }
        other => panic!("expected state update, got {other:?}"),
    }
}

#[tokio::test]
async fn test_ws_bad_token_gets_error_and_close() {
    let (addr, coordinator) = start_server().await;
    let id = coordinator.create_session().await.unwrap().id;

    let mut ws = connect(&addr, &id, "bogus").await;

    assert!(matches!(next_message(&mut ws).await, ServerMessage::Error { .. }));
    assert!(matches!(next_frame(&mut ws).await, Message::Close(_)));
    assert_eq!(coordinator.listener_count(&id).await, 0);
}

#[tokio::test]
async fn test_ws_leave_closes_socket() {
    let (addr, coordinator) = start_server().await;
    let id = coordinator.create_session().await.unwrap().id;
    let alice = coordinator.join_session(&id, "alice", None).await.unwrap().token;

    let mut ws = connect(&addr, &id, &alice).await;
    next_message(&mut ws).await; // joined
    next_message(&mut ws).await; // state_update

    coordinator.leave_session(&id, &alice).await.unwrap();

    assert!(matches!(next_frame(&mut ws).await, Message::Close(_)));
    assert_eq!(coordinator.listener_count(&id).await, 0);
}

#[tokio::test]
async fn test_ws_disconnect_marks_role_disconnected() {
    let (addr, coordinator) = start_server().await;
    let id = coordinator.create_session().await.unwrap().id;
    let bob = coordinator.join_session(&id, "bob", None).await.unwrap().token;

    let mut ws = connect(&addr, &id, &bob).await;
    next_message(&mut ws).await; // joined
    assert_eq!(coordinator.listener_count(&id).await, 1);

    ws.close(None).await.unwrap();
    drop(ws);

    let mut connected = true;
    for _ in 0..50 {
        let snap = coordinator.get_session(&id).await.unwrap();
        connected = snap.participants[&Role::Bob].connected;
        if !connected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(!connected);
    assert_eq!(coordinator.listener_count(&id).await, 0);
}
