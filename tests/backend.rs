//! Backend client tests against a local HTTP stub

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use chat_relay::{BackendClient, BackendStatus, FailureReason, MessageBackend, MessageEnvelope};
use tokio::sync::Mutex;
use url::Url;

type Received = Arc<Mutex<Vec<serde_json::Value>>>;

/// Serve `status` and `body` for every POST to `/relay`, recording request bodies
async fn stub_backend(status: StatusCode, body: &'static str) -> (Url, Received) {
    let received: Received = Arc::default();

    let app = Router::new()
        .route(
            "/relay",
            post(
                move |State(received): State<Received>, Json(payload): Json<serde_json::Value>| async move {
                    received.lock().await.push(payload);
                    (status, body)
                },
            ),
        )
        .with_state(received.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let url = Url::parse(&format!("http://{addr}/relay")).unwrap();
    (url, received)
}

#[tokio::test]
async fn test_posts_envelope_and_parses_reply() {
    let (url, received) = stub_backend(
        StatusCode::OK,
        r#"{"status":"success","messageToUser":"hi there","includeVoiceMessage":true}"#,
    )
    .await;
    let client = BackendClient::with_endpoint(url);

    let response = client.forward(&MessageEnvelope::new("hello", 42)).await;

    assert_eq!(response.status, BackendStatus::Success);
    assert_eq!(response.message_to_user.as_deref(), Some("hi there"));
    assert!(response.include_voice_message);
    assert_eq!(
        received.lock().await.as_slice(),
        &[serde_json::json!({"message": "hello", "chat_id": 42})]
    );
}

#[tokio::test]
async fn test_success_without_reply() {
    let (url, _) = stub_backend(StatusCode::OK, r#"{"status":"success"}"#).await;
    let client = BackendClient::with_endpoint(url);

    let response = client.forward(&MessageEnvelope::new("ping", 1)).await;

    assert!(response.is_success());
    assert!(response.message_to_user.is_none());
    assert!(!response.include_voice_message);
}

#[tokio::test]
async fn test_error_status_is_failure() {
    let (url, received) = stub_backend(StatusCode::INTERNAL_SERVER_ERROR, "boom").await;
    let client = BackendClient::with_endpoint(url);

    let response = client.forward(&MessageEnvelope::new("hello", 3)).await;

    assert_eq!(response.status, BackendStatus::Failure(FailureReason::Status(500)));
    assert!(response.message_to_user.is_none());
    // One attempt, no retries
    assert_eq!(received.lock().await.len(), 1);
}

#[tokio::test]
async fn test_created_status_is_failure() {
    let (url, _) = stub_backend(StatusCode::CREATED, r#"{"status":"success"}"#).await;
    let client = BackendClient::with_endpoint(url);

    let response = client.forward(&MessageEnvelope::new("hello", 3)).await;

    assert_eq!(response.status, BackendStatus::Failure(FailureReason::Status(201)));
}

#[tokio::test]
async fn test_malformed_body_is_failure() {
    let (url, _) = stub_backend(StatusCode::OK, "<html>not json</html>").await;
    let client = BackendClient::with_endpoint(url);

    let response = client.forward(&MessageEnvelope::new("hello", 3)).await;

    assert!(matches!(
        response.status,
        BackendStatus::Failure(FailureReason::Malformed(_))
    ));
}

#[tokio::test]
async fn test_unreachable_backend_is_transport_failure() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = BackendClient::with_endpoint(Url::parse(&format!("http://{addr}/relay")).unwrap());
    let response = client.forward(&MessageEnvelope::new("hello", 3)).await;

    assert!(matches!(
        response.status,
        BackendStatus::Failure(FailureReason::Transport(_))
    ));
}
