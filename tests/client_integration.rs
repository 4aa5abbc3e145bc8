use std::time::Duration;

use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use mindbridge::client::{ClientError, MindBridgeClient};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;

// Serve `app` on an ephemeral loopback port and return its base URL.
async fn spawn(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind loopback");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn test_chat_returns_response_field() {
    let app = Router::new().route(
        "/api/chat",
        post(|Json(body): Json<Value>| async move {
            let message = body["message"].as_str().unwrap_or_default().to_string();
            Json(json!({
                "response": format!("echo: {message}"),
                "status": "success",
                "timestamp": 1_700_000_000.5
            }))
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await).unwrap();

    let reply = client.chat("hello there").await.unwrap();
    assert_eq!(reply, "echo: hello there");
}

#[tokio::test]
async fn test_non_success_status_is_api_error() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "boom" })),
            )
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await).unwrap();

    let err = client.chat("hi").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert!(matches!(err, ClientError::Api { .. }));
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await)
        .unwrap()
        .with_timeout(Duration::from_millis(200));

    let err = client.chat("hi").await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "Request timeout after 200ms");
}

#[tokio::test]
async fn test_cancelled_request() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await).unwrap();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let err = client.chat_with_cancel("hi", &cancel).await.unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn test_health_probe() {
    let app = Router::new().route(
        "/api/health",
        get(|| async {
            Json(json!({
                "status": "healthy",
                "service": "MindBridge API",
                "version": "1.0.0",
                "port": 5000
            }))
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await).unwrap();

    let health = client.health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.port, Some(5000));
}

#[tokio::test]
async fn test_unreachable_server() {
    // Grab a free port, then close it.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = MindBridgeClient::new(format!("http://{addr}")).unwrap();
    let err = client.chat("hi").await.unwrap_err();
    assert!(matches!(err, ClientError::Http(_)));
}

#[tokio::test(start_paused = true)]
async fn test_default_deadline_is_ten_seconds() {
    let app = Router::new().route(
        "/api/chat",
        post(|| async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Json(json!({ "response": "too late" }))
        }),
    );
    let client = MindBridgeClient::new(spawn(app).await).unwrap();

    let err = client.chat("hi").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout(d) if d == Duration::from_secs(10)));
}
