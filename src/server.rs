use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use axum::{
    Form, Json, Router,
    extract::{Request, State, rejection::JsonRejection},
    http::header,
    middleware::Next,
    response::{Html, IntoResponse},
    routing::get,
};
use serde::Deserialize;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::AppState;
use crate::companion::Companion;
use crate::config::AppConfig;
use crate::error::ApiError;
use crate::session::SessionStore;
use crate::types::{ChatReply, HealthStatus};
use crate::ui;

/// How often idle page sessions are swept.
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Build the application router around `state`.
pub fn build_router(state: AppState) -> Router {
    let timeout = state.config.server.request_timeout();
    let static_dir = state.config.server.static_dir.clone();

    Router::new()
        .route("/", get(index_handler).post(submit_handler))
        .route("/sw.js", get(service_worker_handler))
        .route("/api/health", get(api_health))
        .route("/api/chat", axum::routing::post(api_chat))
        .nest_service("/static", ServeDir::new(static_dir))
        .fallback(not_found)
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => ApiError::Timeout.into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the Axum server with the provided configuration.
pub async fn start_server(config: Arc<AppConfig>) -> anyhow::Result<()> {
    let state = AppState::new(Arc::clone(&config), Companion::new());

    let sessions = state.sessions.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_SWEEP_INTERVAL);
        loop {
            ticker.tick().await;
            let removed = sessions.cleanup_expired();
            if removed > 0 {
                tracing::debug!(removed, remaining = sessions.len(), "Expired sessions removed");
            }
        }
    });

    let app = build_router(state);

    let addr = config.server.address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );
    info!(health = %format!("http://{addr}/api/health"), "Health check available");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!(name: "server.stopped", "Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// HTML Page Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form posted by the chat page.
#[derive(Debug, Deserialize)]
struct PageForm {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
}

/// GET / - Fresh chat page. The session is stored once a message arrives.
async fn index_handler() -> Html<String> {
    Html(ui::chat_page(&SessionStore::new_id(), &[]))
}

/// POST / - Answer the submitted message and re-render the transcript.
async fn submit_handler(State(state): State<AppState>, Form(form): Form<PageForm>) -> Html<String> {
    let session_id = form.session_id.as_deref();
    let message = form.message.as_deref().map(str::trim).unwrap_or_default();
    if message.is_empty() {
        return Html(match session_id.and_then(|id| state.sessions.get(id)) {
            Some(session) => ui::chat_page(session.id(), &session.turns()),
            None => {
                let id = session_id
                    .filter(|id| SessionStore::is_valid_id(id))
                    .map_or_else(SessionStore::new_id, str::to_string);
                ui::chat_page(&id, &[])
            }
        });
    }

    let session = state.sessions.get_or_create(session_id);
    let reply = state.companion.respond(message);
    session.add_turn(message, reply);
    tracing::info!(
        session_id = %session.id(),
        turns = session.turn_count(),
        "Page message answered"
    );

    Html(ui::chat_page(session.id(), &session.turns()))
}

/// GET /sw.js - Offline service worker.
async fn service_worker_handler() -> impl IntoResponse {
    (
        [
            (header::CONTENT_TYPE, "application/javascript"),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        ui::SERVICE_WORKER_JS,
    )
}

// ─────────────────────────────────────────────────────────────────────────────
// API Handlers
// ─────────────────────────────────────────────────────────────────────────────

/// GET /api/health - Liveness probe.
async fn api_health(State(state): State<AppState>) -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "healthy".to_string(),
        service: "MindBridge API".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        port: Some(state.config.server.port),
    })
}

/// POST /api/chat - Answer one message.
async fn api_chat(
    State(state): State<AppState>,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Result<Json<ChatReply>, ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        tracing::debug!(error = %rejection, "Rejected chat body");
        ApiError::MissingMessage
    })?;

    let message = body
        .get("message")
        .and_then(serde_json::Value::as_str)
        .ok_or(ApiError::MissingMessage)?
        .trim();
    if message.is_empty() {
        return Err(ApiError::EmptyMessage);
    }

    tracing::info!(message_length = message.len(), "Received chat request");

    let response = state.companion.respond(message);
    let timestamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| ApiError::Internal(e.to_string()))?
        .as_secs_f64();

    Ok(Json(ChatReply {
        response,
        status: Some("success".to_string()),
        timestamp: Some(timestamp),
    }))
}

async fn not_found() -> ApiError {
    ApiError::NotFound
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::companion::FixedPicker;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn test_state() -> AppState {
        let config = AppConfig::load_from_args(["mindbridge"]).unwrap();
        AppState::new(Arc::new(config), Companion::with_picker(FixedPicker(0)))
    }

    #[tokio::test]
    async fn test_not_found_is_json() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["error"], "Endpoint not found");
    }

    #[tokio::test]
    async fn test_service_worker_content_type() {
        let app = build_router(test_state());
        let response = app
            .oneshot(Request::builder().uri("/sw.js").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/javascript"
        );
    }
}
