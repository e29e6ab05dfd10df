//! REST webhook for voice and chat front ends

use crate::service::{BUSY_MESSAGE, ConversationService, ServiceError};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

type AppState = Arc<ConversationService>;

/// Incoming webhook message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookRequest {
    #[serde(default = "default_sender")]
    pub sender: String,
    pub message: String,
}

fn default_sender() -> String {
    "default".to_string()
}

/// One outgoing bot message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotMessage {
    pub recipient_id: String,
    pub text: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub conversations: usize,
}

pub fn router(service: AppState) -> Router {
    Router::new()
        .route("/webhooks/rest/webhook", post(webhook))
        .route("/health", get(health))
        .route("/conversations/:sender", delete(reset_conversation))
        .with_state(service)
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until the process exits
pub async fn run(bind: &str, service: AppState) -> anyhow::Result<()> {
    let app = router(service);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!("Listening on http://{}", listener.local_addr()?);
    println!("netfix webhook on http://{}/webhooks/rest/webhook", bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(sender: &str, err: ServiceError) -> Response {
    match err {
        ServiceError::Busy(_) => (
            StatusCode::CONFLICT,
            Json(vec![BotMessage {
                recipient_id: sender.to_string(),
                text: BUSY_MESSAGE.to_string(),
            }]),
        )
            .into_response(),
        ServiceError::Engine(e) => {
            error!(sender, "Turn failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn webhook(State(service): State<AppState>, Json(req): Json<WebhookRequest>) -> Response {
    let WebhookRequest { sender, message } = req;
    let svc = service.clone();
    let who = sender.clone();
    let result = tokio::task::spawn_blocking(move || svc.handle(&who, &message)).await;

    match result {
        Ok(Ok(turn)) => {
            let messages: Vec<BotMessage> = turn
                .replies
                .into_iter()
                .map(|text| BotMessage {
                    recipient_id: sender.clone(),
                    text,
                })
                .collect();
            Json(messages).into_response()
        }
        Ok(Err(e)) => error_response(&sender, e),
        Err(e) => {
            error!(sender, "Turn task panicked: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health(State(service): State<AppState>) -> Response {
    match service.conversation_count() {
        Ok(conversations) => Json(HealthResponse {
            status: "ok".to_string(),
            conversations,
        })
        .into_response(),
        Err(e) => error_response("", e),
    }
}

async fn reset_conversation(
    State(service): State<AppState>,
    Path(sender): Path<String>,
) -> Response {
    match service.reset(&sender) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => error_response(&sender, e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use netfix_engine::{EngineConfig, MemoryStore, Platform, resolution::RESOLVED_QUESTION};
    use tower::ServiceExt;

    fn state() -> AppState {
        Arc::new(ConversationService::new(
            EngineConfig::default(),
            Arc::new(MemoryStore::new()),
        ))
    }

    async fn post_message(app: Router, sender: &str, message: &str) -> (StatusCode, Vec<BotMessage>) {
        let body = serde_json::json!({ "sender": sender, "message": message }).to_string();
        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/webhooks/rest/webhook")
                    .header("content-type", "application/json")
                    .body(Body::from(body))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_webhook_walks_to_platform_question() {
        let svc = state();
        let (status, msgs) = post_message(router(svc.clone()), "u1", "hello").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].recipient_id, "u1");
        assert!(msgs[0].text.contains("phone"));

        // no-load computer: toggle adapter, restart router, then DNS
        for answer in ["computer", "no", "no", "yes", "no"] {
            post_message(router(svc.clone()), "u1", answer).await;
        }
        let (_, msgs) = post_message(router(svc.clone()), "u1", "no").await;
        assert!(msgs.iter().any(|m| m.text.contains("Which platform")));

        let (_, msgs) = post_message(router(svc.clone()), "u1", "/platform_linux").await;
        assert!(msgs[0].text.contains("sudo"));
        assert_eq!(msgs.last().unwrap().text, RESOLVED_QUESTION);
        assert_eq!(
            svc.episode("u1").unwrap().facts.platform,
            Some(Platform::Linux)
        );
    }

    #[tokio::test]
    async fn test_health_counts_conversations() {
        let svc = state();
        post_message(router(svc.clone()), "a", "hi").await;
        post_message(router(svc.clone()), "b", "hi").await;

        let response = router(svc)
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.conversations, 2);
    }

    #[tokio::test]
    async fn test_delete_resets_conversation() {
        let svc = state();
        post_message(router(svc.clone()), "a", "hi").await;
        post_message(router(svc.clone()), "a", "phone").await;

        let response = router(svc.clone())
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/conversations/a")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert!(svc.episode("a").unwrap().is_pristine());
    }

    #[tokio::test]
    async fn test_busy_maps_to_conflict() {
        let response = error_response("a", ServiceError::Busy("a".to_string()));
        assert_eq!(response.status(), StatusCode::CONFLICT);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let msgs: Vec<BotMessage> = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(msgs.len(), 1);
        assert_eq!(msgs[0].text, BUSY_MESSAGE);
    }

    #[tokio::test]
    async fn test_engine_error_maps_to_500() {
        let response = error_response("a", ServiceError::Engine(netfix_engine::Error::StepLimit(16)));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
