//! How the console reaches the engine: in-process or over the webhook

use crate::server::{BotMessage, WebhookRequest};
use crate::service::{BUSY_MESSAGE, ConversationService, ServiceError};
use async_trait::async_trait;
use netfix_engine::Episode;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("server returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("engine error: {0}")]
    Engine(String),
}

impl ClientError {
    /// The server could not be reached or answered with a failure status
    pub fn is_transport(&self) -> bool {
        match self {
            ClientError::Request(e) => !e.is_decode(),
            ClientError::Status { .. } => true,
            ClientError::Engine(_) => false,
        }
    }
}

#[async_trait]
pub trait Transport: Send + Sync {
    /// Deliver one user message and return the bot replies in order
    async fn send(&self, sender: &str, message: &str) -> Result<Vec<String>, ClientError>;

    /// Current episode, when the backend can expose it
    async fn episode(&self, _sender: &str) -> Option<Episode> {
        None
    }

    /// "local" or the webhook URL
    fn backend(&self) -> String;
}

/// Runs turns against an in-process service
pub struct LocalTransport {
    service: Arc<ConversationService>,
}

impl LocalTransport {
    pub fn new(service: Arc<ConversationService>) -> Self {
        Self { service }
    }
}

#[async_trait]
impl Transport for LocalTransport {
    async fn send(&self, sender: &str, message: &str) -> Result<Vec<String>, ClientError> {
        match self.service.handle(sender, message) {
            Ok(turn) => Ok(turn.replies),
            Err(ServiceError::Busy(_)) => Ok(vec![BUSY_MESSAGE.to_string()]),
            Err(ServiceError::Engine(e)) => Err(ClientError::Engine(e.to_string())),
        }
    }

    async fn episode(&self, sender: &str) -> Option<Episode> {
        self.service.episode(sender).ok()
    }

    fn backend(&self) -> String {
        "local".to_string()
    }
}

/// Posts messages to a running webhook
pub struct RestTransport {
    client: reqwest::Client,
    url: String,
}

impl RestTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }
}

#[async_trait]
impl Transport for RestTransport {
    async fn send(&self, sender: &str, message: &str) -> Result<Vec<String>, ClientError> {
        let request = WebhookRequest {
            sender: sender.to_string(),
            message: message.to_string(),
        };
        debug!(url = %self.url, "Posting message");

        let response = self.client.post(&self.url).json(&request).send().await?;
        let status = response.status();
        // 409 carries the "still processing" message as a normal reply list
        if !status.is_success() && status != reqwest::StatusCode::CONFLICT {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "Webhook returned an error");
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let messages: Vec<BotMessage> = response.json().await?;
        Ok(messages.into_iter().map(|m| m.text).collect())
    }

    fn backend(&self) -> String {
        self.url.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netfix_engine::{EngineConfig, MemoryStore};

    fn service() -> Arc<ConversationService> {
        Arc::new(ConversationService::new(
            EngineConfig::default(),
            Arc::new(MemoryStore::new()),
        ))
    }

    async fn spawn_server(service: Arc<ConversationService>) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = crate::server::router(service);
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/webhooks/rest/webhook", addr)
    }

    #[tokio::test]
    async fn test_local_transport_exposes_episode() {
        let transport = LocalTransport::new(service());
        let replies = transport.send("u", "hi").await.unwrap();
        assert_eq!(replies.len(), 1);
        transport.send("u", "phone").await.unwrap();
        let ep = transport.episode("u").await.unwrap();
        assert!(ep.facts.device_type.is_some());
        assert_eq!(transport.backend(), "local");
    }

    #[tokio::test]
    async fn test_rest_transport_round_trip() {
        let svc = service();
        let url = spawn_server(svc.clone()).await;
        let transport = RestTransport::new(url, Duration::from_secs(5)).unwrap();

        let replies = transport.send("remote", "hi").await.unwrap();
        assert!(replies[0].contains("phone"));
        transport.send("remote", "computer").await.unwrap();
        assert!(svc.episode("remote").unwrap().facts.device_type.is_some());
        assert!(transport.episode("remote").await.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = RestTransport::new(
            format!("http://{}/webhooks/rest/webhook", addr),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = transport.send("u", "hi").await.unwrap_err();
        assert!(err.is_transport());
    }

    #[test]
    fn test_engine_error_is_not_transport() {
        assert!(!ClientError::Engine("boom".into()).is_transport());
        assert!(
            ClientError::Status {
                status: 500,
                body: String::new()
            }
            .is_transport()
        );
    }
}
