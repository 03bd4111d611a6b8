use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{PublishError, Publisher};
use crate::market_data::fetcher::join_url;

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    disable_web_page_preview: bool,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    description: Option<String>,
}

/// Posts digests to a Telegram channel through the Bot API.
pub struct TelegramPublisher {
    client: Client,
    // Contains the bot token; never log it.
    send_url: String,
    chat_id: String,
}

impl TelegramPublisher {
    pub fn new(
        api_url: &str,
        bot_token: &str,
        chat_id: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            send_url: join_url(api_url, &format!("bot{bot_token}/sendMessage")),
            chat_id: chat_id.into(),
        })
    }
}

#[async_trait]
impl Publisher for TelegramPublisher {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn publish(&self, text: &str) -> Result<(), PublishError> {
        let body = SendMessage {
            chat_id: &self.chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        };

        let response = self
            .client
            .post(&self.send_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| e.without_url())?;

        let status = response.status();
        let reply = response.json::<ApiResponse>().await.ok();

        match reply {
            Some(ApiResponse { ok: true, .. }) if status.is_success() => {
                debug!(chat_id = %self.chat_id, "telegram accepted message");
                Ok(())
            }
            other => Err(PublishError::Rejected {
                status: status.as_u16(),
                description: other
                    .and_then(|r| r.description)
                    .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string()),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
    use serde_json::{Value, json};
    use std::sync::{Arc, Mutex};

    type Inbox = Arc<Mutex<Vec<Value>>>;

    async fn accept(State(inbox): State<Inbox>, Json(body): Json<Value>) -> Json<Value> {
        inbox.lock().unwrap().push(body);
        Json(json!({"ok": true, "result": {"message_id": 1}}))
    }

    async fn reject() -> (StatusCode, Json<Value>) {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({"ok": false, "description": "Bad Request: chat not found"})),
        )
    }

    async fn mock_api(inbox: Inbox) -> String {
        let router = Router::new()
            .route("/botGOOD/sendMessage", post(accept))
            .route("/botBAD/sendMessage", post(reject))
            .with_state(inbox);
        spawn_server(router).await
    }

    #[tokio::test]
    async fn sends_html_message_to_channel() {
        let inbox = Inbox::default();
        let base = mock_api(inbox.clone()).await;
        let publisher = TelegramPublisher::new(&base, "GOOD", "@digest", Duration::from_secs(5)).unwrap();

        publisher.publish("<b>hi</b>").await.unwrap();

        let sent = inbox.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0]["chat_id"], "@digest");
        assert_eq!(sent[0]["text"], "<b>hi</b>");
        assert_eq!(sent[0]["parse_mode"], "HTML");
    }

    #[tokio::test]
    async fn rejection_carries_api_description() {
        let base = mock_api(Inbox::default()).await;
        let publisher = TelegramPublisher::new(&base, "BAD", "@digest", Duration::from_secs(5)).unwrap();

        let err = publisher.publish("hi").await.unwrap_err();
        match err {
            PublishError::Rejected { status, description } => {
                assert_eq!(status, 400);
                assert_eq!(description, "Bad Request: chat not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unknown_route_is_rejected() {
        let base = mock_api(Inbox::default()).await;
        let publisher = TelegramPublisher::new(&base, "MISSING", "@digest", Duration::from_secs(5)).unwrap();

        let err = publisher.publish("hi").await.unwrap_err();
        assert!(matches!(err, PublishError::Rejected { status: 404, .. }));
    }
}
