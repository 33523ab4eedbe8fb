//! Outbound webhook transport
//!
//! A thin "POST JSON, get status and body or a transport error" capability.
//! The delivery engine decides what the outcome means; this adapter only
//! performs the request.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::shared::error::{AppError, AppResult};

/// Response captured from the merchant endpoint.
#[derive(Debug, Clone)]
pub struct SenderResponse {
    pub status: u16,
    /// Response body parsed as JSON, falling back to the raw text.
    pub body: Option<Value>,
}

/// Transport capability consumed by the delivery engine.
#[async_trait]
pub trait WebhookSender: Send + Sync {
    /// POST the body to the URL with a JSON content type.
    ///
    /// Returns `Ok` for any completed HTTP exchange regardless of status
    /// code, and `Err(AppError::Transport)` when the request never
    /// completed.
    async fn post_json(&self, url: &str, body: &str) -> AppResult<SenderResponse>;
}

/// reqwest-backed sender with a bounded per-attempt timeout.
pub struct HttpWebhookSender {
    client: Client,
}

impl HttpWebhookSender {
    pub fn new(request_timeout_seconds: u64) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(request_timeout_seconds))
            .user_agent("payment-gateway-server/0.1")
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebhookSender for HttpWebhookSender {
    async fn post_json(&self, url: &str, body: &str) -> AppResult<SenderResponse> {
        debug!(url = %url, "Sending webhook request");

        let response = self
            .client
            .post(url)
            .header("Content-Type", "application/json")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| AppError::Transport(format!("webhook request failed: {}", e)))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| AppError::Transport(format!("failed to read response body: {}", e)))?;

        let body = if text.is_empty() {
            None
        } else {
            Some(
                serde_json::from_str::<Value>(&text).unwrap_or_else(|_| Value::String(text)),
            )
        };

        Ok(SenderResponse { status, body })
    }
}
