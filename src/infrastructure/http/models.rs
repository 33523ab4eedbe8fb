//! HTTP models - request and response shapes for the public API

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

use crate::domain::payments::{Payment, PaymentCurrency, PaymentNetwork, PaymentStatus};
use crate::domain::webhooks::WebhookLog;

/// Error body returned by every failing endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    pub code: String,
    pub timestamp: DateTime<Utc>,
}

impl ErrorBody {
    pub fn from_error(error: &crate::shared::error::AppError) -> Self {
        Self {
            error: error.to_string(),
            code: error.code().to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Compact status projection for `GET /api/payments/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentStatusResponse {
    pub id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_received: Option<f64>,
    pub currency: PaymentCurrency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    pub network: PaymentNetwork,
}

impl From<&Payment> for PaymentStatusResponse {
    fn from(payment: &Payment) -> Self {
        Self {
            id: payment.id.clone(),
            status: payment.status,
            amount: payment.amount,
            amount_received: payment.amount_received,
            currency: payment.currency,
            tx_hash: payment.tx_hash.clone(),
            confirmed_at: payment.confirmed_at,
            expires_at: payment.expires_at,
            network: payment.network,
        }
    }
}

/// Webhook audit trail entry for `GET /api/webhooks/my`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLogSummary {
    pub id: String,
    pub payment_id: String,
    pub merchant_id: String,
    pub payload: Value,
    pub status: u16,
    pub retries: u32,
    pub created_at: DateTime<Utc>,
}

impl From<&WebhookLog> for WebhookLogSummary {
    fn from(log: &WebhookLog) -> Self {
        Self {
            id: log.id.clone(),
            payment_id: log.payment_id.clone(),
            merchant_id: log.merchant_id.clone(),
            payload: log.payload.clone(),
            status: log.status,
            retries: log.retries,
            created_at: log.created_at,
        }
    }
}

/// Signature verification request for `POST /api/webhooks/verify`
#[derive(Debug, Clone, Deserialize)]
pub struct VerifySignatureRequest {
    /// JSON object or pre-serialized string; objects are re-serialized
    /// before verification.
    pub payload: Value,
    pub signature: String,
}

/// Signature verification response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifySignatureResponse {
    pub is_valid: bool,
    pub message: String,
}

static PAYMENT_ID_RE: OnceLock<Regex> = OnceLock::new();

/// Check that a path parameter looks like a payment id before hitting the
/// store.
pub fn is_valid_payment_id(candidate: &str) -> bool {
    PAYMENT_ID_RE
        .get_or_init(|| Regex::new(r"^pay_[0-9a-f]{24}$").expect("payment id pattern"))
        .is_match(candidate)
}
