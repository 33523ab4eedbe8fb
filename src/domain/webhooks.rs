//! Webhook domain models: outbound notification payloads and the per-attempt
//! audit log.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::payments::{Payment, PaymentCurrency, PaymentStatus};

/// Audit record for a single webhook delivery attempt.
///
/// One row per attempt (retries included), plus one final row when all
/// attempts are exhausted. Rows are created before the request is sent and
/// updated in place with the outcome, so a crash mid-request still leaves a
/// trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookLog {
    pub id: String,
    pub payment_id: String,
    pub merchant_id: String,
    pub url: String,
    pub payload: serde_json::Value,
    /// HTTP response status, or 0 when the attempt did not complete.
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<serde_json::Value>,
    /// Attempt index this row corresponds to (0 for the original attempt).
    pub retries: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Outbound webhook notification payload.
///
/// Field declaration order is the serialization order, which is significant:
/// the signature is computed over the serialization with `signature` absent,
/// then appended as the final field for transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookPayload {
    pub payment_id: String,
    pub merchant_id: String,
    pub status: PaymentStatus,
    pub amount: f64,
    pub amount_received: Option<f64>,
    pub currency: PaymentCurrency,
    pub tx_hash: Option<String>,
    pub confirmed_at: Option<DateTime<Utc>>,
    pub customer_reference: String,
    pub timestamp: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl WebhookPayload {
    /// Build the unsigned payload for a payment status notification.
    pub fn from_payment(payment: &Payment, built_at: DateTime<Utc>) -> Self {
        Self {
            payment_id: payment.id.clone(),
            merchant_id: payment.merchant_id.clone(),
            status: payment.status,
            amount: payment.amount,
            amount_received: payment.amount_received,
            currency: payment.currency,
            tx_hash: payment.tx_hash.clone(),
            confirmed_at: payment.confirmed_at,
            customer_reference: payment.customer_reference.clone(),
            timestamp: built_at,
            signature: None,
        }
    }
}

/// Outcome of a single delivery attempt.
///
/// Only `TransportFailure` is retried; an HTTP response of any status code is
/// terminal for the delivery sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// 2xx response from the merchant endpoint.
    Delivered(u16),
    /// Non-2xx response; recorded but not retried.
    ApplicationRejected(u16),
    /// The request never completed (connection, DNS, timeout).
    TransportFailure,
}
