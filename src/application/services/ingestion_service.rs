//! Inbound webhook ingestion
//!
//! Accepts payment status updates pushed by a trusted upstream processor.
//! Field validation mirrors the shapes the processor sends; accepted updates
//! feed the lifecycle manager's guarded transition, so a terminal record
//! cannot be rewritten from this entry point. Each accepted update appends
//! its own audit row, separate from the delivery engine's trail.

use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::info;
use uuid::Uuid;

use crate::application::services::payments_service::PaymentsService;
use crate::domain::payments::{Payment, PaymentStatus, StatusPatch};
use crate::domain::webhooks::WebhookLog;
use crate::infrastructure::adapters::PaymentsStore;
use crate::shared::error::{AppError, AppResult};

/// A validated status update from the upstream processor.
#[derive(Debug, Clone)]
pub struct StatusUpdate {
    pub payment_id: String,
    pub status: PaymentStatus,
    pub tx_hash: Option<String>,
    pub amount_received: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

impl StatusUpdate {
    /// Validate a raw inbound body field by field.
    pub fn from_value(body: &Value) -> AppResult<Self> {
        let payment_id = match body.get("paymentId") {
            Some(Value::String(s)) if !s.is_empty() => s.clone(),
            _ => {
                return Err(AppError::Validation(
                    "Invalid or missing paymentId".to_string(),
                ))
            }
        };

        let status_str = match body.get("status") {
            Some(Value::String(s)) => s.as_str(),
            _ => {
                return Err(AppError::Validation(
                    "Invalid or missing status".to_string(),
                ))
            }
        };
        let status = PaymentStatus::from_str(status_str).map_err(AppError::Validation)?;

        let tx_hash = match body.get("txHash") {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => return Err(AppError::Validation("Invalid txHash".to_string())),
        };

        let amount_received = match body.get("amountReceived") {
            None | Some(Value::Null) => None,
            Some(Value::Number(n)) => n.as_f64(),
            Some(_) => return Err(AppError::Validation("Invalid amountReceived".to_string())),
        };

        let timestamp = body
            .get("timestamp")
            .and_then(Value::as_str)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|t| t.with_timezone(&Utc))
            .ok_or_else(|| AppError::Validation("Invalid timestamp".to_string()))?;

        Ok(Self {
            payment_id,
            status,
            tx_hash,
            amount_received,
            timestamp,
        })
    }
}

pub struct IngestionService {
    store: Arc<PaymentsStore>,
    payments: Arc<PaymentsService>,
}

impl IngestionService {
    pub fn new(store: Arc<PaymentsStore>, payments: Arc<PaymentsService>) -> Self {
        Self { store, payments }
    }

    /// Apply an externally-sourced status update.
    ///
    /// The raw body is kept verbatim in the audit row. Feeding the lifecycle
    /// manager means a confirmed/failed entry notifies the merchant like any
    /// other terminal transition.
    pub async fn ingest(&self, body: &Value) -> AppResult<Payment> {
        let update = StatusUpdate::from_value(body)?;

        if !update.status.is_terminal() {
            return Err(AppError::Validation(format!(
                "cannot transition a payment to {}",
                update.status.as_str()
            )));
        }

        let confirmed_at = if update.status == PaymentStatus::Confirmed {
            Some(update.timestamp)
        } else {
            None
        };
        let patch = StatusPatch {
            status: update.status,
            tx_hash: update.tx_hash.clone(),
            amount_received: update.amount_received,
            confirmed_at,
        };

        let payment = self
            .payments
            .transition_from_pending(&update.payment_id, patch, true)
            .await?;

        self.append_audit_log(&payment, body).await?;

        info!(
            payment_id = %payment.id,
            status = %payment.status.as_str(),
            "Inbound status update processed"
        );
        Ok(payment)
    }

    async fn append_audit_log(&self, payment: &Payment, body: &Value) -> AppResult<()> {
        let now = Utc::now();
        let log = WebhookLog {
            id: Uuid::new_v4().to_string(),
            payment_id: payment.id.clone(),
            merchant_id: payment.merchant_id.clone(),
            url: String::new(),
            payload: body.clone(),
            status: 200,
            response: None,
            retries: 0,
            next_retry_at: None,
            created_at: now,
            updated_at: now,
        };
        self.store.create_webhook_log(&log).await
    }
}
