//! Payment and webhook-log store
//!
//! In-process store with an optional Redis mirror. Memory is authoritative
//! for reads and for the atomicity of conditional updates; Redis mirrors
//! records for durability when configured.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use redis::{aio::ConnectionManager, AsyncCommands};
use serde_json::Value;

use crate::domain::payments::{Payment, PaymentStatus, StatusPatch};
use crate::domain::webhooks::WebhookLog;
use crate::shared::error::{AppError, AppResult};

/// Result of a conditional status update.
#[derive(Debug, Clone)]
pub enum ConditionalUpdate {
    /// The expected status matched; the patch was committed.
    Updated(Payment),
    /// The record exists but its status no longer matches; nothing changed.
    StatusMismatch(Payment),
    /// No record with this id.
    Missing,
}

/// Abstraction for persisting payments and webhook logs
#[derive(Clone)]
pub struct PaymentsStore {
    redis: Option<Arc<ConnectionManager>>,
    record_ttl_seconds: u64,
    payments: Arc<tokio::sync::RwLock<HashMap<String, Payment>>>,
    webhook_logs: Arc<tokio::sync::RwLock<HashMap<String, WebhookLog>>>,
}

impl PaymentsStore {
    pub fn new(redis: Option<Arc<ConnectionManager>>, record_ttl_seconds: u64) -> Self {
        Self {
            redis,
            record_ttl_seconds,
            payments: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
            webhook_logs: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    fn payment_key(payment_id: &str) -> String {
        format!("payments:{}", payment_id)
    }

    fn webhook_log_key(log_id: &str) -> String {
        format!("webhook_logs:{}", log_id)
    }

    async fn mirror(&self, key: String, value: &impl serde::Serialize) -> AppResult<()> {
        if let Some(redis) = &self.redis {
            let serialized = serde_json::to_vec(value)
                .map_err(|e| AppError::Persistence(format!("serialize record: {}", e)))?;
            let mut conn = (**redis).clone();
            let _: () = conn
                .set_ex(key, serialized, self.record_ttl_seconds)
                .await
                .map_err(|e| AppError::Persistence(format!("redis set: {}", e)))?;
        }
        Ok(())
    }

    /// Persist a newly created payment.
    pub async fn create_payment(&self, payment: &Payment) -> AppResult<()> {
        self.mirror(Self::payment_key(&payment.id), payment).await?;
        self.payments
            .write()
            .await
            .insert(payment.id.clone(), payment.clone());
        Ok(())
    }

    /// Fetch a payment by id, pulling from the Redis mirror on a local miss.
    pub async fn get_payment(&self, payment_id: &str) -> AppResult<Option<Payment>> {
        if let Some(payment) = self.payments.read().await.get(payment_id) {
            return Ok(Some(payment.clone()));
        }

        if let Some(redis) = &self.redis {
            let mut conn = (**redis).clone();
            let data: Option<Vec<u8>> = conn
                .get(Self::payment_key(payment_id))
                .await
                .map_err(|e| AppError::Persistence(format!("redis get: {}", e)))?;
            if let Some(bytes) = data {
                let payment: Payment = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::Persistence(format!("deserialize payment: {}", e)))?;
                self.payments
                    .write()
                    .await
                    .insert(payment_id.to_string(), payment.clone());
                return Ok(Some(payment));
            }
        }
        Ok(None)
    }

    /// Atomically transition a payment's status.
    ///
    /// The patch commits only if the record's current status equals
    /// `expected`; the check and the write happen under the store lock, so
    /// two racing transitions cannot both commit.
    pub async fn update_payment_conditional(
        &self,
        payment_id: &str,
        expected: PaymentStatus,
        patch: StatusPatch,
    ) -> AppResult<ConditionalUpdate> {
        // Surface a mirrored record locally before taking the write lock.
        if self.redis.is_some() && !self.payments.read().await.contains_key(payment_id) {
            self.get_payment(payment_id).await?;
        }

        let mut payments = self.payments.write().await;
        let current = match payments.get(payment_id) {
            Some(p) => p,
            None => return Ok(ConditionalUpdate::Missing),
        };
        if current.status != expected {
            return Ok(ConditionalUpdate::StatusMismatch(current.clone()));
        }

        let mut updated = current.clone();
        updated.status = patch.status;
        if let Some(tx_hash) = patch.tx_hash {
            updated.tx_hash = Some(tx_hash);
        }
        if let Some(amount_received) = patch.amount_received {
            updated.amount_received = Some(amount_received);
        }
        if let Some(confirmed_at) = patch.confirmed_at {
            updated.confirmed_at = Some(confirmed_at);
        }
        updated.updated_at = Utc::now();

        self.mirror(Self::payment_key(payment_id), &updated).await?;
        payments.insert(payment_id.to_string(), updated.clone());
        Ok(ConditionalUpdate::Updated(updated))
    }

    /// All payments belonging to a merchant, newest first.
    pub async fn list_payments_by_merchant(&self, merchant_id: &str) -> AppResult<Vec<Payment>> {
        let mut rows: Vec<Payment> = self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.merchant_id == merchant_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// Pending payments whose deadline has passed.
    pub async fn list_pending_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<Payment>> {
        Ok(self
            .payments
            .read()
            .await
            .values()
            .filter(|p| p.status == PaymentStatus::Pending && p.expires_at < now)
            .cloned()
            .collect())
    }

    /// Append a webhook delivery attempt record.
    pub async fn create_webhook_log(&self, log: &WebhookLog) -> AppResult<()> {
        self.mirror(Self::webhook_log_key(&log.id), log).await?;
        self.webhook_logs
            .write()
            .await
            .insert(log.id.clone(), log.clone());
        Ok(())
    }

    /// Update an attempt record in place with its outcome.
    pub async fn update_webhook_log(
        &self,
        log_id: &str,
        status: u16,
        response: Option<Value>,
        next_retry_at: Option<DateTime<Utc>>,
    ) -> AppResult<()> {
        let mut logs = self.webhook_logs.write().await;
        let log = logs
            .get_mut(log_id)
            .ok_or_else(|| AppError::Persistence(format!("webhook log {} not found", log_id)))?;
        log.status = status;
        log.response = response;
        log.next_retry_at = next_retry_at;
        log.updated_at = Utc::now();
        let snapshot = log.clone();
        drop(logs);
        self.mirror(Self::webhook_log_key(log_id), &snapshot).await
    }

    /// Webhook audit trail for a merchant, newest first.
    pub async fn list_webhook_logs_by_merchant(
        &self,
        merchant_id: &str,
    ) -> AppResult<Vec<WebhookLog>> {
        let mut rows: Vec<WebhookLog> = self
            .webhook_logs
            .read()
            .await
            .values()
            .filter(|l| l.merchant_id == merchant_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rows)
    }

    /// Webhook audit trail for a single payment, oldest first.
    pub async fn list_webhook_logs_by_payment(
        &self,
        payment_id: &str,
    ) -> AppResult<Vec<WebhookLog>> {
        let mut rows: Vec<WebhookLog> = self
            .webhook_logs
            .read()
            .await
            .values()
            .filter(|l| l.payment_id == payment_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(rows)
    }
}
