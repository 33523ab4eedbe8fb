//! Webhook delivery engine
//!
//! Builds signed payment notifications and delivers them to the merchant's
//! registered callback URL with bounded retries. Every attempt leaves an
//! audit row: one is created before the request goes out and updated with
//! the outcome, and a final row marks an exhausted sequence.
//!
//! Only transport-level failures retry. An HTTP response of any status is
//! terminal for the sequence; non-2xx responses are recorded as rejected.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde_json::Value;
use tracing::{error, warn};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::domain::payments::Payment;
use crate::domain::webhooks::{DeliveryOutcome, WebhookLog, WebhookPayload};
use crate::infrastructure::adapters::{MerchantsStore, MonitoringAdapter, PaymentsStore, WebhookSender};
use crate::shared::crypto;
use crate::shared::error::AppResult;
use crate::shared::logging::LoggingUtils;

pub struct WebhookService {
    config: Arc<AppConfig>,
    store: Arc<PaymentsStore>,
    merchants: Arc<MerchantsStore>,
    sender: Arc<dyn WebhookSender>,
    monitoring: Arc<MonitoringAdapter>,
}

impl WebhookService {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<PaymentsStore>,
        merchants: Arc<MerchantsStore>,
        sender: Arc<dyn WebhookSender>,
        monitoring: Arc<MonitoringAdapter>,
    ) -> Self {
        Self {
            config,
            store,
            merchants,
            sender,
            monitoring,
        }
    }

    /// Fire-and-forget notification for a terminal status change.
    ///
    /// The triggering request returns immediately; the delivery sequence,
    /// including all retries, runs on its own task.
    pub fn notify_status_change(self: &Arc<Self>, payment: &Payment) {
        let service = Arc::clone(self);
        let payment = payment.clone();
        tokio::spawn(async move {
            if let Err(e) = service.deliver(&payment).await {
                error!(
                    payment_id = %payment.id,
                    error = %e,
                    "Webhook delivery aborted"
                );
            }
        });
    }

    /// Run one full delivery sequence for a payment.
    ///
    /// Returns `None` when delivery is skipped because the merchant has no
    /// callback URL configured.
    pub async fn deliver(&self, payment: &Payment) -> AppResult<Option<DeliveryOutcome>> {
        let merchant = match self.merchants.get(&payment.merchant_id).await? {
            Some(m) => m,
            None => return Ok(None),
        };
        let url = match merchant.webhook_url {
            Some(u) if !u.is_empty() => u,
            _ => return Ok(None),
        };

        let (payload, body) = self.build_signed_payload(payment)?;
        let outcome = self.deliver_with_retries(payment, &url, &payload, &body).await;
        Ok(Some(outcome))
    }

    /// Build the signed notification payload.
    ///
    /// The signature covers the serialization with the signature field
    /// absent; it is then appended as the final field for transport.
    pub fn build_signed_payload(&self, payment: &Payment) -> AppResult<(Value, String)> {
        let mut payload = WebhookPayload::from_payment(payment, Utc::now());
        let unsigned = serde_json::to_string(&payload)?;
        payload.signature = Some(crypto::sign_payload(&unsigned, &self.config.webhook.secret));

        let body = serde_json::to_string(&payload)?;
        let value = serde_json::to_value(&payload)?;
        Ok((value, body))
    }

    async fn deliver_with_retries(
        &self,
        payment: &Payment,
        url: &str,
        payload: &Value,
        body: &str,
    ) -> DeliveryOutcome {
        let max_attempts = self.config.webhook.retry_attempts;
        let base_delay = Duration::from_millis(self.config.webhook.retry_delay_ms);
        let mut attempt: u32 = 0;

        loop {
            self.monitoring.record_webhook_attempt();
            let log_id = self.open_attempt_log(payment, url, payload, attempt).await;

            match self.sender.post_json(url, body).await {
                Ok(response) => {
                    if let Some(id) = &log_id {
                        self.record_attempt_outcome(id, response.status, response.body.clone())
                            .await;
                    }
                    LoggingUtils::log_delivery_attempt(&payment.id, url, attempt, response.status);

                    return if (200..300).contains(&response.status) {
                        self.monitoring.record_webhook_delivered();
                        DeliveryOutcome::Delivered(response.status)
                    } else {
                        self.monitoring.record_webhook_rejected();
                        warn!(
                            payment_id = %payment.id,
                            status = %response.status,
                            "Webhook endpoint rejected notification"
                        );
                        DeliveryOutcome::ApplicationRejected(response.status)
                    };
                }
                Err(e) => {
                    if attempt < max_attempts {
                        let delay = base_delay * (attempt + 1);
                        let next_retry_at = Utc::now()
                            + chrono::Duration::from_std(delay)
                                .unwrap_or_else(|_| chrono::Duration::zero());
                        if let Some(id) = &log_id {
                            self.record_retry_scheduled(id, next_retry_at).await;
                        }
                        warn!(
                            payment_id = %payment.id,
                            attempt = %attempt,
                            delay_ms = %delay.as_millis(),
                            error = %e,
                            "Webhook send failed, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    } else {
                        self.close_exhausted(payment, url, payload, attempt + 1).await;
                        self.monitoring.record_webhook_exhausted();
                        LoggingUtils::log_delivery_exhausted(
                            &payment.id,
                            url,
                            attempt + 1,
                            &e.to_string(),
                        );
                        return DeliveryOutcome::TransportFailure;
                    }
                }
            }
        }
    }

    /// Create the audit row for an attempt before the request is sent.
    ///
    /// Losing an audit row must not block delivery, so store failures are
    /// logged and swallowed.
    async fn open_attempt_log(
        &self,
        payment: &Payment,
        url: &str,
        payload: &Value,
        attempt: u32,
    ) -> Option<String> {
        let now = Utc::now();
        let log = WebhookLog {
            id: Uuid::new_v4().to_string(),
            payment_id: payment.id.clone(),
            merchant_id: payment.merchant_id.clone(),
            url: url.to_string(),
            payload: payload.clone(),
            status: 0,
            response: None,
            retries: attempt,
            next_retry_at: None,
            created_at: now,
            updated_at: now,
        };
        match self.store.create_webhook_log(&log).await {
            Ok(()) => Some(log.id),
            Err(e) => {
                error!(payment_id = %payment.id, error = %e, "Failed to persist webhook log");
                None
            }
        }
    }

    async fn record_attempt_outcome(&self, log_id: &str, status: u16, response: Option<Value>) {
        if let Err(e) = self
            .store
            .update_webhook_log(log_id, status, response, None)
            .await
        {
            error!(log_id = %log_id, error = %e, "Failed to update webhook log");
        }
    }

    async fn record_retry_scheduled(&self, log_id: &str, next_retry_at: chrono::DateTime<Utc>) {
        if let Err(e) = self
            .store
            .update_webhook_log(log_id, 0, None, Some(next_retry_at))
            .await
        {
            error!(log_id = %log_id, error = %e, "Failed to update webhook log");
        }
    }

    /// Persist the final exhausted-retries row. No next attempt is
    /// scheduled.
    async fn close_exhausted(&self, payment: &Payment, url: &str, payload: &Value, retries: u32) {
        let now = Utc::now();
        let log = WebhookLog {
            id: Uuid::new_v4().to_string(),
            payment_id: payment.id.clone(),
            merchant_id: payment.merchant_id.clone(),
            url: url.to_string(),
            payload: payload.clone(),
            status: 0,
            response: None,
            retries,
            next_retry_at: None,
            created_at: now,
            updated_at: now,
        };
        if let Err(e) = self.store.create_webhook_log(&log).await {
            error!(payment_id = %payment.id, error = %e, "Failed to persist failing webhook log");
        }
    }

    /// Build a signed sample payload for merchant integration testing.
    pub fn build_test_payload(&self, merchant_id: &str) -> AppResult<Value> {
        use crate::domain::payments::{PaymentCurrency, PaymentStatus};

        let now = Utc::now();
        let mut payload = WebhookPayload {
            payment_id: format!("pay_test_{}", now.timestamp_millis()),
            merchant_id: merchant_id.to_string(),
            status: PaymentStatus::Confirmed,
            amount: 100.0,
            amount_received: Some(100.0),
            currency: PaymentCurrency::Usdt,
            tx_hash: Some(format!("0x{}", "a".repeat(64))),
            confirmed_at: Some(now),
            customer_reference: "test_customer_001".to_string(),
            timestamp: now,
            signature: None,
        };
        let unsigned = serde_json::to_string(&payload)?;
        payload.signature = Some(crypto::sign_payload(&unsigned, &self.config.webhook.secret));
        Ok(serde_json::to_value(&payload)?)
    }

    /// Verify a signature produced with the process webhook secret.
    pub fn verify_signature(&self, payload: &str, signature: &str) -> bool {
        crypto::verify_payload(payload, signature, &self.config.webhook.secret)
    }
}
