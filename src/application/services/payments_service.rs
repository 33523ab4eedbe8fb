//! Payment lifecycle service
//!
//! Owns the payment state machine: `pending` is the only non-terminal
//! status, and every transition commits through the store's conditional
//! update so concurrent callers cannot double-transition a record.

use std::str::FromStr;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::warn;
use validator::Validate;

use crate::config::AppConfig;
use crate::domain::payments::{
    Payment, PaymentCurrency, PaymentMethod, PaymentNetwork, PaymentStatus, StatusPatch,
};
use crate::infrastructure::adapters::{ConditionalUpdate, MonitoringAdapter, PaymentsStore};
use crate::application::services::webhook_service::WebhookService;
use crate::shared::crypto;
use crate::shared::error::{AppError, AppResult};
use crate::shared::logging::LoggingUtils;

/// Payment creation request
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePaymentRequest {
    #[validate(range(exclusive_min = 0.0))]
    pub amount: f64,
    pub currency: String,
    pub network: String,
    pub payment_method: String,
    #[validate(length(min = 1))]
    pub customer_reference: String,
    #[validate(url)]
    #[serde(default)]
    pub callback_url: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

pub struct PaymentsService {
    config: Arc<AppConfig>,
    store: Arc<PaymentsStore>,
    webhooks: Arc<WebhookService>,
    monitoring: Arc<MonitoringAdapter>,
}

impl PaymentsService {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<PaymentsStore>,
        webhooks: Arc<WebhookService>,
        monitoring: Arc<MonitoringAdapter>,
    ) -> Self {
        Self {
            config,
            store,
            webhooks,
            monitoring,
        }
    }

    /// Create a new payment request in `pending` status.
    ///
    /// Enum membership and the amount are re-checked here even though the
    /// HTTP layer validates the request schema; the service must hold its
    /// own invariants. Creation never fires a webhook.
    pub async fn create_payment(
        &self,
        merchant_id: &str,
        req: CreatePaymentRequest,
    ) -> AppResult<Payment> {
        if req.amount <= 0.0 || !req.amount.is_finite() {
            return Err(AppError::Validation(
                "amount must be greater than 0".to_string(),
            ));
        }
        if req.customer_reference.is_empty() {
            return Err(AppError::Validation(
                "customer reference is required".to_string(),
            ));
        }
        let currency = PaymentCurrency::from_str(&req.currency).map_err(AppError::Validation)?;
        let network = PaymentNetwork::from_str(&req.network).map_err(AppError::Validation)?;
        let payment_method =
            PaymentMethod::from_str(&req.payment_method).map_err(AppError::Validation)?;

        let now = Utc::now();
        let payment_id = crypto::generate_payment_id();
        let payment = Payment {
            id: payment_id.clone(),
            merchant_id: merchant_id.to_string(),
            amount: req.amount,
            currency,
            network,
            payment_method,
            customer_reference: req.customer_reference,
            status: PaymentStatus::Pending,
            payment_address: crypto::generate_payment_address(network),
            payment_link: format!(
                "{}/{}",
                self.config.payments.checkout_base_url, payment_id
            ),
            tx_hash: None,
            amount_received: None,
            confirmed_at: None,
            expires_at: now + self.config.payment_timeout(),
            callback_url: req.callback_url,
            description: req.description,
            metadata: req.metadata,
            created_at: now,
            updated_at: now,
        };

        self.store.create_payment(&payment).await?;
        self.monitoring.record_payment_created();
        LoggingUtils::log_payment_event("created", &payment.id, merchant_id);

        Ok(payment)
    }

    /// Confirm a pending payment.
    ///
    /// `amount_received` defaults to the requested amount when the processor
    /// does not report one. Fires the merchant webhook asynchronously on
    /// success.
    pub async fn confirm_payment(
        &self,
        payment_id: &str,
        tx_hash: &str,
        amount_received: Option<f64>,
    ) -> AppResult<Payment> {
        if tx_hash.is_empty() {
            return Err(AppError::Validation("txHash is required".to_string()));
        }

        let payment = self
            .store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {}", payment_id)))?;

        let patch = StatusPatch {
            status: PaymentStatus::Confirmed,
            tx_hash: Some(tx_hash.to_string()),
            amount_received: Some(amount_received.unwrap_or(payment.amount)),
            confirmed_at: Some(Utc::now()),
        };

        self.transition_from_pending(payment_id, patch, true).await
    }

    /// Mark a pending payment as failed. The reason is logged, not
    /// persisted on the record.
    pub async fn fail_payment(&self, payment_id: &str, reason: Option<&str>) -> AppResult<Payment> {
        warn!(
            payment_id = %payment_id,
            reason = reason.unwrap_or("unspecified"),
            "Payment failed"
        );
        self.transition_from_pending(payment_id, StatusPatch::to(PaymentStatus::Failed), true)
            .await
    }

    /// Read a payment by id.
    pub async fn get_payment(&self, payment_id: &str) -> AppResult<Payment> {
        self.store
            .get_payment(payment_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("payment {}", payment_id)))
    }

    /// All payments for a merchant, newest first.
    pub async fn list_by_merchant(&self, merchant_id: &str) -> AppResult<Vec<Payment>> {
        self.store.list_payments_by_merchant(merchant_id).await
    }

    /// The single guarded transition: commit a status patch only if the
    /// record is still `pending`. Every mutation path (confirm, fail,
    /// ingestion, sweeper) goes through here.
    ///
    /// A webhook fires only when `notify` is set and the new status is
    /// `confirmed` or `failed`; expiry stays silent.
    pub async fn transition_from_pending(
        &self,
        payment_id: &str,
        patch: StatusPatch,
        notify: bool,
    ) -> AppResult<Payment> {
        let target = patch.status;
        match self
            .store
            .update_payment_conditional(payment_id, PaymentStatus::Pending, patch)
            .await?
        {
            ConditionalUpdate::Updated(payment) => {
                match target {
                    PaymentStatus::Confirmed => self.monitoring.record_payment_confirmed(),
                    PaymentStatus::Failed => self.monitoring.record_payment_failed(),
                    PaymentStatus::Expired => self.monitoring.record_payment_expired(),
                    PaymentStatus::Pending => {}
                }
                LoggingUtils::log_payment_event(target.as_str(), payment_id, &payment.merchant_id);

                if notify
                    && matches!(target, PaymentStatus::Confirmed | PaymentStatus::Failed)
                {
                    self.webhooks.notify_status_change(&payment);
                }
                Ok(payment)
            }
            ConditionalUpdate::StatusMismatch(payment) => {
                warn!(
                    payment_id = %payment_id,
                    status = %payment.status.as_str(),
                    "Transition attempted on non-pending payment"
                );
                Err(AppError::StateConflict(format!(
                    "payment {} is {}",
                    payment_id,
                    payment.status.as_str()
                )))
            }
            ConditionalUpdate::Missing => {
                Err(AppError::NotFound(format!("payment {}", payment_id)))
            }
        }
    }
}
