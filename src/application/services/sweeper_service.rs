//! Expiry sweeper
//!
//! Periodic batch job that moves overdue pending payments to `expired`.
//! Each record is handled independently through the guarded transition; a
//! failure on one record never aborts the batch, and a payment confirmed
//! concurrently simply loses the race and is skipped. Expiry fires no
//! webhook.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::future::join_all;
use tracing::{debug, error, info};

use crate::application::services::payments_service::PaymentsService;
use crate::domain::payments::{PaymentStatus, StatusPatch};
use crate::infrastructure::adapters::PaymentsStore;
use crate::shared::error::{AppError, AppResult};

pub struct SweeperService {
    store: Arc<PaymentsStore>,
    payments: Arc<PaymentsService>,
}

impl SweeperService {
    pub fn new(store: Arc<PaymentsStore>, payments: Arc<PaymentsService>) -> Self {
        Self { store, payments }
    }

    /// Expire every pending payment whose deadline is before `now`.
    ///
    /// Returns the number of records transitioned.
    pub async fn sweep(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let due = self.store.list_pending_expired(now).await?;
        if due.is_empty() {
            return Ok(0);
        }

        let results = join_all(due.iter().map(|payment| {
            let payments = Arc::clone(&self.payments);
            let payment_id = payment.id.clone();
            async move {
                payments
                    .transition_from_pending(
                        &payment_id,
                        StatusPatch::to(PaymentStatus::Expired),
                        false,
                    )
                    .await
            }
        }))
        .await;

        let mut expired = 0;
        for (payment, result) in due.iter().zip(results) {
            match result {
                Ok(_) => expired += 1,
                // Lost a race against a concurrent confirm/fail; nothing to do.
                Err(AppError::StateConflict(_)) | Err(AppError::NotFound(_)) => {
                    debug!(payment_id = %payment.id, "Payment transitioned before sweep");
                }
                Err(e) => {
                    error!(
                        payment_id = %payment.id,
                        error = %e,
                        "Failed to expire payment"
                    );
                }
            }
        }

        if expired > 0 {
            info!(count = %expired, "Expired overdue payments");
        }
        Ok(expired)
    }

    /// Spawn the periodic sweep loop.
    pub fn spawn(self: Arc<Self>, interval_seconds: u64) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_seconds));
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                interval.tick().await;
                if let Err(e) = self.sweep(Utc::now()).await {
                    error!(error = %e, "Expiry sweep failed");
                }
            }
        })
    }
}
