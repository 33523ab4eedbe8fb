//! Logging utilities module
//!
//! This module provides centralized logging functionality and utilities.

use std::time::{SystemTime, UNIX_EPOCH};
use tracing::{error, info, warn};

/// Logging utilities for the application
pub struct LoggingUtils;

impl LoggingUtils {
    /// Initialize logging with the specified configuration
    pub fn initialize(level: &str, _format: &str, _structured: bool) -> crate::Result<()> {
        use tracing_subscriber::{fmt, EnvFilter};

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        let subscriber = fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_ansi(false)
            .finish();

        tracing::subscriber::set_global_default(subscriber).map_err(|e| {
            crate::shared::error::AppError::Internal(format!("Failed to initialize logging: {}", e))
        })?;

        Ok(())
    }

    /// Log a payment lifecycle event with structured data
    pub fn log_payment_event(event: &str, payment_id: &str, merchant_id: &str) {
        info!(
            event = %event,
            payment_id = %payment_id,
            merchant_id = %merchant_id,
            "Payment lifecycle event"
        );
    }

    /// Log a webhook delivery attempt outcome
    pub fn log_delivery_attempt(payment_id: &str, url: &str, attempt: u32, status: u16) {
        info!(
            payment_id = %payment_id,
            url = %url,
            attempt = %attempt,
            status = %status,
            "Webhook delivery attempt"
        );
    }

    /// Log a delivery failure that exhausted its retries
    pub fn log_delivery_exhausted(payment_id: &str, url: &str, attempts: u32, error: &str) {
        error!(
            payment_id = %payment_id,
            url = %url,
            attempts = %attempts,
            error = %error,
            "Webhook delivery failed after retries"
        );
    }

    /// Log a rejected request
    pub fn log_rejected_request(reason: &str, detail: &str) {
        warn!(
            reason = %reason,
            detail = %detail,
            "Request rejected"
        );
    }

    /// Generate a unique request ID
    pub fn generate_request_id() -> String {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();

        format!("req_{:x}", now)
    }
}
