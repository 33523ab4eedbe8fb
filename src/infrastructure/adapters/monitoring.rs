//! Monitoring adapter for metrics and observability
//!
//! This adapter handles Prometheus metrics collection for the payment
//! lifecycle and webhook delivery pipeline.

use std::time::SystemTime;

use serde::{Deserialize, Serialize};

/// Counter snapshot exposed on the JSON metrics endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub payments_created: u64,
    pub payments_confirmed: u64,
    pub payments_failed: u64,
    pub payments_expired: u64,
    pub webhook_attempts: u64,
    pub webhook_delivered: u64,
    pub webhook_rejected: u64,
    pub webhook_exhausted: u64,
    pub uptime_seconds: u64,
}

/// Adapter for monitoring and metrics services
pub struct MonitoringAdapter {
    registry: prometheus::Registry,
    payments_created: prometheus::Counter,
    payments_confirmed: prometheus::Counter,
    payments_failed: prometheus::Counter,
    payments_expired: prometheus::Counter,
    webhook_attempts: prometheus::Counter,
    webhook_delivered: prometheus::Counter,
    webhook_rejected: prometheus::Counter,
    webhook_exhausted: prometheus::Counter,
    start_time: SystemTime,
}

impl MonitoringAdapter {
    pub fn new() -> Self {
        let registry = prometheus::Registry::new();

        let payments_created = prometheus::Counter::new(
            "payments_created_total",
            "Total number of payments created",
        )
        .unwrap();
        let payments_confirmed = prometheus::Counter::new(
            "payments_confirmed_total",
            "Total number of payments confirmed",
        )
        .unwrap();
        let payments_failed = prometheus::Counter::new(
            "payments_failed_total",
            "Total number of payments marked failed",
        )
        .unwrap();
        let payments_expired = prometheus::Counter::new(
            "payments_expired_total",
            "Total number of payments expired by the sweeper",
        )
        .unwrap();
        let webhook_attempts = prometheus::Counter::new(
            "webhook_attempts_total",
            "Total webhook delivery attempts, retries included",
        )
        .unwrap();
        let webhook_delivered = prometheus::Counter::new(
            "webhook_delivered_total",
            "Webhook deliveries answered with a 2xx status",
        )
        .unwrap();
        let webhook_rejected = prometheus::Counter::new(
            "webhook_rejected_total",
            "Webhook deliveries answered with a non-2xx status",
        )
        .unwrap();
        let webhook_exhausted = prometheus::Counter::new(
            "webhook_exhausted_total",
            "Webhook delivery sequences that exhausted all retries",
        )
        .unwrap();

        for counter in [
            &payments_created,
            &payments_confirmed,
            &payments_failed,
            &payments_expired,
            &webhook_attempts,
            &webhook_delivered,
            &webhook_rejected,
            &webhook_exhausted,
        ] {
            registry.register(Box::new(counter.clone())).unwrap();
        }

        Self {
            registry,
            payments_created,
            payments_confirmed,
            payments_failed,
            payments_expired,
            webhook_attempts,
            webhook_delivered,
            webhook_rejected,
            webhook_exhausted,
            start_time: SystemTime::now(),
        }
    }

    pub fn record_payment_created(&self) {
        self.payments_created.inc();
    }

    pub fn record_payment_confirmed(&self) {
        self.payments_confirmed.inc();
    }

    pub fn record_payment_failed(&self) {
        self.payments_failed.inc();
    }

    pub fn record_payment_expired(&self) {
        self.payments_expired.inc();
    }

    pub fn record_webhook_attempt(&self) {
        self.webhook_attempts.inc();
    }

    pub fn record_webhook_delivered(&self) {
        self.webhook_delivered.inc();
    }

    pub fn record_webhook_rejected(&self) {
        self.webhook_rejected.inc();
    }

    pub fn record_webhook_exhausted(&self) {
        self.webhook_exhausted.inc();
    }

    /// Get Prometheus metrics in text format
    pub fn get_prometheus_metrics(&self) -> String {
        use prometheus::Encoder;
        let mut buffer = Vec::new();
        let encoder = prometheus::TextEncoder::new();
        encoder
            .encode(&self.registry.gather(), &mut buffer)
            .unwrap_or_default();
        String::from_utf8(buffer).unwrap_or_default()
    }

    /// Counter snapshot for the JSON endpoint
    pub fn snapshot(&self) -> MetricsSnapshot {
        let uptime = SystemTime::now()
            .duration_since(self.start_time)
            .unwrap_or_default()
            .as_secs();

        MetricsSnapshot {
            payments_created: self.payments_created.get() as u64,
            payments_confirmed: self.payments_confirmed.get() as u64,
            payments_failed: self.payments_failed.get() as u64,
            payments_expired: self.payments_expired.get() as u64,
            webhook_attempts: self.webhook_attempts.get() as u64,
            webhook_delivered: self.webhook_delivered.get() as u64,
            webhook_rejected: self.webhook_rejected.get() as u64,
            webhook_exhausted: self.webhook_exhausted.get() as u64,
            uptime_seconds: uptime,
        }
    }
}

impl Default for MonitoringAdapter {
    fn default() -> Self {
        Self::new()
    }
}
