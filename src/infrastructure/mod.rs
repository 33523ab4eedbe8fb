//! Infrastructure layer - External concerns and adapters
//!
//! This module contains infrastructure concerns including storage adapters,
//! outbound transport, monitoring, and HTTP handling.

pub mod adapters;
pub mod http;

// Re-export main adapters
pub use adapters::{
    ApiKeyAuthenticator, HttpWebhookSender, MerchantsStore, MonitoringAdapter, PaymentsStore,
    WebhookSender,
};
