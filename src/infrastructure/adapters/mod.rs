//! Infrastructure adapters module
//!
//! This module contains adapters for external services and infrastructure
//! concerns.

pub mod authentication;
pub mod merchants_store;
pub mod monitoring;
pub mod payments_store;
pub mod webhook_sender;

// Re-export all adapters
pub use authentication::ApiKeyAuthenticator;
pub use merchants_store::MerchantsStore;
pub use monitoring::{MetricsSnapshot, MonitoringAdapter};
pub use payments_store::{ConditionalUpdate, PaymentsStore};
pub use webhook_sender::{HttpWebhookSender, SenderResponse, WebhookSender};
