//! HTTP handlers module

pub mod health;
pub mod metrics;
pub mod payments;
pub mod webhooks;

pub use health::handle_health_request;
pub use metrics::{handle_metrics_json_request, handle_prometheus_request};
pub use payments::{handle_create_payment, handle_get_payment_status, handle_list_payments};
pub use webhooks::{
    handle_inbound_payment_update, handle_list_my_webhooks, handle_test_webhook,
    handle_verify_signature,
};
