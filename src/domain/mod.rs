//! Domain layer - Core business logic and domain models
//!
//! This module contains the core business models and rules that are
//! independent of infrastructure concerns like HTTP or storage backends.

pub mod health;
pub mod merchants;
pub mod payments;
pub mod webhooks;

pub use health::{HealthResponse, HealthStatus};
pub use merchants::Merchant;
pub use payments::{
    Payment, PaymentCurrency, PaymentMethod, PaymentNetwork, PaymentStatus, StatusPatch,
};
pub use webhooks::{DeliveryOutcome, WebhookLog, WebhookPayload};
