//! Application services - Orchestration of domain logic

pub mod ingestion_service;
pub mod merchants_service;
pub mod payments_service;
pub mod sweeper_service;
pub mod webhook_service;

pub use ingestion_service::{IngestionService, StatusUpdate};
pub use merchants_service::{MerchantOnboarding, MerchantsService};
pub use payments_service::{CreatePaymentRequest, PaymentsService};
pub use sweeper_service::SweeperService;
pub use webhook_service::WebhookService;
