//! Payment Gateway Server - crypto payment lifecycle and webhook delivery
//!
//! This library provides a merchant-facing payment backend: payment
//! creation and status transitions, signed webhook notifications with
//! bounded retries, periodic expiry of overdue payments, and ingestion of
//! status updates pushed by upstream processors.

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod shared;


pub use config::AppConfig;
pub use infrastructure::http::HttpServer;
pub use shared::error::{AppError, AppResult};

/// Application result type
pub type Result<T> = std::result::Result<T, shared::error::AppError>;
