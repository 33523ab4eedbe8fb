//! Configuration module
//!
//! This module handles loading and validating application configuration.

pub mod app_config;

pub use app_config::{
    AppConfig, LoggingConfig, PaymentsConfig, SecurityConfig, ServerConfig, StoreConfig,
    SweeperConfig, WebhookConfig,
};
