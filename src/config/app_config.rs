//! Application configuration structures
//!
//! This module contains the main configuration structures for the application.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use validator::Validate;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server address to bind to
    pub bind_address: IpAddr,

    /// Server port
    #[validate(range(min = 1, max = 65535))]
    pub port: u16,

    /// Maximum request size in bytes
    #[validate(range(min = 1024, max = 10485760))] // 1KB to 10MB
    pub max_request_size: usize,
}

/// Payment lifecycle configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct PaymentsConfig {
    /// Minutes until a pending payment expires
    #[validate(range(min = 1, max = 1440))]
    pub timeout_minutes: u32,

    /// Base URL embedded in generated checkout links
    #[validate(url)]
    pub checkout_base_url: String,
}

/// Webhook delivery configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct WebhookConfig {
    /// Process-wide secret used to sign outbound payloads
    #[validate(length(min = 16))]
    pub secret: String,

    /// Maximum retry attempts after the original delivery attempt
    #[validate(range(min = 0, max = 10))]
    pub retry_attempts: u32,

    /// Base retry delay in milliseconds; attempt n waits base * (n + 1)
    #[validate(range(min = 1, max = 300000))]
    pub retry_delay_ms: u64,

    /// Per-attempt outbound request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    pub request_timeout_seconds: u64,
}

/// Expiry sweeper configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SweeperConfig {
    /// Enable the periodic sweep task
    pub enabled: bool,

    /// Seconds between sweeps
    #[validate(range(min = 1, max = 3600))]
    pub interval_seconds: u64,
}

/// Security configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SecurityConfig {
    /// Secret used for API key digests and secrets-at-rest encryption
    #[validate(length(min = 16))]
    pub api_key_secret: String,
}

/// Store configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct StoreConfig {
    /// Mirror records to Redis in addition to the in-process store
    pub redis_enabled: bool,

    /// Redis connection URL
    #[validate(url)]
    pub redis_url: String,

    /// Mirrored record TTL in seconds
    #[validate(range(min = 60, max = 604800))]
    pub record_ttl_seconds: u64,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoggingConfig {
    /// Log level
    #[validate(length(min = 1))]
    pub level: String,

    /// Log format
    #[validate(length(min = 1))]
    pub format: String,

    /// Enable structured logging
    pub structured: bool,
}

/// Application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Payment lifecycle configuration
    pub payments: PaymentsConfig,

    /// Webhook delivery configuration
    pub webhook: WebhookConfig,

    /// Expiry sweeper configuration
    pub sweeper: SweeperConfig,

    /// Security configuration
    pub security: SecurityConfig,

    /// Store configuration
    pub store: StoreConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                bind_address: "127.0.0.1".parse().unwrap(),
                port: 8080,
                max_request_size: 1024 * 1024, // 1MB
            },
            payments: PaymentsConfig {
                timeout_minutes: 30,
                checkout_base_url: "https://payment.gateway/checkout".to_string(),
            },
            webhook: WebhookConfig {
                secret: "dev-webhook-secret-change-in-production".to_string(),
                retry_attempts: 3,
                retry_delay_ms: 5000,
                request_timeout_seconds: 10,
            },
            sweeper: SweeperConfig {
                enabled: true,
                interval_seconds: 60,
            },
            security: SecurityConfig {
                api_key_secret: "dev-api-secret-change-in-production".to_string(),
            },
            store: StoreConfig {
                redis_enabled: false,
                redis_url: "redis://127.0.0.1:6379".to_string(),
                record_ttl_seconds: 48 * 3600,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "json".to_string(),
                structured: true,
            },
        }
    }
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> crate::Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("Conf").required(false))
            .add_source(config::Environment::with_prefix("PAY_GATEWAY").separator("__"))
            .build()
            .map_err(|e| {
                crate::shared::error::AppError::Config(format!(
                    "Failed to build configuration: {}",
                    e
                ))
            })?;

        let config: AppConfig = config.try_deserialize().map_err(|e| {
            crate::shared::error::AppError::Config(format!(
                "Failed to deserialize configuration: {}",
                e
            ))
        })?;

        config.validate_config().map_err(|e| {
            crate::shared::error::AppError::Validation(format!(
                "Configuration validation failed: {}",
                e
            ))
        })?;

        Ok(config)
    }

    /// Validate the entire configuration
    pub fn validate_config(&self) -> Result<(), validator::ValidationErrors> {
        self.server.validate()?;
        self.payments.validate()?;
        self.webhook.validate()?;
        self.sweeper.validate()?;
        self.security.validate()?;
        self.store.validate()?;
        self.logging.validate()?;

        Ok(())
    }

    /// Get server address as string
    pub fn server_address(&self) -> String {
        format!("{}:{}", self.server.bind_address, self.server.port)
    }

    /// Payment expiry window as a chrono duration
    pub fn payment_timeout(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.payments.timeout_minutes as i64)
    }
}
