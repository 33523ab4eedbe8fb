//! API key authentication adapter
//!
//! Resolves a merchant id from a presented API key by HMAC digest lookup.
//! The core never sees or stores plaintext keys; token formats and session
//! handling live outside this service.

use std::sync::Arc;

use tracing::warn;

use crate::config::AppConfig;
use crate::infrastructure::adapters::merchants_store::MerchantsStore;
use crate::shared::crypto;
use crate::shared::error::{AppError, AppResult};

pub struct ApiKeyAuthenticator {
    config: Arc<AppConfig>,
    merchants: Arc<MerchantsStore>,
}

impl ApiKeyAuthenticator {
    pub fn new(config: Arc<AppConfig>, merchants: Arc<MerchantsStore>) -> Self {
        Self { config, merchants }
    }

    /// Resolve the merchant id owning this API key.
    pub async fn resolve(&self, api_key: &str) -> AppResult<String> {
        if api_key.is_empty() {
            return Err(AppError::Authentication("missing API key".to_string()));
        }

        let digest = crypto::hash_api_key(api_key, &self.config.security.api_key_secret);
        let merchant = self
            .merchants
            .find_by_api_key_hash(&digest)
            .await?
            .ok_or_else(|| {
                warn!("API key lookup failed");
                AppError::Authentication("unknown API key".to_string())
            })?;

        if !merchant.is_active {
            return Err(AppError::Authentication("merchant is inactive".to_string()));
        }

        Ok(merchant.id)
    }
}
