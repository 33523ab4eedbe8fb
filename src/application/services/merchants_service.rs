//! Merchant key management
//!
//! Issues and rotates API credentials for merchant records. The key is
//! stored only as an HMAC digest; the secret is encrypted at rest and can
//! be redisplayed through the one capability-scoped reveal operation.
//! Signup and login belong to the account system, not this service.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::AppConfig;
use crate::domain::merchants::Merchant;
use crate::infrastructure::adapters::MerchantsStore;
use crate::shared::crypto;
use crate::shared::error::{AppError, AppResult};

/// Result of registering a merchant: the plaintext credentials are returned
/// exactly once.
#[derive(Debug, Clone)]
pub struct MerchantOnboarding {
    pub merchant: Merchant,
    pub api_key: String,
    pub api_secret: String,
}

pub struct MerchantsService {
    config: Arc<AppConfig>,
    merchants: Arc<MerchantsStore>,
}

impl MerchantsService {
    pub fn new(config: Arc<AppConfig>, merchants: Arc<MerchantsStore>) -> Self {
        Self { config, merchants }
    }

    /// Create a merchant directory record with fresh credentials.
    pub async fn register(
        &self,
        name: &str,
        webhook_url: Option<String>,
    ) -> AppResult<MerchantOnboarding> {
        if name.is_empty() {
            return Err(AppError::Validation("merchant name is required".to_string()));
        }

        let api_key = crypto::generate_api_key();
        let api_secret = crypto::generate_api_secret();
        let secret = &self.config.security.api_key_secret;

        let now = Utc::now();
        let merchant = Merchant {
            id: crypto::generate_merchant_id(),
            name: name.to_string(),
            webhook_url,
            api_key_hash: crypto::hash_api_key(&api_key, secret),
            api_secret_enc: crypto::encrypt_secret(&api_secret, secret)?,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.merchants.upsert(&merchant).await?;

        info!(merchant_id = %merchant.id, "New merchant registered");
        Ok(MerchantOnboarding {
            merchant,
            api_key,
            api_secret,
        })
    }

    /// Rotate a merchant's API credentials, returning the new plaintext pair
    /// exactly once.
    pub async fn rotate_api_key(&self, merchant_id: &str) -> AppResult<(String, String)> {
        let mut merchant = self
            .merchants
            .get(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant {}", merchant_id)))?;

        let api_key = crypto::generate_api_key();
        let api_secret = crypto::generate_api_secret();
        let secret = &self.config.security.api_key_secret;

        merchant.api_key_hash = crypto::hash_api_key(&api_key, secret);
        merchant.api_secret_enc = crypto::encrypt_secret(&api_secret, secret)?;
        merchant.updated_at = Utc::now();
        self.merchants.upsert(&merchant).await?;

        info!(merchant_id = %merchant_id, "API key rotated");
        Ok((api_key, api_secret))
    }

    /// Decrypt and redisplay a merchant's stored API secret.
    pub async fn reveal_api_secret(&self, merchant_id: &str) -> AppResult<String> {
        let merchant = self
            .merchants
            .get(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant {}", merchant_id)))?;
        crypto::decrypt_secret(&merchant.api_secret_enc, &self.config.security.api_key_secret)
    }

    /// Update the merchant's webhook destination.
    pub async fn update_webhook_url(
        &self,
        merchant_id: &str,
        webhook_url: Option<String>,
    ) -> AppResult<Merchant> {
        let mut merchant = self
            .merchants
            .get(merchant_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("merchant {}", merchant_id)))?;
        merchant.webhook_url = webhook_url;
        merchant.updated_at = Utc::now();
        self.merchants.upsert(&merchant).await?;
        Ok(merchant)
    }
}
