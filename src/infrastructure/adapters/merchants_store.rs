//! Merchant directory store
//!
//! Same shape as the payments store: in-process map, optional Redis mirror.
//! The gateway reads merchants; administration happens elsewhere.

use std::collections::HashMap;
use std::sync::Arc;

use redis::{aio::ConnectionManager, AsyncCommands};

use crate::domain::merchants::Merchant;
use crate::shared::error::{AppError, AppResult};

#[derive(Clone)]
pub struct MerchantsStore {
    redis: Option<Arc<ConnectionManager>>,
    record_ttl_seconds: u64,
    memory: Arc<tokio::sync::RwLock<HashMap<String, Merchant>>>,
}

impl MerchantsStore {
    pub fn new(redis: Option<Arc<ConnectionManager>>, record_ttl_seconds: u64) -> Self {
        Self {
            redis,
            record_ttl_seconds,
            memory: Arc::new(tokio::sync::RwLock::new(HashMap::new())),
        }
    }

    fn key(merchant_id: &str) -> String {
        format!("merchants:{}", merchant_id)
    }

    pub async fn upsert(&self, merchant: &Merchant) -> AppResult<()> {
        if let Some(redis) = &self.redis {
            let serialized = serde_json::to_vec(merchant)
                .map_err(|e| AppError::Persistence(format!("serialize merchant: {}", e)))?;
            let mut conn = (**redis).clone();
            let _: () = conn
                .set_ex(Self::key(&merchant.id), serialized, self.record_ttl_seconds)
                .await
                .map_err(|e| AppError::Persistence(format!("redis set: {}", e)))?;
        }
        self.memory
            .write()
            .await
            .insert(merchant.id.clone(), merchant.clone());
        Ok(())
    }

    pub async fn get(&self, merchant_id: &str) -> AppResult<Option<Merchant>> {
        if let Some(merchant) = self.memory.read().await.get(merchant_id) {
            return Ok(Some(merchant.clone()));
        }

        if let Some(redis) = &self.redis {
            let mut conn = (**redis).clone();
            let data: Option<Vec<u8>> = conn
                .get(Self::key(merchant_id))
                .await
                .map_err(|e| AppError::Persistence(format!("redis get: {}", e)))?;
            if let Some(bytes) = data {
                let merchant: Merchant = serde_json::from_slice(&bytes)
                    .map_err(|e| AppError::Persistence(format!("deserialize merchant: {}", e)))?;
                self.memory
                    .write()
                    .await
                    .insert(merchant_id.to_string(), merchant.clone());
                return Ok(Some(merchant));
            }
        }
        Ok(None)
    }

    /// Look a merchant up by the HMAC digest of its API key.
    pub async fn find_by_api_key_hash(&self, api_key_hash: &str) -> AppResult<Option<Merchant>> {
        Ok(self
            .memory
            .read()
            .await
            .values()
            .find(|m| m.api_key_hash == api_key_hash)
            .cloned())
    }
}
