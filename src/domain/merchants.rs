//! Merchant directory models
//!
//! Merchant administration (signup, login) is handled elsewhere; this model
//! is what the gateway core reads: the webhook destination and the API key
//! material used by the authentication adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Merchant record persisted in the directory
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    pub id: String,
    pub name: String,
    /// Destination for outbound payment notifications; delivery is skipped
    /// silently when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// HMAC digest of the API key, used for lookup without plaintext storage.
    pub api_key_hash: String,
    /// API secret encrypted at rest (AES-256-GCM blob).
    pub api_secret_enc: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
