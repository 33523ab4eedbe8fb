//! Cryptographic primitives for payload signing, API key handling, and
//! secrets at rest.
//!
//! - HMAC-SHA256 over canonical JSON strings for webhook signatures
//! - One-way HMAC digest for API key lookup without plaintext storage
//! - AES-256-GCM for recoverable secrets, stored as
//!   `base64(iv):base64(tag):base64(ciphertext)`
//! - Identifier and mock payment address generation

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};

use crate::domain::payments::PaymentNetwork;
use crate::shared::error::{AppError, AppResult};

/// Nonce size for AES-GCM (96 bits / 12 bytes).
const NONCE_SIZE: usize = 12;

/// GCM authentication tag size in bytes.
const TAG_SIZE: usize = 16;

type HmacSha256 = Hmac<Sha256>;

/// Compute the HMAC-SHA256 signature of a payload string, hex encoded.
///
/// Callers are responsible for a stable serialization: the same object must
/// serialize to the same string for signing and later verification.
pub fn sign_payload(payload: &str, secret: &str) -> String {
    let mut mac = <HmacSha256 as Mac>::new_from_slice(secret.as_bytes())
        .expect("HMAC accepts keys of any size");
    mac.update(payload.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Verify an HMAC-SHA256 signature using constant-time comparison.
///
/// Returns false on any mismatch or malformed input; never panics or errors.
pub fn verify_payload(payload: &str, signature: &str, secret: &str) -> bool {
    let computed = sign_payload(payload, secret);
    constant_time_eq(signature.as_bytes(), computed.as_bytes())
}

/// One-way HMAC digest of an API key, used as the store lookup key so the
/// plaintext key is never persisted.
pub fn hash_api_key(api_key: &str, secret: &str) -> String {
    sign_payload(api_key, secret)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    use subtle::ConstantTimeEq;
    a.ct_eq(b).into()
}

/// Derive the 32-byte AES key from the configured secret.
fn derive_key(secret: &str) -> [u8; 32] {
    let digest = Sha256::digest(secret.as_bytes());
    let mut key = [0u8; 32];
    key.copy_from_slice(&digest);
    key
}

/// Encrypt a secret for storage at rest.
///
/// Output format: `base64(iv):base64(tag):base64(ciphertext)`. The blob is
/// self-describing; nothing outside it is needed for decryption besides the
/// process secret.
pub fn encrypt_secret(plain: &str, secret: &str) -> AppResult<String> {
    let cipher = Aes256Gcm::new_from_slice(&derive_key(secret))
        .map_err(|e| AppError::Crypto(format!("cipher init failed: {}", e)))?;

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::rng().fill_bytes(&mut nonce_bytes);
    let nonce = Nonce::from_slice(&nonce_bytes);

    // aes-gcm appends the tag to the ciphertext; split it back out so the
    // stored format keeps iv, tag, and ciphertext as separate segments.
    let sealed = cipher
        .encrypt(nonce, plain.as_bytes())
        .map_err(|e| AppError::Crypto(format!("encryption failed: {}", e)))?;
    let split = sealed.len() - TAG_SIZE;
    let (ciphertext, tag) = sealed.split_at(split);

    Ok(format!(
        "{}:{}:{}",
        BASE64.encode(nonce_bytes),
        BASE64.encode(tag),
        BASE64.encode(ciphertext)
    ))
}

/// Decrypt a secret previously produced by [`encrypt_secret`].
///
/// Fails closed: a malformed blob or an authentication tag mismatch is an
/// error, never silently-corrupted plaintext.
pub fn decrypt_secret(blob: &str, secret: &str) -> AppResult<String> {
    let mut parts = blob.splitn(3, ':');
    let (iv_b64, tag_b64, ct_b64) = match (parts.next(), parts.next(), parts.next()) {
        (Some(iv), Some(tag), Some(ct)) if !iv.is_empty() && !tag.is_empty() => (iv, tag, ct),
        _ => {
            return Err(AppError::Crypto(
                "invalid encrypted payload format".to_string(),
            ))
        }
    };

    let iv = BASE64
        .decode(iv_b64)
        .map_err(|e| AppError::Crypto(format!("invalid iv encoding: {}", e)))?;
    let tag = BASE64
        .decode(tag_b64)
        .map_err(|e| AppError::Crypto(format!("invalid tag encoding: {}", e)))?;
    let ciphertext = BASE64
        .decode(ct_b64)
        .map_err(|e| AppError::Crypto(format!("invalid ciphertext encoding: {}", e)))?;

    if iv.len() != NONCE_SIZE || tag.len() != TAG_SIZE {
        return Err(AppError::Crypto(
            "invalid encrypted payload format".to_string(),
        ));
    }

    let cipher = Aes256Gcm::new_from_slice(&derive_key(secret))
        .map_err(|e| AppError::Crypto(format!("cipher init failed: {}", e)))?;

    let mut sealed = ciphertext;
    sealed.extend_from_slice(&tag);

    let plain = cipher
        .decrypt(Nonce::from_slice(&iv), sealed.as_ref())
        .map_err(|_| AppError::Crypto("decryption failed: authentication tag mismatch".to_string()))?;

    String::from_utf8(plain).map_err(|e| AppError::Crypto(format!("invalid utf-8 plaintext: {}", e)))
}

fn random_hex(bytes: usize) -> String {
    let mut buf = vec![0u8; bytes];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

/// Generate a unique payment identifier
pub fn generate_payment_id() -> String {
    format!("pay_{}", random_hex(12))
}

/// Generate a unique merchant identifier
pub fn generate_merchant_id() -> String {
    format!("mer_{}", random_hex(12))
}

/// Generate a random API key
pub fn generate_api_key() -> String {
    format!("pk_{}", random_hex(24))
}

/// Generate a random API secret
pub fn generate_api_secret() -> String {
    format!("sk_{}", random_hex(32))
}

/// Generate a mock payment address shaped like the target network's
/// addresses. Real address derivation belongs to the chain integrations,
/// which are out of scope.
pub fn generate_payment_address(network: PaymentNetwork) -> String {
    match network {
        PaymentNetwork::Trc20 => format!("T{}", random_hex(21)),
        PaymentNetwork::Bsc | PaymentNetwork::Erc20 => format!("0x{}", random_hex(20)),
        PaymentNetwork::Bitcoin => format!("bc1{}", random_hex(16)),
    }
}
