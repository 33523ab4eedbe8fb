//! Payments domain models and types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Supported settlement currencies
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentCurrency {
    Usdt,
    Bnb,
    Eth,
    Btc,
}

impl PaymentCurrency {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentCurrency::Usdt => "USDT",
            PaymentCurrency::Bnb => "BNB",
            PaymentCurrency::Eth => "ETH",
            PaymentCurrency::Btc => "BTC",
        }
    }
}

impl std::str::FromStr for PaymentCurrency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "USDT" => Ok(PaymentCurrency::Usdt),
            "BNB" => Ok(PaymentCurrency::Bnb),
            "ETH" => Ok(PaymentCurrency::Eth),
            "BTC" => Ok(PaymentCurrency::Btc),
            _ => Err(format!("unsupported currency: {}", s)),
        }
    }
}

/// Supported settlement networks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum PaymentNetwork {
    Trc20,
    Bsc,
    Erc20,
    Bitcoin,
}

impl PaymentNetwork {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentNetwork::Trc20 => "TRC20",
            PaymentNetwork::Bsc => "BSC",
            PaymentNetwork::Erc20 => "ERC20",
            PaymentNetwork::Bitcoin => "BITCOIN",
        }
    }
}

impl std::str::FromStr for PaymentNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "TRC20" => Ok(PaymentNetwork::Trc20),
            "BSC" => Ok(PaymentNetwork::Bsc),
            "ERC20" => Ok(PaymentNetwork::Erc20),
            "BITCOIN" => Ok(PaymentNetwork::Bitcoin),
            _ => Err(format!("unsupported network: {}", s)),
        }
    }
}

/// Supported payment methods
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    BinancePay,
    UsdtTrc20,
    CryptoWallet,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::BinancePay => "binance_pay",
            PaymentMethod::UsdtTrc20 => "usdt_trc20",
            PaymentMethod::CryptoWallet => "crypto_wallet",
        }
    }
}

impl std::str::FromStr for PaymentMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binance_pay" => Ok(PaymentMethod::BinancePay),
            "usdt_trc20" => Ok(PaymentMethod::UsdtTrc20),
            "crypto_wallet" => Ok(PaymentMethod::CryptoWallet),
            _ => Err(format!("unsupported payment method: {}", s)),
        }
    }
}

/// Payment status
///
/// `Pending` is the only non-terminal state; `Confirmed`, `Failed`, and
/// `Expired` are terminal and never change once set.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PaymentStatus {
    Pending,
    Confirmed,
    Failed,
    Expired,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Confirmed => "confirmed",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Expired => "expired",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PaymentStatus::Pending)
    }
}

impl std::str::FromStr for PaymentStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(PaymentStatus::Pending),
            "confirmed" => Ok(PaymentStatus::Confirmed),
            "failed" => Ok(PaymentStatus::Failed),
            "expired" => Ok(PaymentStatus::Expired),
            _ => Err(format!("unsupported status: {}", s)),
        }
    }
}

/// Payment record persisted in the store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub merchant_id: String,
    pub amount: f64,
    pub currency: PaymentCurrency,
    pub network: PaymentNetwork,
    pub payment_method: PaymentMethod,
    pub customer_reference: String,
    pub status: PaymentStatus,
    pub payment_address: String,
    pub payment_link: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_received: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_at: Option<DateTime<Utc>>,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Payment {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.expires_at
    }
}

/// Fields applied atomically by the store's conditional status update.
///
/// `updated_at` is stamped by the store at commit time.
#[derive(Debug, Clone)]
pub struct StatusPatch {
    pub status: PaymentStatus,
    pub tx_hash: Option<String>,
    pub amount_received: Option<f64>,
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StatusPatch {
    pub fn to(status: PaymentStatus) -> Self {
        Self {
            status,
            tx_hash: None,
            amount_received: None,
            confirmed_at: None,
        }
    }
}
