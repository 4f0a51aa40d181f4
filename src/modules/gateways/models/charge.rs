use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::core::Currency;

/// Client-side payment credential forwarded to the gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PaymentToken {
    /// Single-use card token created by Stripe.js
    Card(String),
    /// Saved gateway customer
    Customer(String),
}

impl PaymentToken {
    pub fn id(&self) -> &str {
        match self {
            PaymentToken::Card(id) | PaymentToken::Customer(id) => id,
        }
    }
}

/// Parameters for creating a charge, amounts already in minor units
#[derive(Debug, Clone, Serialize)]
pub struct CreateChargeRequest {
    pub amount: i64,
    pub currency: Currency,
    pub token: PaymentToken,
    pub description: Option<String>,
    pub metadata: BTreeMap<String, String>,

    /// `false` authorizes only
    pub capture: bool,
}

/// Gateway charge as returned by the charges API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Charge {
    pub id: String,

    /// Authorized amount in minor units
    pub amount: i64,

    #[serde(default)]
    pub amount_captured: i64,

    #[serde(default)]
    pub amount_refunded: i64,

    pub currency: String,

    pub captured: bool,

    #[serde(default)]
    pub refunded: bool,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

/// Refund object returned by the refunds API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    pub amount: i64,
    pub charge: String,

    #[serde(default)]
    pub status: Option<String>,
}

/// What the capture call ended up doing to the charge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaptureAction {
    Captured,
    Refunded,
}

impl std::fmt::Display for CaptureAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CaptureAction::Captured => write!(f, "captured"),
            CaptureAction::Refunded => write!(f, "refunded"),
        }
    }
}

/// Result of capturing (or refunding) one charge
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureOutcome {
    pub charge_reference: String,
    pub action: CaptureAction,
    pub authorized: Decimal,
    pub amount_debited: Decimal,
    pub amount_refunded: Decimal,
    pub captured_at: DateTime<Utc>,
}
