use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Kind of monetary action recorded against an order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentEventType {
    /// Funds authorized and captured during checkout
    Purchase,
    /// Funds authorized only; capture happens later
    Authorise,
    /// Previously authorized funds captured
    Capture,
    /// Authorized funds released or captured funds refunded
    Refund,
}

impl std::fmt::Display for PaymentEventType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PaymentEventType::Purchase => write!(f, "Purchase"),
            PaymentEventType::Authorise => write!(f, "Authorise"),
            PaymentEventType::Capture => write!(f, "Capture"),
            PaymentEventType::Refund => write!(f, "Refund"),
        }
    }
}

impl std::str::FromStr for PaymentEventType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "Purchase" => Ok(PaymentEventType::Purchase),
            "Authorise" => Ok(PaymentEventType::Authorise),
            "Capture" => Ok(PaymentEventType::Capture),
            "Refund" => Ok(PaymentEventType::Refund),
            _ => Err(format!("Invalid payment event type: {}", s)),
        }
    }
}

/// Append-only audit record of a monetary action
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentEvent {
    pub id: String,
    pub order_number: String,
    pub event_type: PaymentEventType,
    pub amount: Decimal,

    /// Gateway charge the event relates to
    pub reference: String,

    pub created_at: DateTime<Utc>,
}

impl PaymentEvent {
    pub fn new(
        order_number: impl Into<String>,
        event_type: PaymentEventType,
        amount: Decimal,
        reference: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            order_number: order_number.into(),
            event_type,
            amount,
            reference: reference.into(),
            created_at: Utc::now(),
        }
    }
}
